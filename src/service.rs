use crate::model::{
    ClearValuesResult, CreatedSpreadsheet, SpreadsheetFile, SpreadsheetMetadata,
    UpdateValuesResult, ValueRange,
};
use crate::requests::{BatchRequest, ValueInputOption};
use anyhow::Result;
use async_trait::async_trait;

/// The remote spreadsheet/drive collaborator.
///
/// Implementations own credential acquisition: every call names the
/// acting user and the implementation supplies an authorized client for
/// that user and scope. Nothing in this crate performs network I/O
/// itself, and all core range/geometry work happens before or after
/// these calls, never inside them.
#[async_trait]
pub trait SpreadsheetService: Send + Sync {
    /// Drive-style listing of spreadsheet files, most recently modified
    /// first.
    async fn list_spreadsheets(
        &self,
        user_email: &str,
        max_results: u32,
    ) -> Result<Vec<SpreadsheetFile>>;

    /// Sheet properties, merges, conditional-format counts and named
    /// ranges for one spreadsheet.
    async fn get_metadata(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
    ) -> Result<SpreadsheetMetadata>;

    async fn get_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange>;

    async fn batch_get_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> Result<Vec<ValueRange>>;

    async fn update_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
        input_option: ValueInputOption,
    ) -> Result<UpdateValuesResult>;

    async fn clear_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResult>;

    /// Returns the cleared range texts, service-normalized.
    async fn batch_clear_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> Result<Vec<String>>;

    async fn create_spreadsheet(
        &self,
        user_email: &str,
        title: &str,
        sheet_names: &[String],
    ) -> Result<CreatedSpreadsheet>;

    /// Submit a batchUpdate. One reply object per request, in order;
    /// requests without a reply body yield an empty object.
    async fn batch_update(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        requests: Vec<BatchRequest>,
    ) -> Result<Vec<serde_json::Value>>;
}
