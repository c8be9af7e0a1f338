#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use sheets_mcp::config::ServerConfig;
use sheets_mcp::memory::InMemorySpreadsheetService;
use sheets_mcp::model::{
    ClearValuesResult, CreatedSpreadsheet, SpreadsheetFile, SpreadsheetMetadata,
    UpdateValuesResult, ValueRange,
};
use sheets_mcp::requests::{BatchRequest, ValueInputOption};
use sheets_mcp::service::SpreadsheetService;
use sheets_mcp::state::AppState;
use std::sync::Arc;

pub const TEST_USER: &str = "tester@example.com";

/// Wraps the in-memory backend and records every batchUpdate request as
/// JSON so tests can assert on the exact wire shape tools produce.
pub struct RecordingService {
    inner: InMemorySpreadsheetService,
    recorded: Mutex<Vec<serde_json::Value>>,
}

impl RecordingService {
    pub fn new() -> Self {
        Self {
            inner: InMemorySpreadsheetService::new(),
            recorded: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_requests(&self) -> Vec<serde_json::Value> {
        self.recorded.lock().clone()
    }
}

#[async_trait]
impl SpreadsheetService for RecordingService {
    async fn list_spreadsheets(
        &self,
        user_email: &str,
        max_results: u32,
    ) -> Result<Vec<SpreadsheetFile>> {
        self.inner.list_spreadsheets(user_email, max_results).await
    }

    async fn get_metadata(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
    ) -> Result<SpreadsheetMetadata> {
        self.inner.get_metadata(user_email, spreadsheet_id).await
    }

    async fn get_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange> {
        self.inner.get_values(user_email, spreadsheet_id, range).await
    }

    async fn batch_get_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> Result<Vec<ValueRange>> {
        self.inner
            .batch_get_values(user_email, spreadsheet_id, ranges)
            .await
    }

    async fn update_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
        input_option: ValueInputOption,
    ) -> Result<UpdateValuesResult> {
        self.inner
            .update_values(user_email, spreadsheet_id, range, values, input_option)
            .await
    }

    async fn clear_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResult> {
        self.inner.clear_values(user_email, spreadsheet_id, range).await
    }

    async fn batch_clear_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> Result<Vec<String>> {
        self.inner
            .batch_clear_values(user_email, spreadsheet_id, ranges)
            .await
    }

    async fn create_spreadsheet(
        &self,
        user_email: &str,
        title: &str,
        sheet_names: &[String],
    ) -> Result<CreatedSpreadsheet> {
        self.inner
            .create_spreadsheet(user_email, title, sheet_names)
            .await
    }

    async fn batch_update(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        requests: Vec<BatchRequest>,
    ) -> Result<Vec<serde_json::Value>> {
        {
            let mut recorded = self.recorded.lock();
            for request in &requests {
                recorded.push(serde_json::to_value(request)?);
            }
        }
        self.inner
            .batch_update(user_email, spreadsheet_id, requests)
            .await
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        default_user_email: TEST_USER.to_string(),
        enabled_tools: None,
        cache_capacity: 16,
        tool_timeout_ms: Some(30_000),
        max_response_bytes: Some(1_000_000),
        default_read_range: "A1:Z1000".to_string(),
        max_list_results: 25,
    }
}

pub struct TestContext {
    pub service: Arc<RecordingService>,
    pub state: Arc<AppState>,
}

pub fn context() -> TestContext {
    let service = Arc::new(RecordingService::new());
    let state = Arc::new(AppState::new(Arc::new(test_config()), service.clone()));
    TestContext { service, state }
}

/// One spreadsheet with "Data" and "Target" sheets, and a few rows in
/// Data!A1:C3.
pub async fn seeded_context() -> (TestContext, String) {
    let ctx = context();
    let created = ctx
        .service
        .create_spreadsheet(
            TEST_USER,
            "Quarterly",
            &["Data".to_string(), "Target".to_string()],
        )
        .await
        .expect("create spreadsheet");
    ctx.service
        .update_values(
            TEST_USER,
            &created.spreadsheet_id,
            "Data!A1:C3",
            vec![
                vec!["Name".to_string(), "Q1".to_string(), "Q2".to_string()],
                vec!["North".to_string(), "100".to_string(), "120".to_string()],
                vec!["South".to_string(), "90".to_string(), "80".to_string()],
            ],
            ValueInputOption::UserEntered,
        )
        .await
        .expect("seed values");
    (ctx, created.spreadsheet_id)
}
