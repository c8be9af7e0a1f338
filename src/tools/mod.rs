pub mod format;
pub mod named;
pub mod read;
pub mod rules;
pub mod structure;
pub mod values;

pub use format::{FormatCellsParams, FormatCellsResponse, format_cells};
pub use named::{
    CreateNamedRangeParams, CreateNamedRangeResponse, DeleteNamedRangeParams,
    DeleteNamedRangeResponse, ListNamedRangesParams, ListNamedRangesResponse, create_named_range,
    delete_named_range, list_named_ranges,
};
pub use read::{
    GetSpreadsheetInfoParams, GetSpreadsheetInfoResponse, ListSpreadsheetsParams,
    ListSpreadsheetsResponse, ReadSheetValuesParams, ReadSheetValuesResponse,
    get_spreadsheet_info, list_spreadsheets, read_sheet_values,
};
pub use rules::{
    AddConditionalFormattingParams, AddConditionalFormattingResponse, AddDataValidationParams,
    AddDataValidationResponse, ClearConditionalFormattingParams,
    ClearConditionalFormattingResponse, ClearDataValidationParams, ClearDataValidationResponse,
    add_conditional_formatting, add_data_validation, clear_conditional_formatting,
    clear_data_validation,
};
pub use structure::{
    CopyPasteParams, CopyPasteResponse, CreateSheetParams, CreateSheetResponse,
    CreateSpreadsheetParams, CreateSpreadsheetResponse, CutPasteParams, CutPasteResponse,
    MergeCellsParams, MergeCellsResponse, UnmergeCellsParams, UnmergeCellsResponse, copy_paste,
    create_sheet, create_spreadsheet, cut_paste, merge_cells, unmerge_cells,
};
pub use values::{
    BatchClearValuesParams, BatchClearValuesResponse, BatchGetValuesParams,
    BatchGetValuesResponse, ModifySheetValuesParams, ModifySheetValuesResponse,
    batch_clear_values, batch_get_values, modify_sheet_values,
};

use crate::grid::{GridRect, parse_range};
use crate::model::SpreadsheetMetadata;
use crate::requests::GridRange;
use anyhow::{Result, bail};

pub(crate) fn default_true() -> bool {
    true
}

/// A range string resolved against a spreadsheet's sheet list.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedRange {
    pub sheet_title: String,
    pub sheet_id: i64,
    pub rect: GridRect,
}

impl ResolvedRange {
    pub fn grid_range(&self) -> GridRange {
        GridRange::new(self.sheet_id, self.rect)
    }
}

/// Decode a range and resolve its sheet to a numeric id. An unqualified
/// range falls back to the spreadsheet's first sheet; the codec itself
/// never guesses a default.
pub(crate) fn resolve_range(
    metadata: &SpreadsheetMetadata,
    range_text: &str,
) -> Result<ResolvedRange> {
    let parsed = parse_range(range_text)?;
    let sheet = match parsed.sheet.as_deref() {
        Some(name) => metadata.sheet_by_title(name)?,
        None => match metadata.first_sheet() {
            Some(sheet) => sheet,
            None => bail!("spreadsheet '{}' has no sheets", metadata.spreadsheet_id),
        },
    };
    Ok(ResolvedRange {
        sheet_title: sheet.properties.title.clone(),
        sheet_id: sheet.properties.sheet_id,
        rect: parsed.rect,
    })
}
