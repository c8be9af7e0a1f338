use crate::errors::SheetNotFoundError;
use crate::grid::{GridRect, to_a1};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One spreadsheet file as reported by the drive listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SpreadsheetFile {
    pub id: String,
    pub name: String,
    pub modified_time: Option<String>,
    pub web_view_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
    pub row_count: u32,
    pub col_count: u32,
}

/// Sheet metadata plus the merged regions the service reports on it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SheetInfo {
    pub properties: SheetProperties,
    #[serde(default)]
    pub merges: Vec<GridRect>,
    #[serde(default)]
    pub conditional_format_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NamedRange {
    pub named_range_id: String,
    pub name: String,
    pub sheet_id: i64,
    pub rect: GridRect,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SpreadsheetMetadata {
    pub spreadsheet_id: String,
    pub title: String,
    pub sheets: Vec<SheetInfo>,
    #[serde(default)]
    pub named_ranges: Vec<NamedRange>,
}

impl SpreadsheetMetadata {
    /// Linear scan by title; sheet lists are tens of entries at most.
    pub fn sheet_by_title(&self, title: &str) -> Result<&SheetInfo, SheetNotFoundError> {
        self.sheets
            .iter()
            .find(|s| s.properties.title == title)
            .ok_or_else(|| SheetNotFoundError::new(title, self.sheet_titles()))
    }

    pub fn first_sheet(&self) -> Option<&SheetInfo> {
        self.sheets.first()
    }

    pub fn title_for_sheet_id(&self, sheet_id: i64) -> Option<&str> {
        self.sheets
            .iter()
            .find(|s| s.properties.sheet_id == sheet_id)
            .map(|s| s.properties.title.as_str())
    }

    pub fn sheet_titles(&self) -> Vec<String> {
        self.sheets
            .iter()
            .map(|s| s.properties.title.clone())
            .collect()
    }
}

/// A merged region paired with its rendered A1 form, for display.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct MergedRegion {
    pub rect: GridRect,
    pub a1: String,
}

impl MergedRegion {
    pub fn from_rect(rect: GridRect) -> Self {
        let a1 = to_a1(&rect);
        Self { rect, a1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValueRange {
    pub range: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateValuesResult {
    pub updated_range: String,
    pub updated_cells: u64,
    pub updated_rows: u64,
    pub updated_columns: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClearValuesResult {
    pub cleared_range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreatedSpreadsheet {
    pub spreadsheet_id: String,
    pub spreadsheet_url: String,
    pub sheets: Vec<SheetProperties>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> SpreadsheetMetadata {
        SpreadsheetMetadata {
            spreadsheet_id: "sp1".to_string(),
            title: "Budget".to_string(),
            sheets: vec![
                SheetInfo {
                    properties: SheetProperties {
                        sheet_id: 0,
                        title: "Summary".to_string(),
                        row_count: 100,
                        col_count: 26,
                    },
                    merges: Vec::new(),
                    conditional_format_count: 0,
                },
                SheetInfo {
                    properties: SheetProperties {
                        sheet_id: 7,
                        title: "Data".to_string(),
                        row_count: 1000,
                        col_count: 26,
                    },
                    merges: Vec::new(),
                    conditional_format_count: 0,
                },
            ],
            named_ranges: Vec::new(),
        }
    }

    #[test]
    fn sheet_lookup_by_title() {
        let meta = metadata();
        assert_eq!(meta.sheet_by_title("Data").unwrap().properties.sheet_id, 7);

        let err = meta.sheet_by_title("Missing").unwrap_err();
        assert_eq!(err.name(), "Missing");
        assert_eq!(err.known_sheets(), ["Summary", "Data"]);
    }

    #[test]
    fn sheet_id_back_to_title() {
        let meta = metadata();
        assert_eq!(meta.title_for_sheet_id(7), Some("Data"));
        assert_eq!(meta.title_for_sheet_id(99), None);
    }
}
