use crate::grid::{col_to_letters, to_a1_with_sheet};
use crate::model::{MergedRegion, SpreadsheetFile};
use crate::state::AppState;
use crate::tools::{default_true, resolve_range};
use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListSpreadsheetsParams {
    /// Acting user's email; falls back to the configured default.
    #[serde(default)]
    pub user_email: Option<String>,
    /// Maximum number of files to return.
    #[serde(default)]
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListSpreadsheetsResponse {
    pub user_email: String,
    pub count: usize,
    pub spreadsheets: Vec<SpreadsheetFile>,
    pub text: String,
}

pub async fn list_spreadsheets(
    state: Arc<AppState>,
    params: ListSpreadsheetsParams,
) -> Result<ListSpreadsheetsResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    let max_results = params.max_results.unwrap_or(config.max_list_results);
    tracing::info!(user = %user_email, max_results, "list_spreadsheets");

    let files = state
        .service()
        .list_spreadsheets(&user_email, max_results)
        .await?;

    let text = if files.is_empty() {
        format!("No spreadsheets found for {user_email}.")
    } else {
        let mut lines = vec![format!(
            "Successfully listed {} spreadsheets for {}:",
            files.len(),
            user_email
        )];
        for file in &files {
            lines.push(format!(
                "- \"{}\" (ID: {}) | Modified: {} | Link: {}",
                file.name,
                file.id,
                file.modified_time.as_deref().unwrap_or("Unknown"),
                file.web_view_link.as_deref().unwrap_or("No link"),
            ));
        }
        lines.join("\n")
    };

    Ok(ListSpreadsheetsResponse {
        user_email,
        count: files.len(),
        spreadsheets: files,
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetSpreadsheetInfoParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Include a short data preview for each sheet.
    #[serde(default = "default_true")]
    pub include_data_preview: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct NamedRangeDisplay {
    pub name: String,
    pub named_range_id: String,
    pub range: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SheetSummary {
    pub title: String,
    pub sheet_id: i64,
    pub row_count: u32,
    pub col_count: u32,
    pub merges: Vec<MergedRegion>,
    pub conditional_format_count: usize,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GetSpreadsheetInfoResponse {
    pub spreadsheet_id: String,
    pub title: String,
    pub sheet_count: usize,
    pub named_ranges: Vec<NamedRangeDisplay>,
    pub sheets: Vec<SheetSummary>,
    pub text: String,
}

pub async fn get_spreadsheet_info(
    state: Arc<AppState>,
    params: GetSpreadsheetInfoParams,
) -> Result<GetSpreadsheetInfoResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(user = %user_email, spreadsheet = %params.spreadsheet_id, "get_spreadsheet_info");

    let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;

    let named_ranges: Vec<NamedRangeDisplay> = metadata
        .named_ranges
        .iter()
        .map(|nr| {
            let sheet_title = metadata.title_for_sheet_id(nr.sheet_id).unwrap_or("Unknown");
            NamedRangeDisplay {
                name: nr.name.clone(),
                named_range_id: nr.named_range_id.clone(),
                range: to_a1_with_sheet(sheet_title, &nr.rect),
            }
        })
        .collect();

    let mut lines = vec![
        format!(
            "Spreadsheet: \"{}\" (ID: {})",
            metadata.title, params.spreadsheet_id
        ),
        format!("Total Sheets: {}", metadata.sheets.len()),
    ];

    if !named_ranges.is_empty() {
        lines.push("\nNamed Ranges:".to_string());
        for nr in &named_ranges {
            lines.push(format!("  - {}: {}", nr.name, nr.range));
        }
    }

    let mut sheets = Vec::with_capacity(metadata.sheets.len());
    for sheet in &metadata.sheets {
        let props = &sheet.properties;
        lines.push(format!("\n{}", "=".repeat(50)));
        lines.push(format!("Sheet: \"{}\" (ID: {})", props.title, props.sheet_id));
        lines.push(format!(
            "Size: {} rows × {} columns",
            props.row_count, props.col_count
        ));

        let merges: Vec<MergedRegion> = sheet
            .merges
            .iter()
            .map(|rect| MergedRegion::from_rect(*rect))
            .collect();
        if !merges.is_empty() {
            lines.push(format!("\nMerged Cells ({} regions):", merges.len()));
            for merge in merges.iter().take(10) {
                lines.push(format!(
                    "  - {} ({} rows × {} cols)",
                    merge.a1,
                    merge.rect.row_count(),
                    merge.rect.col_count()
                ));
            }
            if merges.len() > 10 {
                lines.push(format!(
                    "  ... and {} more merged regions",
                    merges.len() - 10
                ));
            }
        }

        if params.include_data_preview && props.row_count > 0 && props.col_count > 0 {
            let preview_range =
                format!("{}!A1:Z{}", props.title, props.row_count.min(20));
            match state
                .service()
                .get_values(&user_email, &params.spreadsheet_id, &preview_range)
                .await
            {
                Ok(result) => lines.extend(preview_lines(&result.values)),
                Err(err) => lines.push(format!("\nCould not fetch data preview: {err}")),
            }
        }

        sheets.push(SheetSummary {
            title: props.title.clone(),
            sheet_id: props.sheet_id,
            row_count: props.row_count,
            col_count: props.col_count,
            merges,
            conditional_format_count: sheet.conditional_format_count,
        });
    }

    Ok(GetSpreadsheetInfoResponse {
        spreadsheet_id: params.spreadsheet_id,
        title: metadata.title.clone(),
        sheet_count: metadata.sheets.len(),
        named_ranges,
        sheets,
        text: lines.join("\n"),
    })
}

fn cell_has_data(cell: &str) -> bool {
    !cell.trim().is_empty()
}

/// Summarize the populated portion of a preview window: extent, then the
/// first three non-empty rows with long cells truncated.
fn preview_lines(values: &[Vec<String>]) -> Vec<String> {
    let mut non_empty_rows = 0usize;
    let mut first_row_with_data: Option<usize> = None;
    let mut max_col_with_data = 0usize;
    for (i, row) in values.iter().enumerate() {
        if row.iter().any(|c| cell_has_data(c)) {
            non_empty_rows += 1;
            first_row_with_data.get_or_insert(i);
            let last = row
                .iter()
                .enumerate()
                .filter(|(_, c)| cell_has_data(c))
                .map(|(j, _)| j)
                .max()
                .unwrap_or(0);
            max_col_with_data = max_col_with_data.max(last);
        }
    }

    let Some(first_row) = first_row_with_data else {
        return vec!["\nNo data found in preview range".to_string()];
    };

    let mut lines = vec![
        "\nData Preview:".to_string(),
        format!("  - First row with data: Row {}", first_row + 1),
        format!("  - Non-empty rows in preview: {non_empty_rows}"),
        format!(
            "  - Columns with data: A to {}",
            col_to_letters(max_col_with_data as u32)
        ),
        "  - First 3 rows of data:".to_string(),
    ];
    let mut shown = 0;
    for (i, row) in values.iter().enumerate() {
        if !row.iter().any(|c| cell_has_data(c)) {
            continue;
        }
        let display_row: Vec<String> = row
            .iter()
            .take(5)
            .map(|cell| {
                if cell.chars().count() > 30 {
                    let prefix: String = cell.chars().take(30).collect();
                    format!("{prefix}...")
                } else {
                    cell.clone()
                }
            })
            .collect();
        lines.push(format!("    Row {}: {:?}", i + 1, display_row));
        shown += 1;
        if shown >= 3 {
            break;
        }
    }
    lines
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadSheetValuesParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Range to read, e.g. "Sheet1!A1:D10". Defaults to the configured
    /// read window.
    #[serde(default)]
    pub range_name: Option<String>,
    /// Detect and annotate merged cells overlapping the range.
    #[serde(default = "default_true")]
    pub handle_merged_cells: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ReadSheetValuesResponse {
    pub range: String,
    pub row_count: usize,
    pub values: Vec<Vec<String>>,
    pub merged_regions: Vec<MergedRegion>,
    pub text: String,
}

pub async fn read_sheet_values(
    state: Arc<AppState>,
    params: ReadSheetValuesParams,
) -> Result<ReadSheetValuesResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    let range_name = params
        .range_name
        .unwrap_or_else(|| config.default_read_range.clone());
    tracing::info!(user = %user_email, spreadsheet = %params.spreadsheet_id, range = %range_name, "read_sheet_values");

    let result = state
        .service()
        .get_values(&user_email, &params.spreadsheet_id, &range_name)
        .await?;
    let values = result.values;

    if values.is_empty() {
        let text = format!("No data found in range '{range_name}' for {user_email}.");
        return Ok(ReadSheetValuesResponse {
            range: range_name,
            row_count: 0,
            values,
            merged_regions: Vec::new(),
            text,
        });
    }

    let mut merged_regions: Vec<MergedRegion> = Vec::new();
    let mut range_rect = None;
    if params.handle_merged_cells {
        let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;
        let resolved = resolve_range(&metadata, &range_name)?;
        range_rect = Some(resolved.rect);
        if let Ok(sheet) = metadata.sheet_by_title(&resolved.sheet_title) {
            merged_regions = sheet
                .merges
                .iter()
                .filter(|merge| merge.overlaps(&resolved.rect))
                .map(|rect| MergedRegion::from_rect(*rect))
                .collect();
        }
    }

    let mut formatted = Vec::new();
    if !merged_regions.is_empty() {
        formatted.push("MERGED CELLS DETECTED:".to_string());
        for merge in merged_regions.iter().take(10) {
            formatted.push(format!(
                "  - {} ({} rows × {} cols)",
                merge.a1,
                merge.rect.row_count(),
                merge.rect.col_count()
            ));
        }
        if merged_regions.len() > 10 {
            formatted.push(format!(
                "  ... and {} more merged regions",
                merged_regions.len() - 10
            ));
        }
        formatted.push("\nDATA VALUES:".to_string());
    }

    // A header row is a first row with at least two non-empty cells.
    let first_width = values[0].len();
    let has_header = first_width > 1
        && values[0].iter().filter(|c| cell_has_data(c)).count() >= 2;
    if has_header {
        formatted.push(format!("Header Row: {:?}", values[0]));
        formatted.push("-".repeat(50));
    }

    let start_idx = usize::from(has_header);
    for (i, row) in values.iter().enumerate().skip(start_idx) {
        let row_number = i + 1;
        let mut annotations = Vec::new();
        if let Some(rect) = range_rect {
            let sheet_row = rect.start_row + row_number as u32 - 1;
            for merge in &merged_regions {
                if merge.rect.contains_row(sheet_row) {
                    annotations.push(format!("[MERGED: {}]", merge.a1));
                }
            }
        }

        let mut padded = row.clone();
        while padded.len() < first_width {
            padded.push(String::new());
        }

        let mut row_str = format!("Row {row_number:3}: {padded:?}");
        if !annotations.is_empty() {
            row_str.push(' ');
            row_str.push_str(&annotations.join(" "));
        }
        formatted.push(row_str);

        if formatted.len() > 60 {
            formatted.push(format!("... and {} more rows", values.len() - row_number));
            break;
        }
    }

    let text = format!(
        "Successfully read {} rows from range '{}' in spreadsheet {} for {}.\n{}",
        values.len(),
        range_name,
        params.spreadsheet_id,
        user_email,
        formatted.join("\n")
    );

    Ok(ReadSheetValuesResponse {
        range: range_name,
        row_count: values.len(),
        values,
        merged_regions,
        text,
    })
}
