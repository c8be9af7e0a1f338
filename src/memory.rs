//! In-process backend for local development and tests. Holds whole
//! spreadsheets in memory and interprets batchUpdate requests against
//! them, so every tool can be exercised without a remote service.

use crate::grid::{GridRect, parse_range, to_a1_with_sheet};
use crate::model::{
    ClearValuesResult, CreatedSpreadsheet, NamedRange, SheetInfo, SheetProperties,
    SpreadsheetFile, SpreadsheetMetadata, UpdateValuesResult, ValueRange,
};
use crate::requests::{BatchRequest, GridCoordinate, GridRange, ValueInputOption};
use crate::service::SpreadsheetService;
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;

const DEFAULT_ROWS: u32 = 1000;
const DEFAULT_COLS: u32 = 26;

#[derive(Debug, Clone)]
struct StoredSheet {
    properties: SheetProperties,
    cells: HashMap<(u32, u32), String>,
    merges: Vec<GridRect>,
    conditional_format_count: usize,
}

impl StoredSheet {
    fn new(sheet_id: i64, title: &str) -> Self {
        Self {
            properties: SheetProperties {
                sheet_id,
                title: title.to_string(),
                row_count: DEFAULT_ROWS,
                col_count: DEFAULT_COLS,
            },
            cells: HashMap::new(),
            merges: Vec::new(),
            conditional_format_count: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredSpreadsheet {
    title: String,
    sheets: Vec<StoredSheet>,
    named_ranges: Vec<NamedRange>,
    modified_time: String,
}

#[derive(Debug, Default)]
struct Inner {
    spreadsheets: HashMap<String, StoredSpreadsheet>,
    order: Vec<String>,
    next_id: u64,
}

/// Thread-safe in-memory store behind the service seam.
#[derive(Debug, Default)]
pub struct InMemorySpreadsheetService {
    inner: Mutex<Inner>,
}

impl InMemorySpreadsheetService {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    fn with_spreadsheet<T>(
        &self,
        spreadsheet_id: &str,
        f: impl FnOnce(&mut StoredSpreadsheet) -> Result<T>,
    ) -> Result<T> {
        let mut inner = self.inner.lock();
        let sheet = inner
            .spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| anyhow!("spreadsheet '{spreadsheet_id}' not found"))?;
        let result = f(sheet)?;
        sheet.modified_time = Self::now();
        Ok(result)
    }
}

fn sheet_for_range<'a>(
    spreadsheet: &'a mut StoredSpreadsheet,
    range_text: &str,
) -> Result<(&'a mut StoredSheet, GridRect)> {
    let parsed = parse_range(range_text)?;
    let index = match parsed.sheet.as_deref() {
        Some(name) => spreadsheet
            .sheets
            .iter()
            .position(|s| s.properties.title == name)
            .ok_or_else(|| anyhow!("sheet '{name}' not found"))?,
        None => 0,
    };
    let sheet = spreadsheet
        .sheets
        .get_mut(index)
        .ok_or_else(|| anyhow!("spreadsheet has no sheets"))?;
    Ok((sheet, parsed.rect))
}

fn sheet_by_id<'a>(
    spreadsheet: &'a mut StoredSpreadsheet,
    sheet_id: i64,
) -> Result<&'a mut StoredSheet> {
    spreadsheet
        .sheets
        .iter_mut()
        .find(|s| s.properties.sheet_id == sheet_id)
        .ok_or_else(|| anyhow!("no sheet with id {sheet_id}"))
}

fn normalized_range(spreadsheet: &StoredSpreadsheet, range_text: &str) -> Result<String> {
    let parsed = parse_range(range_text)?;
    let title = match parsed.sheet {
        Some(name) => name,
        None => spreadsheet
            .sheets
            .first()
            .map(|s| s.properties.title.clone())
            .ok_or_else(|| anyhow!("spreadsheet has no sheets"))?,
    };
    Ok(to_a1_with_sheet(&title, &parsed.rect))
}

fn read_rect(sheet: &StoredSheet, rect: GridRect) -> Vec<Vec<String>> {
    // Trim trailing empty rows and columns the way the values API does.
    let mut last_row = None;
    let mut last_col = None;
    for row in rect.start_row..rect.end_row {
        for col in rect.start_col..rect.end_col {
            if sheet.cells.contains_key(&(row, col)) {
                last_row = Some(row);
                last_col = Some(last_col.map_or(col, |c: u32| c.max(col)));
            }
        }
    }
    let (Some(last_row), Some(last_col)) = (last_row, last_col) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for row in rect.start_row..=last_row {
        let mut out = Vec::new();
        for col in rect.start_col..=last_col {
            out.push(sheet.cells.get(&(row, col)).cloned().unwrap_or_default());
        }
        while out.last().is_some_and(|c| c.is_empty()) {
            out.pop();
        }
        rows.push(out);
    }
    while rows.last().is_some_and(|r| r.is_empty()) {
        rows.pop();
    }
    rows
}

fn write_rect(sheet: &mut StoredSheet, rect: GridRect, values: &[Vec<String>]) -> (u64, u64, u64) {
    let mut cells = 0u64;
    let mut max_cols = 0u64;
    for (r, row) in values.iter().enumerate() {
        let row_idx = rect.start_row + r as u32;
        if row_idx >= rect.end_row {
            break;
        }
        let mut written = 0u64;
        for (c, value) in row.iter().enumerate() {
            let col_idx = rect.start_col + c as u32;
            if col_idx >= rect.end_col {
                break;
            }
            if value.is_empty() {
                sheet.cells.remove(&(row_idx, col_idx));
            } else {
                sheet.cells.insert((row_idx, col_idx), value.clone());
            }
            written += 1;
        }
        cells += written;
        max_cols = max_cols.max(written);
    }
    (cells, values.len() as u64, max_cols)
}

fn clear_rect(sheet: &mut StoredSheet, rect: GridRect) {
    sheet
        .cells
        .retain(|&(row, col), _| !(rect.contains_row(row) && rect.start_col <= col && col < rect.end_col));
}

fn apply_request(
    spreadsheet: &mut StoredSpreadsheet,
    request: &BatchRequest,
    next_id: &mut u64,
) -> Result<serde_json::Value> {
    match request {
        BatchRequest::AddSheet { properties } => {
            if spreadsheet
                .sheets
                .iter()
                .any(|s| s.properties.title == properties.title)
            {
                bail!("a sheet named '{}' already exists", properties.title);
            }
            *next_id += 1;
            let sheet_id = *next_id as i64;
            spreadsheet
                .sheets
                .push(StoredSheet::new(sheet_id, &properties.title));
            Ok(json!({
                "addSheet": {"properties": {"sheetId": sheet_id, "title": properties.title}}
            }))
        }
        BatchRequest::MergeCells { range, merge_type: _ } => {
            let sheet = sheet_by_id(spreadsheet, range.sheet_id)?;
            sheet.merges.push(range.rect());
            Ok(json!({}))
        }
        BatchRequest::UnmergeCells { range } => {
            let target = range.rect();
            let sheet = sheet_by_id(spreadsheet, range.sheet_id)?;
            sheet.merges.retain(|m| !m.overlaps(&target));
            Ok(json!({}))
        }
        BatchRequest::SetDataValidation { .. } | BatchRequest::RepeatCell { .. } => Ok(json!({})),
        BatchRequest::AddConditionalFormatRule { rule, index: _ } => {
            for grid_range in &rule.ranges {
                let sheet = sheet_by_id(spreadsheet, grid_range.sheet_id)?;
                sheet.conditional_format_count += 1;
            }
            Ok(json!({}))
        }
        BatchRequest::DeleteConditionalFormatRule { sheet_id, index: _ } => {
            let sheet = sheet_by_id(spreadsheet, *sheet_id)?;
            if sheet.conditional_format_count == 0 {
                bail!("no conditional format rules on sheet {sheet_id}");
            }
            sheet.conditional_format_count -= 1;
            Ok(json!({}))
        }
        BatchRequest::AddNamedRange { named_range } => {
            *next_id += 1;
            let id = format!("nr{next_id}");
            spreadsheet.named_ranges.push(NamedRange {
                named_range_id: id.clone(),
                name: named_range.name.clone(),
                sheet_id: named_range.range.sheet_id,
                rect: named_range.range.rect(),
            });
            Ok(json!({"addNamedRange": {"namedRange": {"namedRangeId": id}}}))
        }
        BatchRequest::DeleteNamedRange { named_range_id } => {
            let before = spreadsheet.named_ranges.len();
            spreadsheet
                .named_ranges
                .retain(|nr| nr.named_range_id != *named_range_id);
            if spreadsheet.named_ranges.len() == before {
                bail!("named range '{named_range_id}' not found");
            }
            Ok(json!({}))
        }
        BatchRequest::CopyPaste {
            source,
            destination,
            paste_type: _,
            paste_orientation,
        } => {
            let block = take_block(spreadsheet, source, false)?;
            paste_block(
                spreadsheet,
                destination.sheet_id,
                destination.rect(),
                &block,
                matches!(
                    paste_orientation,
                    crate::requests::PasteOrientation::Transpose
                ),
            )?;
            Ok(json!({}))
        }
        BatchRequest::CutPaste {
            source,
            destination,
            paste_type: _,
        } => {
            let block = take_block(spreadsheet, source, true)?;
            let GridCoordinate {
                sheet_id,
                row_index,
                column_index,
            } = *destination;
            let rect = GridRect::new(
                row_index,
                row_index + source.rect().row_count(),
                column_index,
                column_index + source.rect().col_count(),
            );
            paste_block(spreadsheet, sheet_id, rect, &block, false)?;
            Ok(json!({}))
        }
    }
}

fn take_block(
    spreadsheet: &mut StoredSpreadsheet,
    source: &GridRange,
    remove: bool,
) -> Result<Vec<Vec<String>>> {
    let rect = source.rect();
    let sheet = sheet_by_id(spreadsheet, source.sheet_id)?;
    let mut block = Vec::new();
    for row in rect.start_row..rect.end_row {
        let mut out = Vec::new();
        for col in rect.start_col..rect.end_col {
            out.push(sheet.cells.get(&(row, col)).cloned().unwrap_or_default());
        }
        block.push(out);
    }
    if remove {
        clear_rect(sheet, rect);
    }
    Ok(block)
}

fn paste_block(
    spreadsheet: &mut StoredSpreadsheet,
    sheet_id: i64,
    rect: GridRect,
    block: &[Vec<String>],
    transpose: bool,
) -> Result<()> {
    let sheet = sheet_by_id(spreadsheet, sheet_id)?;
    let oriented: Vec<Vec<String>> = if transpose {
        let rows = block.len();
        let cols = block.first().map_or(0, |r| r.len());
        (0..cols)
            .map(|c| (0..rows).map(|r| block[r][c].clone()).collect())
            .collect()
    } else {
        block.to_vec()
    };
    for (r, row) in oriented.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let pos = (rect.start_row + r as u32, rect.start_col + c as u32);
            if value.is_empty() {
                sheet.cells.remove(&pos);
            } else {
                sheet.cells.insert(pos, value.clone());
            }
        }
    }
    Ok(())
}

#[async_trait]
impl SpreadsheetService for InMemorySpreadsheetService {
    async fn list_spreadsheets(
        &self,
        _user_email: &str,
        max_results: u32,
    ) -> Result<Vec<SpreadsheetFile>> {
        let inner = self.inner.lock();
        let mut files: Vec<SpreadsheetFile> = inner
            .order
            .iter()
            .filter_map(|id| {
                inner.spreadsheets.get(id).map(|sp| SpreadsheetFile {
                    id: id.clone(),
                    name: sp.title.clone(),
                    modified_time: Some(sp.modified_time.clone()),
                    web_view_link: Some(format!("https://sheets.local/{id}")),
                })
            })
            .collect();
        files.sort_by(|a, b| b.modified_time.cmp(&a.modified_time));
        files.truncate(max_results as usize);
        Ok(files)
    }

    async fn get_metadata(
        &self,
        _user_email: &str,
        spreadsheet_id: &str,
    ) -> Result<SpreadsheetMetadata> {
        let inner = self.inner.lock();
        let sp = inner
            .spreadsheets
            .get(spreadsheet_id)
            .ok_or_else(|| anyhow!("spreadsheet '{spreadsheet_id}' not found"))?;
        Ok(SpreadsheetMetadata {
            spreadsheet_id: spreadsheet_id.to_string(),
            title: sp.title.clone(),
            sheets: sp
                .sheets
                .iter()
                .map(|s| SheetInfo {
                    properties: s.properties.clone(),
                    merges: s.merges.clone(),
                    conditional_format_count: s.conditional_format_count,
                })
                .collect(),
            named_ranges: sp.named_ranges.clone(),
        })
    }

    async fn get_values(
        &self,
        _user_email: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ValueRange> {
        let mut inner = self.inner.lock();
        let sp = inner
            .spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| anyhow!("spreadsheet '{spreadsheet_id}' not found"))?;
        let normalized = normalized_range(sp, range)?;
        let (sheet, rect) = sheet_for_range(sp, range)?;
        Ok(ValueRange {
            range: normalized,
            values: read_rect(sheet, rect),
        })
    }

    async fn batch_get_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> Result<Vec<ValueRange>> {
        let mut out = Vec::with_capacity(ranges.len());
        for range in ranges {
            out.push(self.get_values(user_email, spreadsheet_id, range).await?);
        }
        Ok(out)
    }

    async fn update_values(
        &self,
        _user_email: &str,
        spreadsheet_id: &str,
        range: &str,
        values: Vec<Vec<String>>,
        _input_option: ValueInputOption,
    ) -> Result<UpdateValuesResult> {
        self.with_spreadsheet(spreadsheet_id, |sp| {
            let normalized = normalized_range(sp, range)?;
            let (sheet, rect) = sheet_for_range(sp, range)?;
            let (cells, rows, cols) = write_rect(sheet, rect, &values);
            Ok(UpdateValuesResult {
                updated_range: normalized,
                updated_cells: cells,
                updated_rows: rows,
                updated_columns: cols,
            })
        })
    }

    async fn clear_values(
        &self,
        _user_email: &str,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResult> {
        self.with_spreadsheet(spreadsheet_id, |sp| {
            let normalized = normalized_range(sp, range)?;
            let (sheet, rect) = sheet_for_range(sp, range)?;
            clear_rect(sheet, rect);
            Ok(ClearValuesResult {
                cleared_range: normalized,
            })
        })
    }

    async fn batch_clear_values(
        &self,
        user_email: &str,
        spreadsheet_id: &str,
        ranges: &[String],
    ) -> Result<Vec<String>> {
        let mut cleared = Vec::with_capacity(ranges.len());
        for range in ranges {
            cleared.push(
                self.clear_values(user_email, spreadsheet_id, range)
                    .await?
                    .cleared_range,
            );
        }
        Ok(cleared)
    }

    async fn create_spreadsheet(
        &self,
        _user_email: &str,
        title: &str,
        sheet_names: &[String],
    ) -> Result<CreatedSpreadsheet> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = format!("sp{}", inner.next_id);

        let names: Vec<&str> = if sheet_names.is_empty() {
            vec!["Sheet1"]
        } else {
            sheet_names.iter().map(String::as_str).collect()
        };
        let sheets: Vec<StoredSheet> = names
            .iter()
            .enumerate()
            .map(|(i, name)| StoredSheet::new(i as i64, name))
            .collect();
        let properties: Vec<SheetProperties> =
            sheets.iter().map(|s| s.properties.clone()).collect();

        inner.spreadsheets.insert(
            id.clone(),
            StoredSpreadsheet {
                title: title.to_string(),
                sheets,
                named_ranges: Vec::new(),
                modified_time: Self::now(),
            },
        );
        inner.order.push(id.clone());

        Ok(CreatedSpreadsheet {
            spreadsheet_id: id.clone(),
            spreadsheet_url: format!("https://sheets.local/{id}"),
            sheets: properties,
        })
    }

    async fn batch_update(
        &self,
        _user_email: &str,
        spreadsheet_id: &str,
        requests: Vec<BatchRequest>,
    ) -> Result<Vec<serde_json::Value>> {
        let mut inner = self.inner.lock();
        let mut next_id = inner.next_id;
        let sp = inner
            .spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| anyhow!("spreadsheet '{spreadsheet_id}' not found"))?;

        let mut replies = Vec::with_capacity(requests.len());
        for request in &requests {
            replies.push(apply_request(sp, request, &mut next_id)?);
        }
        sp.modified_time = Self::now();
        inner.next_id = next_id;
        Ok(replies)
    }
}
