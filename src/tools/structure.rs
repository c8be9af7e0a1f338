use crate::errors::InvalidParamsError;
use crate::grid::GridRect;
use crate::requests::{BatchRequest, GridCoordinate, MergeType, PasteOrientation, PasteType};
use crate::state::AppState;
use crate::tools::resolve_range;
use anyhow::{Result, anyhow};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateSpreadsheetParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub title: String,
    /// Sheet names to create; omit for a single default sheet.
    #[serde(default)]
    pub sheet_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CreateSpreadsheetResponse {
    pub spreadsheet_id: String,
    pub spreadsheet_url: String,
    pub sheet_titles: Vec<String>,
    pub text: String,
}

pub async fn create_spreadsheet(
    state: Arc<AppState>,
    params: CreateSpreadsheetParams,
) -> Result<CreateSpreadsheetResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(user = %user_email, title = %params.title, "create_spreadsheet");

    let sheet_names = params.sheet_names.unwrap_or_default();
    let created = state
        .service()
        .create_spreadsheet(&user_email, &params.title, &sheet_names)
        .await?;

    let text = format!(
        "Successfully created spreadsheet '{}' for {}. ID: {} | URL: {}",
        params.title, user_email, created.spreadsheet_id, created.spreadsheet_url
    );

    Ok(CreateSpreadsheetResponse {
        spreadsheet_id: created.spreadsheet_id,
        spreadsheet_url: created.spreadsheet_url,
        sheet_titles: created.sheets.into_iter().map(|s| s.title).collect(),
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateSheetParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    pub sheet_name: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CreateSheetResponse {
    pub sheet_id: i64,
    pub sheet_name: String,
    pub text: String,
}

pub async fn create_sheet(
    state: Arc<AppState>,
    params: CreateSheetParams,
) -> Result<CreateSheetResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(user = %user_email, spreadsheet = %params.spreadsheet_id, sheet = %params.sheet_name, "create_sheet");

    let requests = vec![BatchRequest::AddSheet {
        properties: crate::requests::SheetTitlePayload {
            title: params.sheet_name.clone(),
        },
    }];
    let replies = state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;
    state.invalidate_metadata(&params.spreadsheet_id);

    let sheet_id = replies
        .first()
        .and_then(|r| r.pointer("/addSheet/properties/sheetId"))
        .and_then(|v| v.as_i64())
        .ok_or_else(|| anyhow!("addSheet reply did not carry a sheetId"))?;

    let text = format!(
        "Successfully created sheet '{}' (ID: {}) in spreadsheet {} for {}.",
        params.sheet_name, sheet_id, params.spreadsheet_id, user_email
    );

    Ok(CreateSheetResponse {
        sheet_id,
        sheet_name: params.sheet_name,
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MergeCellsParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Range to merge, e.g. "Sheet1!A1:C3".
    pub range_name: String,
    /// merge_all, merge_columns, or merge_rows.
    #[serde(default)]
    pub merge_type: MergeType,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct MergeCellsResponse {
    pub range: String,
    pub merge_type: String,
    pub text: String,
}

pub async fn merge_cells(
    state: Arc<AppState>,
    params: MergeCellsParams,
) -> Result<MergeCellsResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(user = %user_email, spreadsheet = %params.spreadsheet_id, range = %params.range_name, "merge_cells");

    let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;
    let resolved = resolve_range(&metadata, &params.range_name)?;

    let requests = vec![BatchRequest::MergeCells {
        range: resolved.grid_range(),
        merge_type: params.merge_type,
    }];
    state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;
    state.invalidate_metadata(&params.spreadsheet_id);

    let text = format!(
        "Successfully merged cells in range '{}' in spreadsheet {} for {}. {}.",
        params.range_name,
        params.spreadsheet_id,
        user_email,
        params.merge_type.describe(resolved.rect)
    );

    Ok(MergeCellsResponse {
        range: params.range_name,
        merge_type: params.merge_type.as_str().to_string(),
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UnmergeCellsParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Range whose merged cells should be unmerged.
    pub range_name: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct UnmergeCellsResponse {
    pub range: String,
    pub text: String,
}

pub async fn unmerge_cells(
    state: Arc<AppState>,
    params: UnmergeCellsParams,
) -> Result<UnmergeCellsResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(user = %user_email, spreadsheet = %params.spreadsheet_id, range = %params.range_name, "unmerge_cells");

    let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;
    let resolved = resolve_range(&metadata, &params.range_name)?;

    let requests = vec![BatchRequest::UnmergeCells {
        range: resolved.grid_range(),
    }];
    state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;
    state.invalidate_metadata(&params.spreadsheet_id);

    let text = format!(
        "Successfully unmerged all cells in range '{}' in spreadsheet {} for {}.",
        params.range_name, params.spreadsheet_id, user_email
    );

    Ok(UnmergeCellsResponse {
        range: params.range_name,
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CopyPasteParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Range to copy from, e.g. "DataSheet!A1:B3".
    pub source_range: String,
    /// Destination range, or a single anchor cell to size from the
    /// source, e.g. "TargetSheet!A1".
    pub destination_range: String,
    #[serde(default)]
    pub paste_type: PasteType,
    #[serde(default)]
    pub paste_orientation: PasteOrientation,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CopyPasteResponse {
    pub source: String,
    pub destination: String,
    pub text: String,
}

/// A destination given as a single cell anchors a rect sized from the
/// source, with rows and columns swapped under transpose.
fn size_destination(
    source: GridRect,
    destination: GridRect,
    orientation: PasteOrientation,
) -> GridRect {
    if destination.cell_count() != 1 || source.cell_count() == 1 {
        return destination;
    }
    let (rows, cols) = match orientation {
        PasteOrientation::Normal => (source.row_count(), source.col_count()),
        PasteOrientation::Transpose => (source.col_count(), source.row_count()),
    };
    GridRect::new(
        destination.start_row,
        destination.start_row + rows,
        destination.start_col,
        destination.start_col + cols,
    )
}

pub async fn copy_paste(
    state: Arc<AppState>,
    params: CopyPasteParams,
) -> Result<CopyPasteResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(
        user = %user_email,
        spreadsheet = %params.spreadsheet_id,
        source = %params.source_range,
        destination = %params.destination_range,
        "copy_paste"
    );

    let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;
    let source = resolve_range(&metadata, &params.source_range)?;
    let destination = resolve_range(&metadata, &params.destination_range)?;
    let dest_rect = size_destination(source.rect, destination.rect, params.paste_orientation);

    let requests = vec![BatchRequest::CopyPaste {
        source: source.grid_range(),
        destination: crate::requests::GridRange::new(destination.sheet_id, dest_rect),
        paste_type: params.paste_type,
        paste_orientation: params.paste_orientation,
    }];
    state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;
    state.invalidate_metadata(&params.spreadsheet_id);

    let text = format!(
        "Successfully copied '{}' to '{}' in spreadsheet {} for {} ({}, {}).",
        params.source_range,
        params.destination_range,
        params.spreadsheet_id,
        user_email,
        params.paste_type.as_str(),
        params.paste_orientation.as_str()
    );

    Ok(CopyPasteResponse {
        source: params.source_range,
        destination: params.destination_range,
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CutPasteParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Range to cut, e.g. "DataSheet!L1:M3".
    pub source_range: String,
    /// Single destination cell the cut block lands at, e.g.
    /// "TargetSheet!G1".
    pub destination_cell: String,
    #[serde(default)]
    pub paste_type: PasteType,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CutPasteResponse {
    pub source: String,
    pub destination: String,
    pub text: String,
}

pub async fn cut_paste(state: Arc<AppState>, params: CutPasteParams) -> Result<CutPasteResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(
        user = %user_email,
        spreadsheet = %params.spreadsheet_id,
        source = %params.source_range,
        destination = %params.destination_cell,
        "cut_paste"
    );

    let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;
    let source = resolve_range(&metadata, &params.source_range)?;
    let destination = resolve_range(&metadata, &params.destination_cell)?;
    if destination.rect.cell_count() != 1 {
        return Err(InvalidParamsError::new(
            "cut_paste",
            "'destination_cell' must be a single cell, e.g. \"TargetSheet!G1\"",
        )
        .with_path("destination_cell")
        .into());
    }

    let requests = vec![BatchRequest::CutPaste {
        source: source.grid_range(),
        destination: GridCoordinate {
            sheet_id: destination.sheet_id,
            row_index: destination.rect.start_row,
            column_index: destination.rect.start_col,
        },
        paste_type: params.paste_type,
    }];
    state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;
    state.invalidate_metadata(&params.spreadsheet_id);

    let text = format!(
        "Successfully moved '{}' to '{}' in spreadsheet {} for {}.",
        params.source_range, params.destination_cell, params.spreadsheet_id, user_email
    );

    Ok(CutPasteResponse {
        source: params.source_range,
        destination: params.destination_cell,
        text,
    })
}
