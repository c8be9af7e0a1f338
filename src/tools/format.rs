use crate::requests::{
    BatchRequest, Borders, CellFormat, Color, HorizontalAlignment, NumberFormat, TextFormat,
    VerticalAlignment,
};
use crate::state::AppState;
use crate::tools::resolve_range;
use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FormatCellsParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Range to format, e.g. "Sheet1!A1:D10".
    pub range_name: String,
    /// RGB channels in 0.0..=1.0.
    #[serde(default)]
    pub background_color: Option<Color>,
    #[serde(default)]
    pub text_format: Option<TextFormat>,
    /// left, center, or right.
    #[serde(default)]
    pub horizontal_alignment: Option<HorizontalAlignment>,
    /// top, middle, or bottom.
    #[serde(default)]
    pub vertical_alignment: Option<VerticalAlignment>,
    #[serde(default)]
    pub borders: Option<Borders>,
    #[serde(default)]
    pub number_format: Option<NumberFormat>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FormatCellsResponse {
    pub range: String,
    pub cells_formatted: u64,
    pub applied: Vec<String>,
    pub text: String,
}

pub async fn format_cells(
    state: Arc<AppState>,
    params: FormatCellsParams,
) -> Result<FormatCellsResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(user = %user_email, spreadsheet = %params.spreadsheet_id, range = %params.range_name, "format_cells");

    let format = CellFormat {
        background_color: params.background_color,
        text_format: params.text_format,
        horizontal_alignment: params.horizontal_alignment,
        vertical_alignment: params.vertical_alignment,
        borders: params.borders,
        number_format: params.number_format,
    };

    // Nothing to apply; skip the round trip entirely.
    if format.is_empty() {
        let text = format!(
            "No formatting options provided for range '{}'",
            params.range_name
        );
        return Ok(FormatCellsResponse {
            range: params.range_name,
            cells_formatted: 0,
            applied: Vec::new(),
            text,
        });
    }

    let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;
    let resolved = resolve_range(&metadata, &params.range_name)?;

    let applied: Vec<String> = format
        .applied_aspects()
        .into_iter()
        .map(str::to_string)
        .collect();
    let cells_formatted = resolved.rect.cell_count();

    let requests = vec![BatchRequest::repeat_cell_format(
        resolved.grid_range(),
        format,
    )];
    state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;

    let mut text = format!(
        "Successfully formatted {} cells in range '{}' in spreadsheet {} for {}.",
        cells_formatted, params.range_name, params.spreadsheet_id, user_email
    );
    if !applied.is_empty() {
        text.push_str(&format!(" Applied: {}.", applied.join(", ")));
    }

    Ok(FormatCellsResponse {
        range: params.range_name,
        cells_formatted,
        applied,
        text,
    })
}
