use crate::errors::InvalidParamsError;
use crate::model::ValueRange;
use crate::requests::ValueInputOption;
use crate::state::AppState;
use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ModifySheetValuesParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Range to write or clear, e.g. "Sheet1!A1:D10".
    pub range_name: String,
    /// Rows of values. Required unless `clear_values` is true.
    #[serde(default)]
    pub values: Option<Vec<Vec<String>>>,
    #[serde(default)]
    pub value_input_option: ValueInputOption,
    /// Clear the range instead of writing values.
    #[serde(default)]
    pub clear_values: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ModifySheetValuesResponse {
    pub range: String,
    pub cleared: bool,
    pub updated_cells: u64,
    pub updated_rows: u64,
    pub updated_columns: u64,
    pub text: String,
}

pub async fn modify_sheet_values(
    state: Arc<AppState>,
    params: ModifySheetValuesParams,
) -> Result<ModifySheetValuesResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    let operation = if params.clear_values { "clear" } else { "write" };
    tracing::info!(
        user = %user_email,
        spreadsheet = %params.spreadsheet_id,
        range = %params.range_name,
        operation,
        "modify_sheet_values"
    );

    if params.clear_values {
        let result = state
            .service()
            .clear_values(&user_email, &params.spreadsheet_id, &params.range_name)
            .await?;
        let cleared_range = if result.cleared_range.is_empty() {
            params.range_name.clone()
        } else {
            result.cleared_range
        };
        let text = format!(
            "Successfully cleared range '{}' in spreadsheet {} for {}.",
            cleared_range, params.spreadsheet_id, user_email
        );
        return Ok(ModifySheetValuesResponse {
            range: cleared_range,
            cleared: true,
            updated_cells: 0,
            updated_rows: 0,
            updated_columns: 0,
            text,
        });
    }

    let values = match params.values {
        Some(values) if !values.is_empty() => values,
        _ => {
            return Err(InvalidParamsError::new(
                "modify_sheet_values",
                "either 'values' must be provided or 'clear_values' must be true",
            )
            .with_path("values")
            .into());
        }
    };

    let result = state
        .service()
        .update_values(
            &user_email,
            &params.spreadsheet_id,
            &params.range_name,
            values,
            params.value_input_option,
        )
        .await?;

    let text = format!(
        "Successfully updated range '{}' in spreadsheet {} for {}. Updated: {} cells, {} rows, {} columns.",
        params.range_name,
        params.spreadsheet_id,
        user_email,
        result.updated_cells,
        result.updated_rows,
        result.updated_columns
    );

    Ok(ModifySheetValuesResponse {
        range: params.range_name,
        cleared: false,
        updated_cells: result.updated_cells,
        updated_rows: result.updated_rows,
        updated_columns: result.updated_columns,
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchGetValuesParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Ranges to read in one round trip.
    pub ranges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BatchGetValuesResponse {
    pub value_ranges: Vec<ValueRange>,
    pub text: String,
}

pub async fn batch_get_values(
    state: Arc<AppState>,
    params: BatchGetValuesParams,
) -> Result<BatchGetValuesResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(
        user = %user_email,
        spreadsheet = %params.spreadsheet_id,
        ranges = params.ranges.len(),
        "batch_get_values"
    );

    if params.ranges.is_empty() {
        return Err(InvalidParamsError::new(
            "batch_get_values",
            "'ranges' must contain at least one range",
        )
        .with_path("ranges")
        .into());
    }

    let value_ranges = state
        .service()
        .batch_get_values(&user_email, &params.spreadsheet_id, &params.ranges)
        .await?;

    let mut lines = vec![format!(
        "Read {} ranges from spreadsheet {} for {}:",
        value_ranges.len(),
        params.spreadsheet_id,
        user_email
    )];
    for vr in &value_ranges {
        lines.push(format!("  - {}: {} rows", vr.range, vr.values.len()));
    }

    Ok(BatchGetValuesResponse {
        value_ranges,
        text: lines.join("\n"),
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BatchClearValuesParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Ranges to clear in one round trip.
    pub ranges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct BatchClearValuesResponse {
    pub cleared_ranges: Vec<String>,
    pub text: String,
}

pub async fn batch_clear_values(
    state: Arc<AppState>,
    params: BatchClearValuesParams,
) -> Result<BatchClearValuesResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(
        user = %user_email,
        spreadsheet = %params.spreadsheet_id,
        ranges = params.ranges.len(),
        "batch_clear_values"
    );

    if params.ranges.is_empty() {
        return Err(InvalidParamsError::new(
            "batch_clear_values",
            "'ranges' must contain at least one range",
        )
        .with_path("ranges")
        .into());
    }

    let cleared_ranges = state
        .service()
        .batch_clear_values(&user_email, &params.spreadsheet_id, &params.ranges)
        .await?;

    let text = format!(
        "Successfully cleared {} ranges in spreadsheet {} for {}: {}",
        cleared_ranges.len(),
        params.spreadsheet_id,
        user_email,
        cleared_ranges.join(", ")
    );

    Ok(BatchClearValuesResponse {
        cleared_ranges,
        text,
    })
}
