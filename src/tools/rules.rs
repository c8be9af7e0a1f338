use crate::requests::BatchRequest;
use crate::rules::{ConditionalFormatRule, ValidationRule};
use crate::state::AppState;
use crate::tools::{default_true, resolve_range};
use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddDataValidationParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Range to validate, e.g. "Sheet1!A1:A10".
    pub range_name: String,
    /// The validation rule, tagged by `kind`.
    pub rule: ValidationRule,
    /// Help text shown when a cell is selected.
    #[serde(default)]
    pub input_message: Option<String>,
    /// Reject input that fails validation instead of warning.
    #[serde(default = "default_true")]
    pub reject_invalid: bool,
    /// Show the dropdown arrow for list rules.
    #[serde(default = "default_true")]
    pub show_dropdown: bool,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AddDataValidationResponse {
    pub range: String,
    pub kind: String,
    pub cells_validated: u64,
    pub text: String,
}

pub async fn add_data_validation(
    state: Arc<AppState>,
    params: AddDataValidationParams,
) -> Result<AddDataValidationResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(
        user = %user_email,
        spreadsheet = %params.spreadsheet_id,
        range = %params.range_name,
        kind = params.rule.kind_name(),
        "add_data_validation"
    );

    let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;
    let resolved = resolve_range(&metadata, &params.range_name)?;

    let rule_payload = params.rule.to_payload(
        &resolved.sheet_title,
        &params.range_name,
        params.input_message.as_deref(),
        params.reject_invalid,
        params.show_dropdown,
    )?;

    let requests = vec![BatchRequest::SetDataValidation {
        range: resolved.grid_range(),
        rule: Some(rule_payload),
    }];
    state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;

    let cells_validated = resolved.rect.cell_count();
    let text = format!(
        "Successfully added {} validation to {} cells in range '{}' in spreadsheet {} for {}.",
        params.rule.kind_name(),
        cells_validated,
        params.range_name,
        params.spreadsheet_id,
        user_email
    );

    Ok(AddDataValidationResponse {
        range: params.range_name,
        kind: params.rule.kind_name().to_string(),
        cells_validated,
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ClearDataValidationParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Range to strip of validation rules.
    pub range_name: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ClearDataValidationResponse {
    pub range: String,
    pub text: String,
}

pub async fn clear_data_validation(
    state: Arc<AppState>,
    params: ClearDataValidationParams,
) -> Result<ClearDataValidationResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(user = %user_email, spreadsheet = %params.spreadsheet_id, range = %params.range_name, "clear_data_validation");

    let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;
    let resolved = resolve_range(&metadata, &params.range_name)?;

    // setDataValidation with no rule clears the range.
    let requests = vec![BatchRequest::SetDataValidation {
        range: resolved.grid_range(),
        rule: None,
    }];
    state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;

    let text = format!(
        "Successfully cleared data validation from range '{}' in spreadsheet {} for {}.",
        params.range_name, params.spreadsheet_id, user_email
    );

    Ok(ClearDataValidationResponse {
        range: params.range_name,
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AddConditionalFormattingParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Range the rule applies to, e.g. "Sheet1!A1:D10".
    pub range_name: String,
    /// The formatting rule, tagged by `kind`.
    pub rule: ConditionalFormatRule,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AddConditionalFormattingResponse {
    pub range: String,
    pub kind: String,
    pub cells_formatted: u64,
    pub text: String,
}

pub async fn add_conditional_formatting(
    state: Arc<AppState>,
    params: AddConditionalFormattingParams,
) -> Result<AddConditionalFormattingResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(
        user = %user_email,
        spreadsheet = %params.spreadsheet_id,
        range = %params.range_name,
        kind = params.rule.kind_name(),
        "add_conditional_formatting"
    );

    let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;
    let resolved = resolve_range(&metadata, &params.range_name)?;

    let rule_payload = params.rule.to_payload(vec![resolved.grid_range()])?;

    // Index 0 puts the new rule at highest priority.
    let requests = vec![BatchRequest::AddConditionalFormatRule {
        rule: rule_payload,
        index: 0,
    }];
    state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;
    state.invalidate_metadata(&params.spreadsheet_id);

    let cells_formatted = resolved.rect.cell_count();
    let text = format!(
        "Successfully added {} conditional formatting to {} cells in range '{}' in spreadsheet {} for {}.",
        params.rule.kind_name(),
        cells_formatted,
        params.range_name,
        params.spreadsheet_id,
        user_email
    );

    Ok(AddConditionalFormattingResponse {
        range: params.range_name,
        kind: params.rule.kind_name().to_string(),
        cells_formatted,
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ClearConditionalFormattingParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// Restrict clearing to one sheet; omit to clear every sheet.
    #[serde(default)]
    pub sheet_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ClearConditionalFormattingResponse {
    pub rules_cleared: usize,
    pub text: String,
}

pub async fn clear_conditional_formatting(
    state: Arc<AppState>,
    params: ClearConditionalFormattingParams,
) -> Result<ClearConditionalFormattingResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(
        user = %user_email,
        spreadsheet = %params.spreadsheet_id,
        sheet = params.sheet_name.as_deref().unwrap_or("All"),
        "clear_conditional_formatting"
    );

    let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;
    if let Some(name) = params.sheet_name.as_deref() {
        // Surface a typed error for an unknown sheet before building
        // an empty request list.
        metadata.sheet_by_title(name)?;
    }

    let mut requests = Vec::new();
    for sheet in &metadata.sheets {
        if let Some(name) = params.sheet_name.as_deref() {
            if sheet.properties.title != name {
                continue;
            }
        }
        // Rules shift down as they are deleted, so always index 0.
        for _ in 0..sheet.conditional_format_count {
            requests.push(BatchRequest::DeleteConditionalFormatRule {
                sheet_id: sheet.properties.sheet_id,
                index: 0,
            });
        }
    }

    if requests.is_empty() {
        let text = format!("No conditional formatting rules found to clear for {user_email}.");
        return Ok(ClearConditionalFormattingResponse {
            rules_cleared: 0,
            text,
        });
    }

    let rules_cleared = requests.len();
    state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;
    state.invalidate_metadata(&params.spreadsheet_id);

    let scope = match params.sheet_name.as_deref() {
        Some(name) => format!("sheet '{name}'"),
        None => "all sheets".to_string(),
    };
    let text = format!(
        "Successfully cleared {} conditional formatting rules from {} in spreadsheet {} for {}.",
        rules_cleared, scope, params.spreadsheet_id, user_email
    );

    Ok(ClearConditionalFormattingResponse {
        rules_cleared,
        text,
    })
}
