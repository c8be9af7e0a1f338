use crate::grid::to_a1_with_sheet;
use crate::requests::{BatchRequest, NamedRangePayload};
use crate::state::AppState;
use crate::tools::read::NamedRangeDisplay;
use crate::tools::resolve_range;
use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateNamedRangeParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// The name to assign, e.g. "SalesData".
    pub name: String,
    /// Range covered by the name, e.g. "Sheet1!A1:D10".
    pub range_name: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct CreateNamedRangeResponse {
    pub name: String,
    pub range: String,
    pub text: String,
}

pub async fn create_named_range(
    state: Arc<AppState>,
    params: CreateNamedRangeParams,
) -> Result<CreateNamedRangeResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(user = %user_email, spreadsheet = %params.spreadsheet_id, name = %params.name, "create_named_range");

    let metadata = state.metadata(&user_email, &params.spreadsheet_id).await?;
    let resolved = resolve_range(&metadata, &params.range_name)?;

    let requests = vec![BatchRequest::AddNamedRange {
        named_range: NamedRangePayload {
            name: params.name.clone(),
            range: resolved.grid_range(),
        },
    }];
    state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;
    state.invalidate_metadata(&params.spreadsheet_id);

    let text = format!(
        "Successfully created named range '{}' for range '{}' in spreadsheet {} for {}.",
        params.name, params.range_name, params.spreadsheet_id, user_email
    );

    Ok(CreateNamedRangeResponse {
        name: params.name,
        range: params.range_name,
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListNamedRangesParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListNamedRangesResponse {
    pub spreadsheet_title: String,
    pub named_ranges: Vec<NamedRangeDisplay>,
    pub text: String,
}

pub async fn list_named_ranges(
    state: Arc<AppState>,
    params: ListNamedRangesParams,
) -> Result<ListNamedRangesResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(user = %user_email, spreadsheet = %params.spreadsheet_id, "list_named_ranges");

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

    let text = if named_ranges.is_empty() {
        format!(
            "No named ranges found in spreadsheet '{}' for {}.",
            metadata.title, user_email
        )
    } else {
        let mut lines = vec![format!(
            "Found {} named ranges in spreadsheet '{}' for {}:",
            named_ranges.len(),
            metadata.title,
            user_email
        )];
        for nr in &named_ranges {
            lines.push(format!(
                "- '{}' (ID: {}): {}",
                nr.name, nr.named_range_id, nr.range
            ));
        }
        lines.join("\n")
    };

    Ok(ListNamedRangesResponse {
        spreadsheet_title: metadata.title.clone(),
        named_ranges,
        text,
    })
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteNamedRangeParams {
    #[serde(default)]
    pub user_email: Option<String>,
    pub spreadsheet_id: String,
    /// The service-assigned id, not the display name.
    pub named_range_id: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DeleteNamedRangeResponse {
    pub named_range_id: String,
    pub text: String,
}

pub async fn delete_named_range(
    state: Arc<AppState>,
    params: DeleteNamedRangeParams,
) -> Result<DeleteNamedRangeResponse> {
    let config = state.config();
    let user_email = config.resolve_user_email(params.user_email.as_deref());
    tracing::info!(user = %user_email, spreadsheet = %params.spreadsheet_id, id = %params.named_range_id, "delete_named_range");

    let requests = vec![BatchRequest::DeleteNamedRange {
        named_range_id: params.named_range_id.clone(),
    }];
    state
        .service()
        .batch_update(&user_email, &params.spreadsheet_id, requests)
        .await?;
    state.invalidate_metadata(&params.spreadsheet_id);

    let text = format!(
        "Successfully deleted named range with ID '{}' from spreadsheet {} for {}.",
        params.named_range_id, params.spreadsheet_id, user_email
    );

    Ok(DeleteNamedRangeResponse {
        named_range_id: params.named_range_id,
        text,
    })
}
