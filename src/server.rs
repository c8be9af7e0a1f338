use crate::config::ServerConfig;
use crate::errors::{InvalidParamsError, InvalidRangeError, SheetNotFoundError};
use crate::service::SpreadsheetService;
use crate::state::AppState;
use crate::tools;
use anyhow::{Result, anyhow};
use rmcp::{
    ErrorData as McpError, Json, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use {once_cell::sync::Lazy, regex::Regex};

const INSTRUCTIONS: &str = "\
Sheets MCP: structured access to spreadsheets in a user's drive.

WORKFLOW:
1) list_spreadsheets to find a file, then get_spreadsheet_info for orientation
2) read_sheet_values (or batch_get_values) to inspect data
3) modify_sheet_values / format_cells / merge_cells etc. to change it

RANGES: A1 notation, optionally sheet-qualified (e.g. \"Sheet1!A1:D10\").
A range without a sheet qualifier targets the spreadsheet's first sheet.
Column letters are case-insensitive; rows are 1-based.

TOOL SELECTION:
- read_sheet_values: One range; annotates merged cells. Defaults to a bounded window.
- batch_get_values / batch_clear_values: Several ranges in one round trip.
- modify_sheet_values: Write values, or set clear_values=true to clear.
- format_cells: Background, text format, alignment, borders, number format.
- add_data_validation: rule.kind is one of list, list_from_range, number, date, \
text_length, custom_formula, checkbox.
- add_conditional_formatting: rule.kind is one of single_color, color_scale, \
data_bar, custom_formula. New rules get highest priority.
- copy_paste: Destination may be a full range or a single anchor cell.
- cut_paste: Destination must be a single cell.

All tools accept an optional user_email; omit it to act as the configured \
default user.";

#[derive(Clone)]
pub struct SheetsServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<SheetsServer>,
}

impl SheetsServer {
    pub fn new(config: Arc<ServerConfig>, service: Arc<dyn SpreadsheetService>) -> Self {
        let state = Arc::new(AppState::new(config, service));
        Self::from_state(state)
    }

    pub fn from_state(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn run_stdio(self) -> Result<()> {
        let service = self
            .serve(stdio())
            .await
            .inspect_err(|error| tracing::error!("serving error: {:?}", error))?;
        service.waiting().await?;
        Ok(())
    }

    fn ensure_tool_enabled(&self, tool: &str) -> Result<()> {
        tracing::info!(tool = tool, "tool invocation requested");
        if self.state.config().is_tool_enabled(tool) {
            Ok(())
        } else {
            Err(ToolDisabledError::new(tool).into())
        }
    }

    async fn run_tool_with_timeout<T, F>(&self, tool: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
        T: Serialize,
    {
        let result = if let Some(timeout_duration) = self.state.config().tool_timeout() {
            match tokio::time::timeout(timeout_duration, fut).await {
                Ok(result) => result,
                Err(_) => Err(anyhow!(
                    "tool '{}' timed out after {}ms",
                    tool,
                    timeout_duration.as_millis()
                )),
            }
        } else {
            fut.await
        }?;

        self.ensure_response_size(tool, &result)?;
        Ok(result)
    }

    fn ensure_response_size<T: Serialize>(&self, tool: &str, value: &T) -> Result<()> {
        let Some(limit) = self.state.config().max_response_bytes() else {
            return Ok(());
        };
        let payload = serde_json::to_vec(value)
            .map_err(|e| anyhow!("failed to serialize response for {}: {}", tool, e))?;
        if payload.len() > limit {
            return Err(ResponseTooLargeError::new(tool, payload.len(), limit).into());
        }
        Ok(())
    }
}

#[tool_router]
impl SheetsServer {
    #[tool(
        name = "list_spreadsheets",
        description = "List spreadsheet files the user can access"
    )]
    pub async fn list_spreadsheets(
        &self,
        Parameters(params): Parameters<tools::ListSpreadsheetsParams>,
    ) -> Result<Json<tools::ListSpreadsheetsResponse>, McpError> {
        self.ensure_tool_enabled("list_spreadsheets")
            .map_err(|e| to_mcp_error_for_tool("list_spreadsheets", e))?;
        self.run_tool_with_timeout(
            "list_spreadsheets",
            tools::list_spreadsheets(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("list_spreadsheets", e))
    }

    #[tool(
        name = "get_spreadsheet_info",
        description = "Describe a spreadsheet's sheets, merges, and named ranges"
    )]
    pub async fn get_spreadsheet_info(
        &self,
        Parameters(params): Parameters<tools::GetSpreadsheetInfoParams>,
    ) -> Result<Json<tools::GetSpreadsheetInfoResponse>, McpError> {
        self.ensure_tool_enabled("get_spreadsheet_info")
            .map_err(|e| to_mcp_error_for_tool("get_spreadsheet_info", e))?;
        self.run_tool_with_timeout(
            "get_spreadsheet_info",
            tools::get_spreadsheet_info(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("get_spreadsheet_info", e))
    }

    #[tool(
        name = "read_sheet_values",
        description = "Read values from a range with merged-cell annotations"
    )]
    pub async fn read_sheet_values(
        &self,
        Parameters(params): Parameters<tools::ReadSheetValuesParams>,
    ) -> Result<Json<tools::ReadSheetValuesResponse>, McpError> {
        self.ensure_tool_enabled("read_sheet_values")
            .map_err(|e| to_mcp_error_for_tool("read_sheet_values", e))?;
        self.run_tool_with_timeout(
            "read_sheet_values",
            tools::read_sheet_values(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("read_sheet_values", e))
    }

    #[tool(
        name = "modify_sheet_values",
        description = "Write, update, or clear values in a range"
    )]
    pub async fn modify_sheet_values(
        &self,
        Parameters(params): Parameters<tools::ModifySheetValuesParams>,
    ) -> Result<Json<tools::ModifySheetValuesResponse>, McpError> {
        self.ensure_tool_enabled("modify_sheet_values")
            .map_err(|e| to_mcp_error_for_tool("modify_sheet_values", e))?;
        self.run_tool_with_timeout(
            "modify_sheet_values",
            tools::modify_sheet_values(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("modify_sheet_values", e))
    }

    #[tool(
        name = "batch_get_values",
        description = "Read several ranges in one round trip"
    )]
    pub async fn batch_get_values(
        &self,
        Parameters(params): Parameters<tools::BatchGetValuesParams>,
    ) -> Result<Json<tools::BatchGetValuesResponse>, McpError> {
        self.ensure_tool_enabled("batch_get_values")
            .map_err(|e| to_mcp_error_for_tool("batch_get_values", e))?;
        self.run_tool_with_timeout(
            "batch_get_values",
            tools::batch_get_values(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("batch_get_values", e))
    }

    #[tool(
        name = "batch_clear_values",
        description = "Clear several ranges in one round trip"
    )]
    pub async fn batch_clear_values(
        &self,
        Parameters(params): Parameters<tools::BatchClearValuesParams>,
    ) -> Result<Json<tools::BatchClearValuesResponse>, McpError> {
        self.ensure_tool_enabled("batch_clear_values")
            .map_err(|e| to_mcp_error_for_tool("batch_clear_values", e))?;
        self.run_tool_with_timeout(
            "batch_clear_values",
            tools::batch_clear_values(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("batch_clear_values", e))
    }

    #[tool(name = "create_spreadsheet", description = "Create a new spreadsheet")]
    pub async fn create_spreadsheet(
        &self,
        Parameters(params): Parameters<tools::CreateSpreadsheetParams>,
    ) -> Result<Json<tools::CreateSpreadsheetResponse>, McpError> {
        self.ensure_tool_enabled("create_spreadsheet")
            .map_err(|e| to_mcp_error_for_tool("create_spreadsheet", e))?;
        self.run_tool_with_timeout(
            "create_spreadsheet",
            tools::create_spreadsheet(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("create_spreadsheet", e))
    }

    #[tool(
        name = "create_sheet",
        description = "Add a sheet to an existing spreadsheet"
    )]
    pub async fn create_sheet(
        &self,
        Parameters(params): Parameters<tools::CreateSheetParams>,
    ) -> Result<Json<tools::CreateSheetResponse>, McpError> {
        self.ensure_tool_enabled("create_sheet")
            .map_err(|e| to_mcp_error_for_tool("create_sheet", e))?;
        self.run_tool_with_timeout(
            "create_sheet",
            tools::create_sheet(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("create_sheet", e))
    }

    #[tool(name = "merge_cells", description = "Merge cells in a range")]
    pub async fn merge_cells(
        &self,
        Parameters(params): Parameters<tools::MergeCellsParams>,
    ) -> Result<Json<tools::MergeCellsResponse>, McpError> {
        self.ensure_tool_enabled("merge_cells")
            .map_err(|e| to_mcp_error_for_tool("merge_cells", e))?;
        self.run_tool_with_timeout(
            "merge_cells",
            tools::merge_cells(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("merge_cells", e))
    }

    #[tool(
        name = "unmerge_cells",
        description = "Unmerge all merged cells within a range"
    )]
    pub async fn unmerge_cells(
        &self,
        Parameters(params): Parameters<tools::UnmergeCellsParams>,
    ) -> Result<Json<tools::UnmergeCellsResponse>, McpError> {
        self.ensure_tool_enabled("unmerge_cells")
            .map_err(|e| to_mcp_error_for_tool("unmerge_cells", e))?;
        self.run_tool_with_timeout(
            "unmerge_cells",
            tools::unmerge_cells(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("unmerge_cells", e))
    }

    #[tool(
        name = "copy_paste",
        description = "Copy a range to another location, optionally transposed"
    )]
    pub async fn copy_paste(
        &self,
        Parameters(params): Parameters<tools::CopyPasteParams>,
    ) -> Result<Json<tools::CopyPasteResponse>, McpError> {
        self.ensure_tool_enabled("copy_paste")
            .map_err(|e| to_mcp_error_for_tool("copy_paste", e))?;
        self.run_tool_with_timeout("copy_paste", tools::copy_paste(self.state.clone(), params))
            .await
            .map(Json)
            .map_err(|e| to_mcp_error_for_tool("copy_paste", e))
    }

    #[tool(
        name = "cut_paste",
        description = "Cut a range and move it to a destination cell"
    )]
    pub async fn cut_paste(
        &self,
        Parameters(params): Parameters<tools::CutPasteParams>,
    ) -> Result<Json<tools::CutPasteResponse>, McpError> {
        self.ensure_tool_enabled("cut_paste")
            .map_err(|e| to_mcp_error_for_tool("cut_paste", e))?;
        self.run_tool_with_timeout("cut_paste", tools::cut_paste(self.state.clone(), params))
            .await
            .map(Json)
            .map_err(|e| to_mcp_error_for_tool("cut_paste", e))
    }

    #[tool(
        name = "format_cells",
        description = "Apply cell formatting (colors, fonts, alignment, borders, number format)"
    )]
    pub async fn format_cells(
        &self,
        Parameters(params): Parameters<tools::FormatCellsParams>,
    ) -> Result<Json<tools::FormatCellsResponse>, McpError> {
        self.ensure_tool_enabled("format_cells")
            .map_err(|e| to_mcp_error_for_tool("format_cells", e))?;
        self.run_tool_with_timeout(
            "format_cells",
            tools::format_cells(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("format_cells", e))
    }

    #[tool(
        name = "add_data_validation",
        description = "Add a data-validation rule to a range"
    )]
    pub async fn add_data_validation(
        &self,
        Parameters(params): Parameters<tools::AddDataValidationParams>,
    ) -> Result<Json<tools::AddDataValidationResponse>, McpError> {
        self.ensure_tool_enabled("add_data_validation")
            .map_err(|e| to_mcp_error_for_tool("add_data_validation", e))?;
        self.run_tool_with_timeout(
            "add_data_validation",
            tools::add_data_validation(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("add_data_validation", e))
    }

    #[tool(
        name = "clear_data_validation",
        description = "Remove data validation from a range"
    )]
    pub async fn clear_data_validation(
        &self,
        Parameters(params): Parameters<tools::ClearDataValidationParams>,
    ) -> Result<Json<tools::ClearDataValidationResponse>, McpError> {
        self.ensure_tool_enabled("clear_data_validation")
            .map_err(|e| to_mcp_error_for_tool("clear_data_validation", e))?;
        self.run_tool_with_timeout(
            "clear_data_validation",
            tools::clear_data_validation(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("clear_data_validation", e))
    }

    #[tool(
        name = "add_conditional_formatting",
        description = "Add a conditional-formatting rule at highest priority"
    )]
    pub async fn add_conditional_formatting(
        &self,
        Parameters(params): Parameters<tools::AddConditionalFormattingParams>,
    ) -> Result<Json<tools::AddConditionalFormattingResponse>, McpError> {
        self.ensure_tool_enabled("add_conditional_formatting")
            .map_err(|e| to_mcp_error_for_tool("add_conditional_formatting", e))?;
        self.run_tool_with_timeout(
            "add_conditional_formatting",
            tools::add_conditional_formatting(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("add_conditional_formatting", e))
    }

    #[tool(
        name = "clear_conditional_formatting",
        description = "Clear conditional-formatting rules from one sheet or all sheets"
    )]
    pub async fn clear_conditional_formatting(
        &self,
        Parameters(params): Parameters<tools::ClearConditionalFormattingParams>,
    ) -> Result<Json<tools::ClearConditionalFormattingResponse>, McpError> {
        self.ensure_tool_enabled("clear_conditional_formatting")
            .map_err(|e| to_mcp_error_for_tool("clear_conditional_formatting", e))?;
        self.run_tool_with_timeout(
            "clear_conditional_formatting",
            tools::clear_conditional_formatting(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("clear_conditional_formatting", e))
    }

    #[tool(name = "create_named_range", description = "Name a range")]
    pub async fn create_named_range(
        &self,
        Parameters(params): Parameters<tools::CreateNamedRangeParams>,
    ) -> Result<Json<tools::CreateNamedRangeResponse>, McpError> {
        self.ensure_tool_enabled("create_named_range")
            .map_err(|e| to_mcp_error_for_tool("create_named_range", e))?;
        self.run_tool_with_timeout(
            "create_named_range",
            tools::create_named_range(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("create_named_range", e))
    }

    #[tool(name = "list_named_ranges", description = "List all named ranges")]
    pub async fn list_named_ranges(
        &self,
        Parameters(params): Parameters<tools::ListNamedRangesParams>,
    ) -> Result<Json<tools::ListNamedRangesResponse>, McpError> {
        self.ensure_tool_enabled("list_named_ranges")
            .map_err(|e| to_mcp_error_for_tool("list_named_ranges", e))?;
        self.run_tool_with_timeout(
            "list_named_ranges",
            tools::list_named_ranges(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("list_named_ranges", e))
    }

    #[tool(name = "delete_named_range", description = "Delete a named range by id")]
    pub async fn delete_named_range(
        &self,
        Parameters(params): Parameters<tools::DeleteNamedRangeParams>,
    ) -> Result<Json<tools::DeleteNamedRangeResponse>, McpError> {
        self.ensure_tool_enabled("delete_named_range")
            .map_err(|e| to_mcp_error_for_tool("delete_named_range", e))?;
        self.run_tool_with_timeout(
            "delete_named_range",
            tools::delete_named_range(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("delete_named_range", e))
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SheetsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }
}

fn to_mcp_error_for_tool(tool: &str, error: anyhow::Error) -> McpError {
    if error.is::<ToolDisabledError>() || error.is::<ResponseTooLargeError>() {
        return McpError::invalid_request(error.to_string(), None);
    }

    if error.is::<InvalidRangeError>() || error.is::<SheetNotFoundError>() {
        return McpError::invalid_params(
            format!("Invalid params for tool '{tool}': {error}"),
            None,
        );
    }

    if let Some(inv) = error.downcast_ref::<InvalidParamsError>() {
        let msg = format_invalid_params_message(
            tool,
            inv.message(),
            inv.path(),
            None,
            tool_minimal_example(tool),
        );
        return McpError::invalid_params(msg, None);
    }

    if let Some(serde_err) = error.downcast_ref::<serde_json::Error>() {
        let problem = serde_err.to_string();
        let path = infer_path_for_tool(tool, &problem);

        let mut variants = extract_expected_variants(&problem);
        if variants.is_empty()
            && let Some(extra) = tool_variants(tool, &problem)
        {
            variants = extra.into_iter().map(|s| s.to_string()).collect();
        }

        let msg = format_invalid_params_message(
            tool,
            &problem,
            path.as_deref(),
            if variants.is_empty() {
                None
            } else {
                Some(&variants)
            },
            tool_minimal_example(tool),
        );
        return McpError::invalid_params(msg, None);
    }

    // Shape/enum mistakes raised through bail! rather than typed errors.
    let problem = error.to_string();
    if looks_like_invalid_params(&problem) {
        let path = infer_path_for_tool(tool, &problem);
        let variants = tool_variants(tool, &problem)
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        let msg = format_invalid_params_message(
            tool,
            &problem,
            path.as_deref(),
            if variants.is_empty() {
                None
            } else {
                Some(&variants)
            },
            tool_minimal_example(tool),
        );
        return McpError::invalid_params(msg, None);
    }

    McpError::internal_error(problem, None)
}

fn format_invalid_params_message(
    tool: &str,
    problem: &str,
    path: Option<&str>,
    variants: Option<&[String]>,
    example: Option<&'static str>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Invalid params for tool '{tool}': {problem}"));

    if let Some(path) = path {
        out.push_str(&format!("\npath: {path}"));
    }

    if let Some(variants) = variants
        && !variants.is_empty()
    {
        out.push_str("\nvalid variants: ");
        out.push_str(&variants.join(", "));
    }

    if let Some(example) = example {
        out.push_str("\nexample: ");
        out.push_str(example);
    }

    out
}

fn tool_minimal_example(tool: &str) -> Option<&'static str> {
    match tool {
        "add_data_validation" => Some(
            r#"{"spreadsheet_id":"<id>","range_name":"Sheet1!A1:A10","rule":{"kind":"list","values":["Yes","No"]}}"#,
        ),
        "add_conditional_formatting" => Some(
            r#"{"spreadsheet_id":"<id>","range_name":"Sheet1!B2:B100","rule":{"kind":"single_color","condition":"number_greater","values":["100"],"format":{"background_color":{"red":0.0,"green":1.0,"blue":0.0}}}}"#,
        ),
        "format_cells" => Some(
            r#"{"spreadsheet_id":"<id>","range_name":"Sheet1!A1:D1","text_format":{"bold":true},"horizontal_alignment":"center"}"#,
        ),
        "modify_sheet_values" => Some(
            r#"{"spreadsheet_id":"<id>","range_name":"Sheet1!A1:B2","values":[["a","b"],["c","d"]]}"#,
        ),
        "copy_paste" => Some(
            r#"{"spreadsheet_id":"<id>","source_range":"DataSheet!A1:B3","destination_range":"TargetSheet!A1"}"#,
        ),
        "cut_paste" => Some(
            r#"{"spreadsheet_id":"<id>","source_range":"DataSheet!L1:M3","destination_cell":"TargetSheet!G1"}"#,
        ),
        _ => None,
    }
}

fn infer_path_for_tool(tool: &str, problem: &str) -> Option<String> {
    let p = problem.to_ascii_lowercase();

    match tool {
        "add_data_validation" => {
            if p.contains("missing field `kind`") || p.contains("missing field kind") {
                return Some("rule.kind".to_string());
            }
            if p.contains("validationrule") && p.contains("kind") {
                return Some("rule.kind".to_string());
            }
            if p.contains("comparecondition") {
                return Some("rule.condition".to_string());
            }
            None
        }
        "add_conditional_formatting" => {
            if p.contains("missing field `kind`") || p.contains("missing field kind") {
                return Some("rule.kind".to_string());
            }
            if p.contains("conditionalformatrule") && p.contains("kind") {
                return Some("rule.kind".to_string());
            }
            if p.contains("conditionkind") {
                return Some("rule.condition".to_string());
            }
            None
        }
        "merge_cells" => {
            if p.contains("mergetype") || p.contains("merge_type") {
                return Some("merge_type".to_string());
            }
            None
        }
        "modify_sheet_values" => {
            if p.contains("valueinputoption") || p.contains("value_input_option") {
                return Some("value_input_option".to_string());
            }
            None
        }
        _ => None,
    }
}

fn tool_variants(tool: &str, problem: &str) -> Option<Vec<&'static str>> {
    let p = problem.to_ascii_lowercase();

    match tool {
        "add_data_validation" => {
            if p.contains("validationrule")
                || (p.contains("unknown variant") && p.contains("kind"))
                || p.contains("missing field `kind`")
                || p.contains("missing field kind")
            {
                return Some(vec![
                    "list",
                    "list_from_range",
                    "number",
                    "date",
                    "text_length",
                    "custom_formula",
                    "checkbox",
                ]);
            }
            if p.contains("comparecondition") {
                return Some(vec![
                    "greater_than",
                    "greater_than_or_equal",
                    "less_than",
                    "less_than_or_equal",
                    "equal",
                    "not_equal",
                    "between",
                ]);
            }
            None
        }
        "add_conditional_formatting" => {
            if p.contains("conditionalformatrule")
                || (p.contains("unknown variant") && p.contains("kind"))
                || p.contains("missing field `kind`")
                || p.contains("missing field kind")
            {
                return Some(vec![
                    "single_color",
                    "color_scale",
                    "data_bar",
                    "custom_formula",
                ]);
            }
            None
        }
        "merge_cells" => {
            if p.contains("merge") {
                return Some(vec!["merge_all", "merge_columns", "merge_rows"]);
            }
            None
        }
        "modify_sheet_values" => {
            if p.contains("value_input_option") || p.contains("valueinputoption") {
                return Some(vec!["raw", "user_entered"]);
            }
            None
        }
        "copy_paste" => {
            if p.contains("paste_orientation") || p.contains("pasteorientation") {
                return Some(vec!["normal", "transpose"]);
            }
            if p.contains("paste_type") || p.contains("pastetype") {
                return Some(vec![
                    "paste_normal",
                    "paste_values",
                    "paste_format",
                    "paste_formula",
                ]);
            }
            None
        }
        _ => None,
    }
}

fn looks_like_invalid_params(problem: &str) -> bool {
    let p = problem.to_ascii_lowercase();

    if p.contains("missing field")
        || p.contains("unknown field")
        || p.contains("unknown variant")
        || p.contains("did not match any variant")
        || p.contains("must be an object")
    {
        return true;
    }

    // check_arity and gradient completeness failures from rule construction
    if p.contains("requires") && p.contains("value(s)") {
        return true;
    }

    false
}

fn extract_expected_variants(problem: &str) -> Vec<String> {
    static EXPECTED_TAIL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"expected(?: one of)? (?P<tail>.*)$").expect("regex"));
    static BACKTICK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("regex"));

    let Some(caps) = EXPECTED_TAIL_RE.captures(problem) else {
        return Vec::new();
    };
    let tail = caps.name("tail").map(|m| m.as_str()).unwrap_or("");
    BACKTICK_RE
        .captures_iter(tail)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[derive(Debug, Error)]
#[error("tool '{tool_name}' is disabled by server configuration")]
struct ToolDisabledError {
    tool_name: String,
}

impl ToolDisabledError {
    fn new(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Error)]
#[error(
    "tool '{tool_name}' response too large ({size} bytes > {limit} bytes); reduce request size or page results"
)]
struct ResponseTooLargeError {
    tool_name: String,
    size: usize,
    limit: usize,
}

impl ResponseTooLargeError {
    fn new(tool_name: &str, size: usize, limit: usize) -> Self {
        Self {
            tool_name: tool_name.to_ascii_lowercase(),
            size,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn disabled_tool_maps_to_invalid_request() {
        let err = to_mcp_error_for_tool(
            "merge_cells",
            ToolDisabledError::new("merge_cells").into(),
        );
        assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
        assert!(err.message.contains("disabled"));
    }

    #[test]
    fn bad_rule_kind_gets_variants_and_example() {
        let bad = serde_json::json!({
            "spreadsheet_id": "sp",
            "range_name": "A1:A10",
            "rule": {"kind": "dropdown", "values": ["a"]}
        });
        let err = serde_json::from_value::<crate::tools::AddDataValidationParams>(bad).unwrap_err();
        let mcp = to_mcp_error_for_tool("add_data_validation", err.into());

        assert_eq!(mcp.code, ErrorCode::INVALID_PARAMS);
        let msg = mcp.message.to_ascii_lowercase();
        assert!(msg.contains("example:"));
        assert!(msg.contains("list_from_range"));
    }

    #[test]
    fn range_errors_map_to_invalid_params() {
        let err = crate::grid::parse_range("A0").unwrap_err();
        let mcp = to_mcp_error_for_tool("read_sheet_values", err.into());
        assert_eq!(mcp.code, ErrorCode::INVALID_PARAMS);
        assert!(mcp.message.contains("read_sheet_values"));
    }

    #[test]
    fn unknown_sheet_maps_to_invalid_params() {
        let err = SheetNotFoundError::new("Nope", vec!["Sheet1".to_string()]);
        let mcp = to_mcp_error_for_tool("merge_cells", anyhow::Error::new(err));
        assert_eq!(mcp.code, ErrorCode::INVALID_PARAMS);
        assert!(mcp.message.contains("Nope"));
    }

    #[test]
    fn expected_variants_are_extracted_from_serde_messages() {
        let variants = extract_expected_variants(
            "unknown variant `dropdown`, expected one of `list`, `number`",
        );
        assert_eq!(variants, vec!["list".to_string(), "number".to_string()]);
    }
}
