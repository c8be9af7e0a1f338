use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CACHE_CAPACITY: usize = 16;
const DEFAULT_TOOL_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RESPONSE_BYTES: u64 = 1_000_000;
const DEFAULT_READ_RANGE: &str = "A1:Z1000";
const DEFAULT_MAX_LIST_RESULTS: u32 = 25;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Acting user for service calls when a tool omits `user_email`.
    pub default_user_email: String,
    pub enabled_tools: Option<HashSet<String>>,
    pub cache_capacity: usize,
    pub tool_timeout_ms: Option<u64>,
    pub max_response_bytes: Option<u64>,
    pub default_read_range: String,
    pub max_list_results: u32,
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            user_email: cli_user_email,
            enabled_tools: cli_enabled_tools,
            cache_capacity: cli_cache_capacity,
            tool_timeout_ms: cli_tool_timeout_ms,
            max_response_bytes: cli_max_response_bytes,
            default_read_range: cli_default_read_range,
            max_list_results: cli_max_list_results,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            user_email: file_user_email,
            enabled_tools: file_enabled_tools,
            cache_capacity: file_cache_capacity,
            tool_timeout_ms: file_tool_timeout_ms,
            max_response_bytes: file_max_response_bytes,
            default_read_range: file_default_read_range,
            max_list_results: file_max_list_results,
        } = file_config;

        let default_user_email = cli_user_email
            .or(file_user_email)
            .context("a default user email is required (--user-email or config file)")?;

        let enabled_tools = cli_enabled_tools
            .or(file_enabled_tools)
            .map(|tools| {
                tools
                    .into_iter()
                    .map(|t| t.trim().to_ascii_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect::<HashSet<_>>()
            })
            .filter(|set| !set.is_empty());

        Ok(Self {
            default_user_email,
            enabled_tools,
            cache_capacity: cli_cache_capacity
                .or(file_cache_capacity)
                .unwrap_or(DEFAULT_CACHE_CAPACITY),
            tool_timeout_ms: normalize_limit(
                cli_tool_timeout_ms
                    .or(file_tool_timeout_ms)
                    .unwrap_or(DEFAULT_TOOL_TIMEOUT_MS),
            ),
            max_response_bytes: normalize_limit(
                cli_max_response_bytes
                    .or(file_max_response_bytes)
                    .unwrap_or(DEFAULT_MAX_RESPONSE_BYTES),
            ),
            default_read_range: cli_default_read_range
                .or(file_default_read_range)
                .unwrap_or_else(|| DEFAULT_READ_RANGE.to_string()),
            max_list_results: cli_max_list_results
                .or(file_max_list_results)
                .unwrap_or(DEFAULT_MAX_LIST_RESULTS),
        })
    }

    pub fn is_tool_enabled(&self, tool: &str) -> bool {
        match &self.enabled_tools {
            Some(tools) => tools.contains(&tool.to_ascii_lowercase()),
            None => true,
        }
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout_ms.map(Duration::from_millis)
    }

    pub fn max_response_bytes(&self) -> Option<usize> {
        self.max_response_bytes.map(|b| b as usize)
    }

    /// The acting user for one invocation: explicit param wins.
    pub fn resolve_user_email(&self, param: Option<&str>) -> String {
        param
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(&self.default_user_email)
            .to_string()
    }
}

// Zero disables the corresponding limit.
fn normalize_limit(value: u64) -> Option<u64> {
    if value == 0 { None } else { Some(value) }
}

#[derive(Debug, Parser)]
#[command(
    name = "sheets-mcp",
    about = "MCP server exposing spreadsheet tools over a remote sheets service"
)]
pub struct CliArgs {
    /// Optional YAML config file; CLI flags override file values.
    #[arg(long, env = "SHEETS_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "SHEETS_MCP_USER_EMAIL")]
    pub user_email: Option<String>,

    /// Restrict the served tool set (comma separated).
    #[arg(long, env = "SHEETS_MCP_ENABLED_TOOLS", value_delimiter = ',')]
    pub enabled_tools: Option<Vec<String>>,

    #[arg(long, env = "SHEETS_MCP_CACHE_CAPACITY")]
    pub cache_capacity: Option<usize>,

    /// Per-tool timeout in milliseconds; 0 disables.
    #[arg(long, env = "SHEETS_MCP_TOOL_TIMEOUT_MS")]
    pub tool_timeout_ms: Option<u64>,

    /// Response size cap in bytes; 0 disables.
    #[arg(long, env = "SHEETS_MCP_MAX_RESPONSE_BYTES")]
    pub max_response_bytes: Option<u64>,

    /// Range used by read_sheet_values when none is given.
    #[arg(long, env = "SHEETS_MCP_DEFAULT_READ_RANGE")]
    pub default_read_range: Option<String>,

    #[arg(long, env = "SHEETS_MCP_MAX_LIST_RESULTS")]
    pub max_list_results: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    user_email: Option<String>,
    enabled_tools: Option<Vec<String>>,
    cache_capacity: Option<usize>,
    tool_timeout_ms: Option<u64>,
    max_response_bytes: Option<u64>,
    default_read_range: Option<String>,
    max_list_results: Option<u32>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CliArgs {
        CliArgs {
            config: None,
            user_email: Some("analyst@example.com".to_string()),
            enabled_tools: None,
            cache_capacity: None,
            tool_timeout_ms: None,
            max_response_bytes: None,
            default_read_range: None,
            max_list_results: None,
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ServerConfig::from_args(args()).unwrap();
        assert_eq!(config.default_user_email, "analyst@example.com");
        assert_eq!(config.default_read_range, "A1:Z1000");
        assert_eq!(config.tool_timeout(), Some(Duration::from_millis(30_000)));
        assert!(config.is_tool_enabled("read_sheet_values"));
    }

    #[test]
    fn user_email_is_required_somewhere() {
        let mut a = args();
        a.user_email = None;
        assert!(ServerConfig::from_args(a).is_err());
    }

    #[test]
    fn zero_disables_limits() {
        let mut a = args();
        a.tool_timeout_ms = Some(0);
        a.max_response_bytes = Some(0);
        let config = ServerConfig::from_args(a).unwrap();
        assert_eq!(config.tool_timeout(), None);
        assert_eq!(config.max_response_bytes(), None);
    }

    #[test]
    fn enabled_tools_filter_is_case_insensitive() {
        let mut a = args();
        a.enabled_tools = Some(vec!["Read_Sheet_Values".to_string()]);
        let config = ServerConfig::from_args(a).unwrap();
        assert!(config.is_tool_enabled("read_sheet_values"));
        assert!(!config.is_tool_enabled("merge_cells"));
    }

    #[test]
    fn explicit_user_email_param_wins() {
        let config = ServerConfig::from_args(args()).unwrap();
        assert_eq!(
            config.resolve_user_email(Some("other@example.com")),
            "other@example.com"
        );
        assert_eq!(config.resolve_user_email(None), "analyst@example.com");
        assert_eq!(config.resolve_user_email(Some("  ")), "analyst@example.com");
    }
}
