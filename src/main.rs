use anyhow::Result;
use clap::Parser;
use sheets_mcp::config::{CliArgs, ServerConfig};
use sheets_mcp::memory::InMemorySpreadsheetService;
use sheets_mcp::server::SheetsServer;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logging goes to stderr so stdout stays reserved for JSON-RPC.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = Arc::new(ServerConfig::from_args(args)?);

    let service = Arc::new(InMemorySpreadsheetService::new());
    let server = SheetsServer::new(config, service);
    server.run_stdio().await
}
