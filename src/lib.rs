pub mod config;
pub mod errors;
pub mod grid;
pub mod memory;
pub mod model;
pub mod requests;
pub mod rules;
pub mod server;
pub mod service;
pub mod state;
pub mod tools;

pub use config::{CliArgs, ServerConfig};
pub use server::SheetsServer;
pub use service::SpreadsheetService;
pub use state::AppState;
