//! Infrastructure layer for menu-editor.
//!
//! - [`config_file`]: reads the TOML extension configuration.
//! - [`http_server`]: the axum router and the listener loop.

pub mod config_file;
pub mod http_server;

pub use config_file::{load_config, parse_config, ConfigError};
pub use http_server::{router, run_server, ApiError};
