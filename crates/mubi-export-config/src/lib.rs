pub mod config;
pub mod paths;

pub use config::{ApiConfig, Config, ExportConfig, RetryConfig, DEFAULT_BASE_URL};
pub use paths::PathManager;
