mod loader;

pub use loader::{Config, ReportConfig, DEFAULT_CONFIG_NAMES};
