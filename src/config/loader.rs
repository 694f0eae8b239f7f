use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Files looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_NAMES: [&str; 6] = [
    ".zerocov.yml",
    ".zerocov.yaml",
    ".zerocov.toml",
    "zerocov.yml",
    "zerocov.yaml",
    "zerocov.toml",
];

/// Configuration for zerocov
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder or source-file names pruned in addition to the exclusion list
    pub exclude: Vec<String>,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Spaces per indentation level in the JSON output
    pub indent: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

impl Config {
    /// Load configuration from a file. `.toml` files are TOML, anything else is YAML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let is_toml = path.extension().map_or(false, |e| e == "toml");
        if is_toml {
            toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to parse TOML config: {}", path.display()))
        } else {
            serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to parse YAML config: {}", path.display()))
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(dir: &Path) -> Result<Self> {
        for name in &DEFAULT_CONFIG_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }
}
