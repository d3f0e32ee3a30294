use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

/// `[logging]` section. All fields have defaults so it may be omitted from
/// `editor.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global level filter (`"info"`, `"debug"`, ...).
    pub level: String,
    /// Per-module overrides, e.g. `{ "jl_core::history" = "debug" }`.
    pub modules: HashMap<String, String>,
    /// Optional log file, relative to the config file's directory.
    pub file: Option<PathBuf>,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            modules: HashMap::new(),
            file: None,
            format: LogFormat::Plain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Plain,
    Json,
}
