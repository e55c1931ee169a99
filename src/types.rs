use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::output::{JsonDecoder, SourceDecoder, TomlDecoder};

/// Log level as written in `[logging] level = "..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!(
                "invalid log level: {other} (expected error, warn, info, debug or trace)"
            )),
        }
    }
}

/// Format of the structured source files recognized in the export stream.
///
/// - `Json`: entries ending in `.json`, decoded with `serde_json` (default).
/// - `Toml`: entries ending in `.toml`, decoded with `toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Json,
    Toml,
}

impl Default for SourceFormat {
    fn default() -> Self {
        SourceFormat::Json
    }
}

impl SourceFormat {
    /// Decoder used by the output collector for this format.
    pub fn decoder(self) -> Arc<dyn SourceDecoder> {
        match self {
            SourceFormat::Json => Arc::new(JsonDecoder),
            SourceFormat::Toml => Arc::new(TomlDecoder),
        }
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(SourceFormat::Json),
            "toml" => Ok(SourceFormat::Toml),
            other => Err(format!(
                "invalid source format: {other} (expected \"json\" or \"toml\")"
            )),
        }
    }
}
