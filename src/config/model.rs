// src/config/model.rs

use serde::Deserialize;

use crate::types::{LogLevel, SourceFormat};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [client]
/// host = "tcp://127.0.0.1:1234"
/// event_buffer = 32
/// pipe_capacity = 65536
///
/// [output]
/// format = "json"
///
/// [logging]
/// level = "debug"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Connection and transport tuning from `[client]`.
    #[serde(default)]
    pub client: ClientSection,

    /// Export decoding from `[output]`.
    #[serde(default)]
    pub output: OutputSection,

    /// Logging from `[logging]`.
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub client: ClientSection,
    pub output: OutputSection,
    pub logging: LoggingSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        client: ClientSection,
        output: OutputSection,
        logging: LoggingSection,
    ) -> Self {
        Self {
            client,
            output,
            logging,
        }
    }
}

/// `[client]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSection {
    /// Backend address, e.g. `"unix:///run/buildkit/buildkitd.sock"`.
    ///
    /// If `None`, the host falls back to `BUILDKIT_HOST` and then to the
    /// built-in default.
    #[serde(default)]
    pub host: Option<String>,

    /// Capacity of the progress event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Buffer size in bytes of the export pipe.
    #[serde(default = "default_pipe_capacity")]
    pub pipe_capacity: usize,
}

pub(crate) fn default_event_buffer() -> usize {
    32
}

pub(crate) fn default_pipe_capacity() -> usize {
    64 * 1024
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            host: None,
            event_buffer: default_event_buffer(),
            pipe_capacity: default_pipe_capacity(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputSection {
    /// `"json"` (default) or `"toml"`.
    #[serde(default)]
    pub format: SourceFormat,
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingSection {
    /// If `None`, `PLANSOLVE_LOG` or `info` is used.
    #[serde(default)]
    pub level: Option<LogLevel>,
}
