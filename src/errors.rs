// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Collaborator seams (backend, connector, plan evaluator) hand back
//! `anyhow::Error`; everything that leaves `plansolve` is a
//! [`PlansolveError`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlansolveError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("cannot resolve local directory '{label}' ({}): {source}", path.display())]
    PathResolutionError {
        label: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("solve failed: {0}")]
    SolveError(String),

    #[error("read export stream ({what}): {source}")]
    StreamReadError {
        what: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: decode error: {message}")]
    DecodeError { path: String, message: String },

    #[error("{path}: {message}")]
    MergeError { path: String, message: String },

    #[error("Progress display error: {0}")]
    ProgressError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("task '{task}' aborted: {message}")]
    TaskAborted { task: &'static str, message: String },

    #[error("cancelled after another task failed")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlansolveError {
    pub(crate) fn stream_read(what: impl Into<String>, source: std::io::Error) -> Self {
        PlansolveError::StreamReadError {
            what: what.into(),
            source,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PlansolveError>;
