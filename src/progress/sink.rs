// src/progress/sink.rs

//! Where progress records go.

use tracing::{Span, debug, error, info};

use crate::backend::Digest;
use crate::errors::Result;

/// Severity of a progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Error,
}

/// One structured progress record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub component: String,
    pub severity: Severity,
    pub message: String,
    /// Vertex index, for status updates.
    pub index: Option<usize>,
    /// Vertex digest, for status updates.
    pub digest: Option<Digest>,
}

impl LogRecord {
    pub fn new(component: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            severity,
            message: message.into(),
            index: None,
            digest: None,
        }
    }

    /// Debug record announcing a vertex.
    pub fn status(
        component: impl Into<String>,
        index: usize,
        message: impl Into<String>,
        digest: Digest,
    ) -> Self {
        Self {
            index: Some(index),
            digest: Some(digest),
            ..Self::new(component, Severity::Debug, message)
        }
    }
}

/// Destination for progress records.
///
/// An error from `record` stops the progress forwarder and fails the
/// submission.
pub trait ProgressSink: Send + Sync {
    fn record(&self, record: LogRecord) -> Result<()>;
}

/// Sink emitting records as `tracing` events inside a fixed span.
///
/// The span is captured once, so records keep their context no matter which
/// task the forwarder runs on.
#[derive(Debug, Clone)]
pub struct TracingSink {
    span: Span,
}

impl TracingSink {
    pub fn new(span: Span) -> Self {
        Self { span }
    }
}

impl ProgressSink for TracingSink {
    fn record(&self, record: LogRecord) -> Result<()> {
        let _entered = self.span.enter();
        let component = record.component.as_str();
        let message = record.message.as_str();

        match (record.severity, record.index, record.digest.as_ref()) {
            (Severity::Debug, Some(index), Some(digest)) => {
                debug!(target: "plansolve::progress", component, index, %digest, "#{index} {message}");
            }
            (Severity::Debug, _, _) => {
                debug!(target: "plansolve::progress", component, "{message}");
            }
            (Severity::Info, _, _) => {
                info!(target: "plansolve::progress", component, "{message}");
            }
            (Severity::Error, _, _) => {
                error!(target: "plansolve::progress", component, "{message}");
            }
        }

        Ok(())
    }
}
