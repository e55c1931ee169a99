// src/progress/reporter.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::backend::{SolveStatus, Vertex};
use crate::errors::Result;

use super::display::{VertexHandler, print_solve_status};
use super::sink::{LogRecord, ProgressSink, Severity};
use super::tag::parse_component_tag;

/// Turns display callbacks into component-tagged [`LogRecord`]s.
///
/// - vertex announcement: one debug record carrying index and digest
/// - log line: one debug record
/// - stream write: stream 1 at info, stream 2 at error; other streams are
///   dropped without a record.
pub struct ProgressReporter<'a> {
    sink: &'a dyn ProgressSink,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self { sink }
    }
}

impl VertexHandler for ProgressReporter<'_> {
    fn on_vertex(&mut self, vertex: &Vertex, index: usize) -> Result<()> {
        let tag = parse_component_tag(&vertex.name);
        self.sink.record(LogRecord::status(
            tag.component,
            index,
            tag.message,
            vertex.digest.clone(),
        ))
    }

    fn on_log(&mut self, vertex: &Vertex, message: fmt::Arguments<'_>) -> Result<()> {
        let tag = parse_component_tag(&vertex.name);
        self.sink
            .record(LogRecord::new(tag.component, Severity::Debug, message.to_string()))
    }

    fn on_stream(
        &mut self,
        vertex: &Vertex,
        stream: u32,
        _partial: bool,
        message: fmt::Arguments<'_>,
    ) -> Result<()> {
        let severity = match stream {
            1 => Severity::Info,
            2 => Severity::Error,
            _ => return Ok(()),
        };
        let tag = parse_component_tag(&vertex.name);
        self.sink
            .record(LogRecord::new(tag.component, severity, message.to_string()))
    }
}

/// Forward every progress event to `sink` until the channel closes.
pub async fn log_solve_status(
    events: mpsc::Receiver<SolveStatus>,
    sink: Arc<dyn ProgressSink>,
) -> Result<()> {
    let mut reporter = ProgressReporter::new(sink.as_ref());
    print_solve_status(events, &mut reporter).await
}
