// src/progress/display.rs

//! Display loop turning raw status batches into per-vertex callbacks.
//!
//! The loop keeps one entry per vertex digest and numbers vertices in the
//! order they are first seen, starting at 1. Handlers get:
//! - `on_vertex` once per vertex, on first sight,
//! - `on_log` for completion lines (`DONE`, `CACHED`, `ERROR`) and for
//!   finished progress counters,
//! - `on_stream` for every output chunk written by a vertex.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::backend::{Digest, SolveStatus, Vertex, VertexLog, VertexStatus};
use crate::errors::Result;

/// Callbacks invoked by [`print_solve_status`].
pub trait VertexHandler {
    fn on_vertex(&mut self, vertex: &Vertex, index: usize) -> Result<()>;

    fn on_log(&mut self, vertex: &Vertex, message: fmt::Arguments<'_>) -> Result<()>;

    fn on_stream(
        &mut self,
        vertex: &Vertex,
        stream: u32,
        partial: bool,
        message: fmt::Arguments<'_>,
    ) -> Result<()>;
}

/// Drain `events` until the channel closes, dispatching to `handler`.
///
/// A handler error stops the loop and is returned.
pub async fn print_solve_status<H: VertexHandler>(
    mut events: mpsc::Receiver<SolveStatus>,
    handler: &mut H,
) -> Result<()> {
    let mut tracker = VertexTracker::default();

    while let Some(status) = events.recv().await {
        tracker.apply(status, handler)?;
    }

    trace!(vertices = tracker.len(), "progress channel closed");
    Ok(())
}

#[derive(Debug)]
struct TrackedVertex {
    index: usize,
    vertex: Vertex,
    done: bool,
}

/// Per-digest state of the display loop.
#[derive(Debug, Default)]
pub struct VertexTracker {
    by_digest: HashMap<Digest, TrackedVertex>,
    next_index: usize,
}

impl VertexTracker {
    pub fn len(&self) -> usize {
        self.by_digest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_digest.is_empty()
    }

    /// Index assigned to `digest`, if the vertex was seen.
    pub fn index_of(&self, digest: &Digest) -> Option<usize> {
        self.by_digest.get(digest).map(|t| t.index)
    }

    /// Apply one batch, in order: vertices, counters, then logs.
    pub fn apply<H: VertexHandler>(&mut self, status: SolveStatus, handler: &mut H) -> Result<()> {
        for vertex in status.vertexes {
            self.apply_vertex(vertex, handler)?;
        }
        for counter in status.statuses {
            self.apply_counter(&counter, handler)?;
        }
        for log in status.logs {
            self.apply_log(&log, handler)?;
        }
        Ok(())
    }

    fn apply_vertex<H: VertexHandler>(&mut self, vertex: Vertex, handler: &mut H) -> Result<()> {
        let tracked = match self.by_digest.entry(vertex.digest.clone()) {
            Entry::Occupied(entry) => {
                let tracked = entry.into_mut();
                tracked.vertex = vertex;
                tracked
            }
            Entry::Vacant(entry) => {
                self.next_index += 1;
                let index = self.next_index;
                handler.on_vertex(&vertex, index)?;
                entry.insert(TrackedVertex {
                    index,
                    vertex,
                    done: false,
                })
            }
        };

        if tracked.done || tracked.vertex.completed.is_none() {
            return Ok(());
        }
        tracked.done = true;

        let index = tracked.index;
        let vertex = &tracked.vertex;
        if let Some(err) = vertex.error.as_deref() {
            handler.on_log(vertex, format_args!("#{index} ERROR: {err}"))
        } else if vertex.cached {
            handler.on_log(vertex, format_args!("#{index} CACHED"))
        } else {
            let elapsed = match (vertex.started, vertex.completed) {
                (Some(started), Some(completed)) => {
                    completed.duration_since(started).unwrap_or_default()
                }
                _ => Default::default(),
            };
            handler.on_log(
                vertex,
                format_args!("#{index} DONE {:.1}s", elapsed.as_secs_f64()),
            )
        }
    }

    fn apply_counter<H: VertexHandler>(
        &mut self,
        counter: &VertexStatus,
        handler: &mut H,
    ) -> Result<()> {
        if counter.completed.is_none() {
            return Ok(());
        }
        let Some(tracked) = self.by_digest.get(&counter.vertex) else {
            warn!(vertex = %counter.vertex, id = %counter.id, "progress for unknown vertex; skipping");
            return Ok(());
        };

        handler.on_log(
            &tracked.vertex,
            format_args!(
                "#{} {} {}/{}",
                tracked.index, counter.id, counter.current, counter.total
            ),
        )
    }

    fn apply_log<H: VertexHandler>(&mut self, log: &VertexLog, handler: &mut H) -> Result<()> {
        let Some(tracked) = self.by_digest.get(&log.vertex) else {
            warn!(vertex = %log.vertex, stream = log.stream, "log for unknown vertex; skipping");
            return Ok(());
        };

        let partial = !log.data.ends_with(b"\n");
        let text = String::from_utf8_lossy(&log.data);
        let text = text.trim_end_matches('\n');

        handler.on_stream(
            &tracked.vertex,
            log.stream,
            partial,
            format_args!("#{} {}", tracked.index, text),
        )
    }
}
