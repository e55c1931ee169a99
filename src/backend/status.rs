// src/backend/status.rs

//! Progress events streamed by the backend while a build runs.
//!
//! A build reports its progress as a sequence of [`SolveStatus`] batches.
//! Each batch may update any number of vertices, per-vertex progress
//! counters, and log chunks. Vertices are identified by their [`Digest`]
//! and may appear in several batches as their state changes.

use std::fmt;
use std::time::SystemTime;

/// Content digest identifying one vertex of the execution graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(pub String);

impl Digest {
    pub fn new(value: impl Into<String>) -> Self {
        Digest(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One node of the execution graph as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    pub digest: Digest,
    /// Human readable name; may carry a `@component@ message` tag.
    pub name: String,
    pub inputs: Vec<Digest>,
    pub cached: bool,
    pub started: Option<SystemTime>,
    pub completed: Option<SystemTime>,
    pub error: Option<String>,
}

impl Vertex {
    pub fn new(digest: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            digest: Digest::new(digest),
            name: name.into(),
            inputs: Vec::new(),
            cached: false,
            started: None,
            completed: None,
            error: None,
        }
    }
}

/// Progress counter of a sub-operation of a vertex (e.g. a layer pull).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexStatus {
    pub id: String,
    pub vertex: Digest,
    pub name: String,
    pub current: u64,
    pub total: u64,
    pub completed: Option<SystemTime>,
}

/// A chunk of output written by a vertex.
///
/// `stream` follows file descriptor numbering: 1 is stdout, 2 is stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLog {
    pub vertex: Digest,
    pub stream: u32,
    pub data: Vec<u8>,
    pub timestamp: Option<SystemTime>,
}

/// One batch of progress updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveStatus {
    pub vertexes: Vec<Vertex>,
    pub statuses: Vec<VertexStatus>,
    pub logs: Vec<VertexLog>,
}

impl SolveStatus {
    pub fn is_empty(&self) -> bool {
        self.vertexes.is_empty() && self.statuses.is_empty() && self.logs.is_empty()
    }
}
