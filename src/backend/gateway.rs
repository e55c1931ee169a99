// src/backend/gateway.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::plan::Solver;

use super::BoxFuture;

/// Per-build session the backend hands to the build callback.
pub trait Gateway: Send + Sync {
    /// Turn a virtual directory into the backend's result shape.
    fn solve(&self, directory: Directory) -> BoxFuture<'_, anyhow::Result<BuildResult>>;
}

/// Shared handle to a per-build session.
pub type Session = Arc<dyn Gateway>;

/// The build callback. `FnOnce`, so the backend can call it at most once.
pub type BuildFn =
    Box<dyn FnOnce(Session) -> BoxFuture<'static, anyhow::Result<BuildResult>> + Send>;

/// A virtual directory: relative file paths mapped to their contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    files: BTreeMap<String, Vec<u8>>,
}

impl Directory {
    /// An empty directory.
    pub fn scratch() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Add or replace a file. Leading `/` is dropped so paths stay relative.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        let path = path.into();
        let path = path.trim_start_matches('/').to_string();
        self.files.insert(path, contents.into());
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Wrap this directory in a backend result using the build's session.
    pub async fn into_result(self, solver: &Solver) -> anyhow::Result<BuildResult> {
        solver.session().solve(self).await
    }
}

/// Result returned from the build callback to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResult {
    pub directory: Directory,
    pub metadata: BTreeMap<String, Vec<u8>>,
}

impl BuildResult {
    pub fn new(directory: Directory) -> Self {
        Self {
            directory,
            metadata: BTreeMap::new(),
        }
    }
}
