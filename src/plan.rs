// src/plan.rs

//! The plan evaluator seam.
//!
//! A [`Plan`] is owned by an external evaluator. The orchestrator only asks
//! it for the host directories it needs and, from inside the backend's build
//! callback, to update itself, compute its outputs and export its overlay.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::backend::{BoxFuture, BuildResult, Directory, Session};

/// Build plan evaluated against the backend.
///
/// Methods take `&self`: a plan is shared with the build callback through an
/// `Arc`, so evaluators that mutate state do so behind their own lock.
pub trait Plan: Send + Sync + 'static {
    /// Host directories referenced by the plan, by label. Paths may be
    /// relative; the submitter resolves them before the build starts.
    fn local_dirs(&self) -> BTreeMap<String, PathBuf>;

    /// Refresh the plan against a fresh per-build session.
    fn update<'a>(&'a self, solver: &'a Solver) -> BoxFuture<'a, anyhow::Result<()>>;

    /// Compute the plan's derived outputs.
    fn compute_outputs<'a>(&'a self, solver: &'a Solver) -> BoxFuture<'a, anyhow::Result<()>>;

    /// Export the computed overlay into `scratch`, returning the filled
    /// directory.
    fn export_overlay(&self, scratch: Directory) -> anyhow::Result<Directory>;
}

/// Plan-facing wrapper around the backend's per-build [`Session`].
#[derive(Clone)]
pub struct Solver {
    session: Session,
}

impl Solver {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Empty virtual directory to export into.
    pub fn scratch(&self) -> Directory {
        Directory::scratch()
    }

    pub async fn solve(&self, directory: Directory) -> anyhow::Result<BuildResult> {
        self.session.solve(directory).await
    }
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver").finish_non_exhaustive()
    }
}
