// src/backend/mod.rs

//! Contract with the external graph-execution backend.
//!
//! `plansolve` never talks to the backend's wire protocol directly. It talks
//! to a [`SolveBackend`], which production wiring implements on top of a real
//! client and tests replace with a fake that scripts events and exports.
//!
//! - [`solve`] holds the per-submission request/response types.
//! - [`gateway`] holds the per-build session handed to the build callback,
//!   and the virtual directory / result shapes it understands.
//! - [`status`] holds the progress event types streamed during a build.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

pub mod gateway;
pub mod solve;
pub mod status;

pub use gateway::{BuildFn, BuildResult, Directory, Gateway, Session};
pub use solve::{ExportEntry, ExporterKind, SolveOptions, SolveResponse};
pub use status::{Digest, SolveStatus, Vertex, VertexLog, VertexStatus};

/// Boxed, sendable future used at every trait seam in this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A connected backend able to run builds.
///
/// Implementations must:
/// - call `build_fn` exactly once with a fresh per-build [`Session`];
/// - stream [`SolveStatus`] values into `events` while the build runs, and
///   drop the sender when the build completes;
/// - write the export of the callback's [`BuildResult`] to every
///   [`ExportEntry`] in `opts.exports`.
pub trait SolveBackend: Send + Sync {
    fn build(
        &self,
        opts: SolveOptions,
        build_fn: BuildFn,
        events: mpsc::Sender<SolveStatus>,
    ) -> BoxFuture<'_, anyhow::Result<SolveResponse>>;
}
