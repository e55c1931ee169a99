// src/engine/compute.rs

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, Span, debug, info};

use crate::backend::{
    BoxFuture, BuildFn, BuildResult, ExportEntry, Session, SolveBackend, SolveOptions, SolveStatus,
};
use crate::config::ConfigFile;
use crate::config::model::{default_event_buffer, default_pipe_capacity};
use crate::connection::Connection;
use crate::errors::{PlansolveError, Result};
use crate::output::{JsonDecoder, SourceDecoder, Value, collect_from_pipe};
use crate::pipe::{PipeWriter, pipe};
use crate::plan::{Plan, Solver};
use crate::progress::{ProgressSink, TracingSink, log_solve_status};

use super::clean::clean_solve_error;
use super::group::{TaskGroup, TaskScope};

/// Tuning for a [`Client`].
#[derive(Clone)]
pub struct ComputeOptions {
    /// Capacity of the progress event channel.
    pub event_buffer: usize,
    /// Buffer size of the export pipe, in bytes.
    pub pipe_capacity: usize,
    /// Decoder for the files recognized in the export.
    pub decoder: Arc<dyn SourceDecoder>,
}

impl ComputeOptions {
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self {
            event_buffer: cfg.client.event_buffer,
            pipe_capacity: cfg.client.pipe_capacity,
            decoder: cfg.output.format.decoder(),
        }
    }
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            event_buffer: default_event_buffer(),
            pipe_capacity: default_pipe_capacity(),
            decoder: Arc::new(JsonDecoder),
        }
    }
}

impl std::fmt::Debug for ComputeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeOptions")
            .field("event_buffer", &self.event_buffer)
            .field("pipe_capacity", &self.pipe_capacity)
            .field("extension", &self.decoder.extension())
            .finish()
    }
}

/// Submits plans to a connected backend and collects their output.
#[derive(Debug, Clone)]
pub struct Client {
    connection: Connection,
    options: ComputeOptions,
}

impl Client {
    pub fn new(connection: Connection) -> Self {
        Self::with_options(connection, ComputeOptions::default())
    }

    pub fn with_options(connection: Connection, options: ComputeOptions) -> Self {
        Self {
            connection,
            options,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn options(&self) -> &ComputeOptions {
        &self.options
    }

    /// Build `plan` and return the merged export, logging progress through
    /// `tracing` in the current span.
    pub async fn compute<P: Plan>(&self, plan: Arc<P>) -> Result<Value> {
        let sink: Arc<dyn ProgressSink> = Arc::new(TracingSink::new(Span::current()));
        self.compute_with_sink(plan, sink).await
    }

    /// Build `plan` and return the merged export, sending progress records
    /// to `sink`.
    ///
    /// Three tasks run in one group:
    /// - progress: drains backend events into `sink`,
    /// - build: submits the plan and streams the tar export into a pipe,
    /// - output: reads the pipe and merges recognized files.
    ///
    /// The first failure wins and no partial value is returned. The build
    /// and output tasks claim their failure before closing their end of the
    /// pipe, so an error they cause on the other side never replaces it.
    pub async fn compute_with_sink<P: Plan>(
        &self,
        plan: Arc<P>,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<Value> {
        let span = Span::current();
        let mut group = TaskGroup::new();

        let (events_tx, events_rx) = mpsc::channel::<SolveStatus>(self.options.event_buffer);
        let (reader, writer) = pipe(self.options.pipe_capacity);
        let (out_tx, out_rx) = oneshot::channel::<Value>();

        // Not handed the group token: queued events are still recorded after
        // another task fails. It stops when the backend drops its sender.
        group.spawn(
            "progress",
            log_solve_status(events_rx, sink).instrument(span.clone()),
        );

        let backend = self.connection.backend();
        let build_span = span.clone();
        group.spawn_scoped("build", move |scope| {
            build_plan(backend, plan, events_tx, writer, scope, build_span)
        });

        let decoder = Arc::clone(&self.options.decoder);
        group.spawn_scoped("output", move |scope| async move {
            let value = collect_from_pipe(reader, decoder, scope, span).await?;
            // The receiver only goes away if `compute` itself was dropped.
            let _ = out_tx.send(value);
            Ok(())
        });

        group.wait().await?;

        out_rx
            .await
            .map_err(|_| PlansolveError::Other(anyhow!("output collector finished without a value")))
    }
}

/// Build task: always closes the export pipe on the way out, after any
/// failure has been claimed for the group.
async fn build_plan<P: Plan>(
    backend: Arc<dyn SolveBackend>,
    plan: Arc<P>,
    events: mpsc::Sender<SolveStatus>,
    writer: PipeWriter,
    scope: TaskScope,
    span: Span,
) -> Result<()> {
    let _close = writer.close_on_drop();

    let result = tokio::select! {
        res = submit(backend, plan, events, writer.clone(), span.clone()).instrument(span.clone()) => res,
        _ = scope.cancelled() => {
            debug!(parent: &span, "build cancelled by group");
            Err(PlansolveError::Cancelled)
        }
    };
    let result = result.map_err(|err| scope.fail(err));

    writer.close().await;
    result
}

async fn submit<P: Plan>(
    backend: Arc<dyn SolveBackend>,
    plan: Arc<P>,
    events: mpsc::Sender<SolveStatus>,
    writer: PipeWriter,
    span: Span,
) -> Result<()> {
    let local_dirs = resolve_local_dirs(plan.local_dirs()).await?;

    let opts = SolveOptions {
        local_dirs,
        frontend_attrs: BTreeMap::new(),
        exports: vec![ExportEntry::tar(writer)],
    };

    debug!(
        localdirs = ?opts.local_dirs,
        attrs = ?opts.frontend_attrs,
        "spawning build job"
    );

    let response = backend
        .build(opts, plan_build_fn(plan, span), events)
        .await
        .map_err(|e| PlansolveError::SolveError(clean_solve_error(&e)))?;

    for (key, value) in &response.exporter_response {
        debug!(%key, %value, "exporter response");
    }

    info!("build finished");
    Ok(())
}

/// Callback run by the backend inside the build.
fn plan_build_fn<P: Plan>(plan: Arc<P>, span: Span) -> BuildFn {
    Box::new(move |session: Session| -> BoxFuture<'static, anyhow::Result<BuildResult>> {
        Box::pin(
            async move {
                let solver = Solver::new(session);

                plan.update(&solver).await?;
                debug!("computing plan outputs");
                plan.compute_outputs(&solver).await?;
                debug!("exporting plan overlay");
                let overlay = plan.export_overlay(solver.scratch())?;
                overlay.into_result(&solver).await
            }
            .instrument(span),
        )
    })
}

/// Resolve every local directory to a canonical absolute directory path.
pub async fn resolve_local_dirs(
    dirs: BTreeMap<String, PathBuf>,
) -> Result<BTreeMap<String, PathBuf>> {
    let mut resolved = BTreeMap::new();

    for (label, dir) in dirs {
        let abs = match tokio::fs::canonicalize(&dir).await {
            Ok(abs) => abs,
            Err(source) => {
                return Err(PlansolveError::PathResolutionError {
                    label,
                    path: dir,
                    source,
                });
            }
        };

        let metadata = tokio::fs::metadata(&abs).await;
        ensure_directory(&label, &dir, metadata)?;

        debug!(%label, path = %abs.display(), "resolved local directory");
        resolved.insert(label, abs);
    }

    Ok(resolved)
}

/// Check the metadata of a resolved local directory.
///
/// A metadata failure is kept as the error's source; anything but a
/// directory fails with `NotADirectory`.
pub fn ensure_directory(
    label: &str,
    path: &Path,
    metadata: io::Result<std::fs::Metadata>,
) -> Result<()> {
    let source = match metadata {
        Ok(m) if m.is_dir() => return Ok(()),
        Ok(_) => io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        Err(err) => err,
    };
    Err(PlansolveError::PathResolutionError {
        label: label.to_string(),
        path: path.to_path_buf(),
        source,
    })
}
