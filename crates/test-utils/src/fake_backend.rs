use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::sync::mpsc;
use plansolve::backend::{
    BoxFuture, BuildFn, BuildResult, Directory, Gateway, Session, SolveBackend, SolveOptions,
    SolveResponse, SolveStatus,
};
use plansolve::connection::{Connection, Connector, Endpoint};

use crate::builders::encode_directory;

/// What a [`FakeBackend`] does when asked to build.
#[derive(Debug, Clone)]
pub struct BuildScript {
    /// Status batches sent before the callback runs.
    pub events: Vec<SolveStatus>,
    /// Fail with this message before the callback runs.
    pub fail_before_callback: Option<String>,
    /// Fail with this message after the export was written.
    pub fail_after_export: Option<String>,
    /// Export these bytes instead of the tar of the build result.
    pub raw_export: Option<Vec<u8>>,
    /// After exporting, never return (until dropped).
    pub hang_after_export: bool,
    /// Export is written in chunks of this size.
    pub chunk_size: usize,
    pub exporter_response: BTreeMap<String, String>,
}

impl Default for BuildScript {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            fail_before_callback: None,
            fail_after_export: None,
            raw_export: None,
            hang_after_export: false,
            chunk_size: 700,
            exporter_response: BTreeMap::from([(
                "export.kind".to_string(),
                "tar".to_string(),
            )]),
        }
    }
}

/// A backend that:
/// - records how often it was called and which local dirs it was given
/// - replays scripted progress events
/// - runs the build callback against a [`FakeGateway`]
/// - writes the callback's result as a tar archive to every export.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    script: BuildScript,
    calls: Arc<AtomicUsize>,
    local_dirs: Arc<Mutex<Option<BTreeMap<String, PathBuf>>>>,
}

impl FakeBackend {
    pub fn new(script: BuildScript) -> Self {
        Self {
            script,
            calls: Arc::default(),
            local_dirs: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Local dirs from the most recent build.
    pub fn seen_local_dirs(&self) -> Option<BTreeMap<String, PathBuf>> {
        self.local_dirs.lock().unwrap().clone()
    }

    /// Wrap a clone of this backend in a connection.
    pub fn connection(&self) -> Connection {
        Connection::from_backend(
            Endpoint::Tcp {
                host: "fake".to_string(),
                port: 1234,
            },
            Arc::new(self.clone()),
        )
    }
}

impl SolveBackend for FakeBackend {
    fn build(
        &self,
        opts: SolveOptions,
        build_fn: BuildFn,
        events: mpsc::Sender<SolveStatus>,
    ) -> BoxFuture<'_, anyhow::Result<SolveResponse>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.local_dirs.lock().unwrap() = Some(opts.local_dirs.clone());
        let script = self.script.clone();

        Box::pin(async move {
            for status in script.events {
                if events.send(status).await.is_err() {
                    break;
                }
            }

            if let Some(msg) = script.fail_before_callback {
                return Err(anyhow!(msg).context("rpc error: code = Unknown desc = failed to solve"));
            }

            let session: Session = Arc::new(FakeGateway);
            let result = build_fn(session).await?;

            let archive = match script.raw_export {
                Some(raw) => raw,
                None => encode_directory(&result.directory)?,
            };

            for export in &opts.exports {
                for chunk in archive.chunks(script.chunk_size.max(1)) {
                    export.output.write_all(chunk).await?;
                }
            }

            if script.hang_after_export {
                std::future::pending::<()>().await;
            }

            if let Some(msg) = script.fail_after_export {
                return Err(anyhow!(msg));
            }

            drop(events);
            Ok(SolveResponse {
                exporter_response: script.exporter_response,
            })
        })
    }
}

/// Session whose results are the directories it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeGateway;

impl Gateway for FakeGateway {
    fn solve(&self, directory: Directory) -> BoxFuture<'_, anyhow::Result<BuildResult>> {
        Box::pin(async move { Ok(BuildResult::new(directory)) })
    }
}

/// Connector handing out a fixed backend, or failing.
#[derive(Debug, Clone, Default)]
pub struct FakeConnector {
    backend: FakeBackend,
    fail_with: Option<String>,
    endpoints: Arc<Mutex<Vec<Endpoint>>>,
}

impl FakeConnector {
    pub fn new(backend: FakeBackend) -> Self {
        Self {
            backend,
            fail_with: None,
            endpoints: Arc::default(),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::default()
        }
    }

    /// Endpoints connect was called with.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.endpoints.lock().unwrap().clone()
    }
}

impl Connector for FakeConnector {
    fn connect<'a>(
        &'a self,
        endpoint: &'a Endpoint,
    ) -> BoxFuture<'a, anyhow::Result<Arc<dyn SolveBackend>>> {
        Box::pin(async move {
            self.endpoints.lock().unwrap().push(endpoint.clone());
            match &self.fail_with {
                Some(msg) => Err(anyhow!("{msg}")),
                None => Ok(Arc::new(self.backend.clone()) as Arc<dyn SolveBackend>),
            }
        })
    }
}
