// src/connection/mod.rs

//! Connection manager.
//!
//! Resolves which backend to talk to and asks a [`Connector`] for a handle.
//! The connector is the pluggable part: production wiring provides one that
//! dials the real backend, tests provide one that hands back a fake.
//!
//! Host resolution order:
//! 1. explicit host passed by the caller (usually `[client].host`)
//! 2. `BUILDKIT_HOST` environment variable
//! 3. [`DEFAULT_HOST`], a backend in a local container
//!
//! Empty strings count as "not set". There is no retry here.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::{BoxFuture, SolveBackend};
use crate::errors::{PlansolveError, Result};

pub mod endpoint;

pub use endpoint::Endpoint;

/// Backend used when neither an explicit host nor the env var is set.
pub const DEFAULT_HOST: &str = "docker-container://buildkitd";

/// Environment variable overriding the default host.
pub const HOST_ENV: &str = "BUILDKIT_HOST";

/// Resolve the host string using the process environment.
pub fn resolve_host(explicit: Option<&str>) -> String {
    let env = std::env::var(HOST_ENV).ok();
    resolve_host_with(explicit, env.as_deref())
}

/// Resolve the host string from an explicit value and a raw env value.
pub fn resolve_host_with(explicit: Option<&str>, env: Option<&str>) -> String {
    [explicit, env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_HOST)
        .to_string()
}

/// Trait abstracting how a backend handle is obtained for an endpoint.
pub trait Connector: Send + Sync {
    fn connect<'a>(
        &'a self,
        endpoint: &'a Endpoint,
    ) -> BoxFuture<'a, anyhow::Result<Arc<dyn SolveBackend>>>;
}

/// Handle to a connected backend.
///
/// Cheap to clone and reusable across submissions.
#[derive(Clone)]
pub struct Connection {
    endpoint: Endpoint,
    backend: Arc<dyn SolveBackend>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Resolve `host`, parse it and connect through `connector`.
    pub async fn open(connector: &dyn Connector, host: Option<&str>) -> Result<Self> {
        let host = resolve_host(host);
        let endpoint = Endpoint::parse(&host)?;
        debug!(%endpoint, "connecting to backend");

        let backend = connector.connect(&endpoint).await.map_err(|e| {
            PlansolveError::ConnectionError(format!("backend client ({endpoint}): {e:#}"))
        })?;

        info!(%endpoint, "connected to backend");
        Ok(Self { endpoint, backend })
    }

    /// Wrap an already connected backend.
    pub fn from_backend(endpoint: Endpoint, backend: Arc<dyn SolveBackend>) -> Self {
        Self { endpoint, backend }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn backend(&self) -> Arc<dyn SolveBackend> {
        Arc::clone(&self.backend)
    }
}
