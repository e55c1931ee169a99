// src/lib.rs

pub mod backend;
pub mod config;
pub mod connection;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod output;
pub mod pipe;
pub mod plan;
pub mod progress;
pub mod types;

use std::sync::Arc;

use tracing::{Instrument, info_span};

use crate::config::ConfigFile;
use crate::connection::{Connection, Connector};
use crate::engine::{Client, ComputeOptions};
use crate::errors::Result;
use crate::output::Value;
use crate::plan::Plan;

/// High-level entry point: connect and compute one plan.
///
/// This wires together:
/// - host resolution from `[client].host`, `BUILDKIT_HOST`, or the default
/// - the connector supplied by the caller
/// - compute options from the config
/// - the compute orchestrator, logging progress through `tracing`
pub async fn compute_plan<P: Plan>(
    connector: &dyn Connector,
    cfg: &ConfigFile,
    plan: Arc<P>,
) -> Result<Value> {
    let connection = Connection::open(connector, cfg.client.host.as_deref()).await?;
    let span = info_span!("compute", endpoint = %connection.endpoint());

    let client = Client::with_options(connection, ComputeOptions::from_config(cfg));
    client.compute(plan).instrument(span).await
}
