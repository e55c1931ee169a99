//! Shared fixtures for the `plansolve` integration tests: a scripted
//! backend and connector, plan and archive builders, and a recording
//! progress sink.

pub mod builders;
pub mod fake_backend;
pub mod recording_sink;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Upper bound for one submission in tests. A compute that hangs past this
/// means a task was never unblocked (pipe left open, channel never closed).
pub const COMPUTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-captured subscriber once per test binary.
///
/// Progress records land on the `plansolve::progress` target, so
/// `RUST_LOG=plansolve::progress=debug` shows what the sink would have seen.
/// Defaults to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if it outlives [`COMPUTE_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(COMPUTE_TIMEOUT, f).await {
        Ok(value) => value,
        Err(_) => panic!(
            "did not finish within {COMPUTE_TIMEOUT:?}; a group task was likely never unblocked"
        ),
    }
}
