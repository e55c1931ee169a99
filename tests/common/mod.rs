#![allow(dead_code)]

pub use plansolve_test_utils::builders;
pub use plansolve_test_utils::fake_backend;
pub use plansolve_test_utils::recording_sink;
pub use plansolve_test_utils::{init_tracing, with_timeout};

use std::sync::Arc;

use plansolve::output::{SourceDecoder, Value, collect_output};
use plansolve::errors::Result;

/// Collect an in-memory tar archive with the given decoder.
pub fn collect_bytes(archive: &[u8], decoder: &dyn SourceDecoder) -> Result<Value> {
    collect_output(archive, decoder)
}

/// Shorthand for an `Arc`'d value used as a plan.
pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
