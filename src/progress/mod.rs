// src/progress/mod.rs

//! Progress reporting.
//!
//! - [`tag`] parses the `@component@ message` convention in vertex names.
//! - [`display`] is the loop turning raw status batches into per-vertex
//!   callbacks.
//! - [`reporter`] implements those callbacks by emitting tagged records.
//! - [`sink`] defines the record type and where records go.

pub mod display;
pub mod reporter;
pub mod sink;
pub mod tag;

pub use display::{VertexHandler, VertexTracker, print_solve_status};
pub use reporter::{ProgressReporter, log_solve_status};
pub use sink::{LogRecord, ProgressSink, Severity, TracingSink};
pub use tag::{ComponentTag, parse_component_tag};
