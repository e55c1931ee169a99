// src/engine/mod.rs

//! Compute orchestration.
//!
//! [`Client::compute`] runs one submission as three tasks in a
//! [`TaskGroup`]:
//! - the progress forwarder, draining backend events into a sink,
//! - the build submitter, calling the backend with the plan callback and a
//!   tar export streaming into a pipe,
//! - the output collector, reading the pipe into a structured value.
//!
//! [`group`] holds the cancel-on-first-error primitive and [`clean`] the
//! normalization applied to backend failures.

pub mod clean;
pub mod compute;
pub mod group;

pub use clean::clean_solve_error;
pub use compute::{Client, ComputeOptions, ensure_directory, resolve_local_dirs};
pub use group::{TaskGroup, TaskScope};
