// src/output/mod.rs

//! Output collection.
//!
//! - [`collector`] walks the tar export stream.
//! - [`decode`] turns recognized files into values.
//! - [`value`] is the mergeable value the collector accumulates into.

pub mod collector;
pub mod decode;
pub mod value;

pub use collector::{collect_from_pipe, collect_output};
pub use decode::{JsonDecoder, SourceDecoder, TomlDecoder};
pub use value::{MergeConflict, Value};
