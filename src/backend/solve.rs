// src/backend/solve.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::pipe::PipeWriter;

/// Kind of export the backend should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExporterKind {
    /// A tar archive of the build result, written as a byte stream.
    Tar,
}

/// Where one export of the build result goes.
#[derive(Clone)]
pub struct ExportEntry {
    pub kind: ExporterKind,
    /// Write end of the export pipe. The backend writes; the submitter closes.
    pub output: PipeWriter,
}

impl ExportEntry {
    pub fn tar(output: PipeWriter) -> Self {
        Self {
            kind: ExporterKind::Tar,
            output,
        }
    }
}

impl fmt::Debug for ExportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportEntry")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Options for a single submission.
///
/// Built fresh for every `compute` call and moved into the backend, so it
/// cannot change once submitted.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Host directories the build may read, by label. Paths are absolute.
    pub local_dirs: BTreeMap<String, PathBuf>,
    pub frontend_attrs: BTreeMap<String, String>,
    pub exports: Vec<ExportEntry>,
}

/// What the backend reports after a successful build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolveResponse {
    pub exporter_response: BTreeMap<String, String>,
}
