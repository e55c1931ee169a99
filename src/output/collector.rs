// src/output/collector.rs

//! Reads the tar export stream and folds recognized files into one value.

use std::io::{self, Read};
use std::sync::Arc;

use tokio_util::io::SyncIoBridge;
use tracing::{Span, debug};

use crate::engine::TaskScope;
use crate::errors::{PlansolveError, Result};
use crate::pipe::PipeReader;

use super::decode::SourceDecoder;
use super::value::Value;

/// Upper bound on the buffer reserved up front for one entry. The header
/// size comes from the backend and is not trusted for allocation.
const MAX_ENTRY_PREALLOC: u64 = 64 * 1024;

/// Collect a tar stream into a [`Value`].
///
/// Entries are handled in stream order. Entries whose path does not match
/// the decoder's extension are skipped. After the end-of-archive marker the
/// rest of the stream is drained so the writer never sees a closed pipe on
/// trailing padding.
///
/// An entry cut short by the end of the stream is a `StreamReadError`, not a
/// decode failure of the partial bytes.
pub fn collect_output<R: Read>(reader: R, decoder: &dyn SourceDecoder) -> Result<Value> {
    let mut out = Value::empty_struct();
    let mut archive = tar::Archive::new(reader);

    let entries = archive
        .entries()
        .map_err(|e| PlansolveError::stream_read("archive", e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| PlansolveError::stream_read("next entry", e))?;
        let path = entry
            .path()
            .map_err(|e| PlansolveError::stream_read("entry path", e))?
            .to_string_lossy()
            .into_owned();

        if !decoder.matches(&path) {
            debug!(file = %path, "skipping unrecognized file from export stream");
            continue;
        }
        debug!(file = %path, "decoding and merging export entry");

        let size = entry.size();
        let mut contents = Vec::with_capacity(size.min(MAX_ENTRY_PREALLOC) as usize);
        entry
            .read_to_end(&mut contents)
            .map_err(|e| PlansolveError::stream_read(path.as_str(), e))?;
        if contents.len() as u64 != size {
            debug!(file = %path, expected = size, read = contents.len(), "export entry truncated");
            return Err(PlansolveError::stream_read(
                path.as_str(),
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("entry truncated after {} of {size} bytes", contents.len()),
                ),
            ));
        }

        let unit = decoder.decode(&path, &contents)?;
        out.fill(unit).map_err(|conflict| PlansolveError::MergeError {
            path: path.clone(),
            message: conflict.to_string(),
        })?;
    }

    let mut rest = archive.into_inner();
    let trailing = io::copy(&mut rest, &mut io::sink())
        .map_err(|e| PlansolveError::stream_read("trailing data", e))?;
    if trailing > 0 {
        debug!(bytes = trailing, "drained trailing bytes after end of archive");
    }

    Ok(out)
}

/// Collect the read end of the export pipe on a blocking thread.
///
/// The reader is dropped, closing the pipe, as soon as collection returns.
/// A collection error is claimed through `scope` before that, so a writer
/// failing on the closed pipe afterwards is fallout.
pub async fn collect_from_pipe(
    reader: PipeReader,
    decoder: Arc<dyn SourceDecoder>,
    scope: TaskScope,
    span: Span,
) -> Result<Value> {
    let mut bridge = SyncIoBridge::new(reader);
    let task = scope.name();

    tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let result = collect_output(&mut bridge, decoder.as_ref()).map_err(|e| scope.fail(e));
        drop(bridge);
        result
    })
    .await
    .map_err(|e| PlansolveError::TaskAborted {
        task,
        message: e.to_string(),
    })?
}
