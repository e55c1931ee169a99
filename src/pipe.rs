// src/pipe.rs

//! In-process byte pipe with independently closable ends.
//!
//! The build submitter hands the write end to the backend as the tar export
//! sink while the output collector reads the other end. Closing the write end
//! makes the reader see EOF once buffered bytes are consumed. Dropping the
//! read end makes every later write fail with `BrokenPipe`.
//!
//! The write end is a cheap clonable handle: the backend writes through its
//! clone, and the submitter keeps its own clone so it can close the pipe
//! whatever the backend does with the handle it was given.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWriteExt, DuplexStream, ReadBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Create a pipe buffering at most `capacity` bytes between the two ends.
pub fn pipe(capacity: usize) -> (PipeReader, PipeWriter) {
    let (write_half, read_half) = tokio::io::duplex(capacity.max(1));
    let reader = PipeReader { inner: read_half };
    let writer = PipeWriter {
        inner: Arc::new(Mutex::new(Some(write_half))),
    };
    (reader, writer)
}

/// Read end of a [`pipe`]. Dropping it closes the read side.
#[derive(Debug)]
pub struct PipeReader {
    inner: DuplexStream,
}

impl AsyncRead for PipeReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

/// Write end of a [`pipe`].
#[derive(Debug, Clone)]
pub struct PipeWriter {
    inner: Arc<Mutex<Option<DuplexStream>>>,
}

impl PipeWriter {
    /// Write the whole buffer, waiting for the reader to make room.
    pub async fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        let mut guard = self.inner.lock().await;
        match guard.as_mut() {
            Some(stream) => stream.write_all(buf).await,
            None => Err(closed_pipe()),
        }
    }

    /// Close the write end. Idempotent; every clone observes the closure.
    pub async fn close(&self) {
        let stream = self.inner.lock().await.take();
        if let Some(mut stream) = stream {
            if let Err(err) = stream.shutdown().await {
                debug!(error = %err, "export pipe shutdown reported an error");
            }
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.is_none()
    }

    /// Guard closing the write end when dropped.
    ///
    /// Covers exits that never reach an explicit [`PipeWriter::close`], such
    /// as a cancelled or panicking submitter.
    pub fn close_on_drop(&self) -> CloseOnDrop {
        CloseOnDrop {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// See [`PipeWriter::close_on_drop`].
#[derive(Debug)]
pub struct CloseOnDrop {
    inner: Arc<Mutex<Option<DuplexStream>>>,
}

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        match self.inner.try_lock() {
            Ok(mut guard) => {
                guard.take();
            }
            Err(_) => {
                // A writer still holds the lock; the stream closes when its
                // last handle goes away.
                debug!("export pipe busy on drop; deferring close to last writer");
            }
        }
    }
}

fn closed_pipe() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "write on closed pipe")
}
