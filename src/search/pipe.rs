//! Bounded byte pipe between the revision listing and the scanner.
//!
//! Writes park once `capacity` bytes are in flight and resume as the scanner
//! drains them. Dropping the reader makes every later write fail with
//! `BrokenPipe`; dropping the writer makes the reader see end-of-stream.

use crate::error::SourceFailure;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream, ReadBuf};
use tracing::trace;

/// Chunk size used when relaying a child's stdout into the pipe.
const RELAY_CHUNK: usize = 8 * 1024;

/// Create a pipe holding at most `capacity` unread bytes.
pub fn stream_pipe(capacity: usize) -> (PipeWriter, PipeReader) {
    let (write_side, read_side) = tokio::io::duplex(capacity.max(1));
    (
        PipeWriter { inner: write_side },
        PipeReader { inner: read_side },
    )
}

/// Write end, owned by the producer side.
#[derive(Debug)]
pub struct PipeWriter {
    inner: DuplexStream,
}

impl PipeWriter {
    /// Close the write end so the reader observes end-of-stream.
    pub fn close(self) {
        trace!("closing revision stream write end");
        drop(self);
    }
}

impl AsyncWrite for PipeWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// Read end, owned by the scanner.
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

/// Map a failed write into the listing's failure kinds.
pub fn classify_write_error(err: io::Error) -> SourceFailure {
    if err.kind() == io::ErrorKind::BrokenPipe {
        SourceFailure::ReaderClosed
    } else {
        SourceFailure::Io(err)
    }
}

/// Copy `reader` into `sink` until end-of-stream, returning the byte count.
///
/// Read faults are `SourceFailure::Io`; a sink whose reader went away is
/// `SourceFailure::ReaderClosed`.
pub async fn relay<R, W>(reader: &mut R, sink: &mut W) -> Result<u64, SourceFailure>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; RELAY_CHUNK];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await.map_err(SourceFailure::Io)?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n])
            .await
            .map_err(classify_write_error)?;
        total += n as u64;
    }
    sink.flush().await.map_err(classify_write_error)?;
    Ok(total)
}
