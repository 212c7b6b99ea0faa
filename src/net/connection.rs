//! Per-connection line reader.
//!
//! # Responsibilities
//! - Register the connection with the registry on start
//! - Read `\n`-terminated lines and offer each to the session's slot
//! - On EOF, read error, oversize line or stop request: deregister,
//!   close the socket, exit
//!
//! The reader is the only place a client socket is closed.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::net::TcpStream;

use crate::observability::metrics;
use crate::registry::{Delivery, Registry, Session};

/// Why a reader stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    /// Peer closed the connection.
    Eof,
    /// Socket read failed.
    Io(io::ErrorKind),
    /// A line exceeded the configured maximum length.
    LineTooLong,
    /// The registry asked the session to stop.
    Shutdown,
}

enum LineRead {
    Line,
    Eof,
    TooLong,
}

/// Register `stream` and run its reader until the connection ends.
pub async fn serve_connection(
    registry: Arc<Registry>,
    stream: TcpStream,
    remote_addr: SocketAddr,
    max_line_bytes: usize,
) -> ReaderExit {
    let (read_half, write_half) = stream.into_split();
    let session = registry.register(Box::new(write_half), remote_addr);
    run_reader(&registry, session, read_half, max_line_bytes).await
}

/// Drive an already-registered session from `reader`.
pub async fn run_reader<R>(
    registry: &Registry,
    session: Arc<Session>,
    reader: R,
    max_line_bytes: usize,
) -> ReaderExit
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    let exit = loop {
        buf.clear();

        let read = tokio::select! {
            _ = session.stop_requested() => break ReaderExit::Shutdown,
            read = read_line(&mut reader, &mut buf, max_line_bytes) => read,
        };

        match read {
            Ok(LineRead::Line) => {
                let line = decode_line(&buf);
                if session.deliver(line) == Delivery::Dropped {
                    metrics::line_dropped();
                    tracing::debug!(
                        client_id = %session.id(),
                        "Response slot full, dropping line"
                    );
                }
            }
            Ok(LineRead::Eof) => break ReaderExit::Eof,
            Ok(LineRead::TooLong) => break ReaderExit::LineTooLong,
            Err(e) => {
                tracing::debug!(client_id = %session.id(), error = %e, "Read failed");
                break ReaderExit::Io(e.kind());
            }
        }
    };

    registry.deregister(&session.id());
    session.close().await;

    tracing::info!(client_id = %session.id(), reason = ?exit, "Client disconnected");
    exit
}

async fn read_line<R>(
    reader: &mut BufReader<R>,
    buf: &mut Vec<u8>,
    max_line_bytes: usize,
) -> io::Result<LineRead>
where
    R: AsyncRead + Unpin,
{
    let limit = u64::try_from(max_line_bytes).unwrap_or(u64::MAX);
    let n = (&mut *reader).take(limit).read_until(b'\n', buf).await?;

    if n == 0 {
        return Ok(LineRead::Eof);
    }
    if buf.last() == Some(&b'\n') {
        return Ok(LineRead::Line);
    }
    if buf.len() >= max_line_bytes {
        return Ok(LineRead::TooLong);
    }
    // Unterminated trailing bytes before EOF are not a line.
    Ok(LineRead::Eof)
}

/// Strip the `\n` (or `\r\n`) terminator and decode lossily.
fn decode_line(buf: &[u8]) -> String {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
