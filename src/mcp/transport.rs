//! stdio transport for the MCP server.
//!
//! - Messages are UTF-8 encoded JSON-RPC, one per line
//! - Messages must not contain embedded newlines
//! - stdin: receives messages from the host
//! - stdout: sends messages to the host
//! - stderr: logging only
//!
//! Reading happens on the server loop. Writing goes through a cloneable
//! [`MessageWriter`] so that tool calls running on their own tasks can
//! reply as soon as they finish. Each line is written under a lock, so
//! replies never interleave.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use crate::mcp::protocol::OutgoingMessage;

/// Line reader over stdin.
pub struct StdioReader {
    reader: BufReader<tokio::io::Stdin>,
    /// Bytes of a line whose read was interrupted by another select branch.
    pending: Vec<u8>,
}

impl StdioReader {
    /// Creates a reader over the process stdin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reader: BufReader::new(tokio::io::stdin()),
            pending: Vec::new(),
        }
    }

    /// Reads the next message line.
    ///
    /// Returns `None` if stdin is closed (EOF). Safe to cancel: a partially
    /// read line is kept and completed by the next call. Invalid UTF-8 is
    /// replaced, not rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from stdin fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let read = self.reader.read_until(b'\n', &mut self.pending).await?;
        if read == 0 && self.pending.is_empty() {
            return Ok(None);
        }

        let bytes = std::mem::take(&mut self.pending);
        let mut line = String::from_utf8_lossy(&bytes).into_owned();
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

impl Default for StdioReader {
    fn default() -> Self {
        Self::new()
    }
}

type SharedSink = Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;

/// A cloneable, line-oriented message writer.
#[derive(Clone)]
pub struct MessageWriter {
    sink: SharedSink,
}

impl MessageWriter {
    /// Creates a writer over the process stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    /// Creates a writer over an arbitrary async sink.
    #[must_use]
    pub fn new(sink: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Serialises `message` and writes it as one newline-terminated line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn send(&self, message: &OutgoingMessage) -> io::Result<()> {
        let json = serde_json::to_string(message)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        let mut sink = self.sink.lock().await;
        sink.write_all(json.as_bytes()).await?;
        sink.write_all(b"\n").await?;
        sink.flush().await
    }
}
