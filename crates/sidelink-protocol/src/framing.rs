//! Line framing over an arbitrarily chunked byte stream
//!
//! The sidecar writes whole JSON lines, but the pipe delivers them in
//! whatever chunk sizes the OS feels like. [`LineBuffer`] accumulates chunks
//! and hands back complete lines, so a message split across reads (or several
//! messages arriving in one read) frames identically to the unchunked stream.

/// Accumulating buffer for partially received output
///
/// Owned by a single reader; callers append each chunk with [`extend`] and
/// then drain with [`drain_line`] until it returns `None`, so the buffer
/// never holds a complete line terminator between reads.
///
/// [`extend`]: LineBuffer::extend
/// [`drain_line`]: LineBuffer::drain_line
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a newly received chunk of output
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Remove and return the next complete line, without its terminator
    ///
    /// Returns `None` while no full line has arrived yet. Bytes are split on
    /// `\n` only; a trailing `\r` is left in place for the parser's trim.
    pub fn drain_line(&mut self) -> Option<Vec<u8>> {
        let boundary = self.buf.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buf.drain(..=boundary).collect();
        line.pop();
        Some(line)
    }

    /// Number of buffered bytes awaiting a terminator
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer holds no partial line
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
