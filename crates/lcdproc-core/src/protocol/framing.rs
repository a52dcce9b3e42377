//! Buffering line reader for the inbound byte stream.
//!
//! TCP delivers bytes, not lines: a single read may contain half a message,
//! or several messages glued together.  [`LineReader`] accumulates raw
//! chunks and yields only complete, newline-terminated lines, carrying any
//! trailing partial line over to the next chunk.  A trailing `\r` is
//! stripped so `\r\n`-terminating servers are handled transparently.

/// Cap on the buffered bytes of a single unterminated line.  Server lines
/// are a few dozen bytes; a peer streaming more than this without a newline
/// gets the accumulated bytes surfaced as one line instead of buffered
/// further.
const MAX_PENDING: usize = 8 * 1024;

/// Accumulates raw transport chunks and splits them into complete lines.
#[derive(Debug, Default)]
pub struct LineReader {
    buf: Vec<u8>,
}

impl LineReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every complete line it unlocked, in
    /// arrival order, with the terminator (and any trailing `\r`) removed.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; the parser surfaces
    /// the resulting garbage line as unrecognized instead of killing the
    /// connection.  The same applies to an unterminated line exceeding
    /// [`MAX_PENDING`]: the buffered bytes are flushed out as a line, so the
    /// buffer never grows past the cap plus one chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=pos).collect();
            let mut line = String::from_utf8_lossy(&raw[..pos]).into_owned();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }

        if self.buf.len() > MAX_PENDING {
            let raw = std::mem::take(&mut self.buf);
            lines.push(String::from_utf8_lossy(&raw).into_owned());
        }
        lines
    }

    /// Number of buffered bytes belonging to a not-yet-terminated line.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
