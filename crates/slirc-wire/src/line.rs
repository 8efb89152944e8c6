//! Line-based codec for tokio.
//!
//! Reads newline-terminated lines off the socket and writes CRLF-terminated
//! lines back. Reads are capped at [`MAX_READ_LEN`] bytes: a longer line is
//! handed out in successive chunks instead of being rejected, so a chatty
//! peer can never stall the reader.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Largest chunk handed out by a single read (RFC 1459 line limit).
pub const MAX_READ_LEN: usize = 512;

/// Line-based codec that handles newline-terminated messages.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum bytes returned per decoded line
    max_len: usize,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// Create a codec with the standard 512-byte read cap.
    pub fn new() -> Self {
        Self::with_max_len(MAX_READ_LEN)
    }

    /// Create a codec with a custom read cap.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len: max_len.max(1),
        }
    }

    /// Decode raw bytes into a line, dropping the terminator.
    ///
    /// Servers occasionally send Latin-1 text; invalid UTF-8 is replaced
    /// rather than treated as a fatal error.
    fn to_line(raw: &[u8]) -> String {
        String::from_utf8_lossy(raw)
            .trim_end_matches(['\r', '\n'])
            .to_owned()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let search_end = src.len().min(self.max_len);
            let found = src[self.next_index.min(search_end)..search_end]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.next_index.min(search_end) + offset + 1);

            let take = match found {
                Some(end) => end,
                // Overlong line: emit the first max_len bytes as their own chunk
                None if src.len() >= self.max_len => self.max_len,
                None => {
                    self.next_index = src.len();
                    return Ok(None);
                }
            };

            let raw = src.split_to(take);
            self.next_index = 0;

            let line = Self::to_line(&raw);
            if !line.is_empty() {
                return Ok(Some(line));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }

        // Unterminated trailing data at EOF is still a line
        let raw = src.split_to(src.len());
        self.next_index = 0;
        let line = Self::to_line(&raw);
        Ok((!line.is_empty()).then_some(line))
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.trim_end_matches(['\r', '\n']).as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
