//! Boundary-aware line codec for interpreter output streams.
//!
//! Splits an unbounded byte stream into lines for
//! [`tokio_util::codec::FramedRead`], and recognises the line that starts
//! with the capture's boundary token as the end of one command's output.
//! Unlike a plain lines codec, the decoder goes permanently quiet once the
//! boundary line is seen: neither the boundary line nor anything after it
//! is consumed, and no further frames are produced by that instance.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::fence::boundary::Boundary;
use crate::{Result, SessionError};

/// One decoded unit of interpreter output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete output line, newline discarded and trailing `\r` stripped.
    Line(String),
    /// A line starting with the boundary token was reached. Terminal.
    Boundary,
}

/// Incremental splitter that turns one output pipe into [`Frame`]s.
///
/// Each command capture drives a fresh instance carrying that capture's
/// boundary token. Consumed line bytes are mirrored into a raw buffer that
/// the capture hands back to the session for diagnostics.
#[derive(Debug)]
pub struct BoundaryCodec {
    boundary: Boundary,
    raw: Vec<u8>,
    finished: bool,
}

impl BoundaryCodec {
    /// Create a codec scanning for `boundary`.
    #[must_use]
    pub fn new(boundary: Boundary) -> Self {
        Self {
            boundary,
            raw: Vec::new(),
            finished: false,
        }
    }

    /// Take the raw bytes consumed so far, leaving the capture buffer empty.
    pub fn take_raw(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.raw)
    }

    /// Core splitting step shared by [`Decoder::decode`] and
    /// [`Decoder::decode_eof`].
    ///
    /// The boundary check runs only when a complete line is buffered, and
    /// matches the token as a line prefix: trailing content on the boundary
    /// line is allowed, while the token appearing anywhere else in a line
    /// is ordinary output.
    fn split(&mut self, src: &mut BytesMut, at_eof: bool) -> Option<Frame> {
        if self.finished {
            return None;
        }
        if let Some(pos) = src.iter().position(|&byte| byte == b'\n') {
            if src.starts_with(self.boundary.as_bytes()) {
                // Stop permanently; the boundary line and anything after it
                // stay unconsumed.
                self.finished = true;
                return Some(Frame::Boundary);
            }
            let line = src.split_to(pos + 1);
            self.raw.extend_from_slice(&line);
            return Some(Frame::Line(line_text(&line[..pos])));
        }
        if at_eof && !src.is_empty() {
            // Pipe closed mid-line: emit the remainder as a final
            // unterminated line.
            let rest = src.split_to(src.len());
            self.raw.extend_from_slice(&rest);
            return Some(Frame::Line(line_text(&rest)));
        }
        None
    }
}

impl Decoder for BoundaryCodec {
    type Item = Frame;
    type Error = SessionError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        Ok(self.split(src, false))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        Ok(self.split(src, true))
    }
}

/// Decode one line's bytes, stripping a trailing `\r` left by CRLF framing.
/// Interpreter output is not guaranteed to be UTF-8; invalid sequences are
/// replaced rather than rejected.
fn line_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
