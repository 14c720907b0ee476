//! Per-pipe capture driver.
//!
//! Runs one [`BoundaryCodec`] over one output pipe until the boundary line
//! is seen, accumulating every line before it. stdout and stderr are
//! unsynchronised and either can block waiting on the interpreter, so a
//! session always drives two captures concurrently and joins them.

use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tracing::debug;

use crate::fence::boundary::Boundary;
use crate::fence::codec::{BoundaryCodec, Frame};
use crate::{Result, SessionError};

/// Everything one capture produced on one pipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedStream {
    /// Newline-joined output lines, boundary line excluded.
    pub text: String,
    /// Raw bytes consumed from the pipe, kept for diagnostics.
    pub raw: Vec<u8>,
}

/// Capture one stream until its boundary line or end of stream.
///
/// Reading stops at the boundary without consuming anything past it; bytes
/// after the boundary line are left for whoever reads the pipe next. End
/// of stream before the boundary is not an error: whatever was captured so
/// far, including a final unterminated line, is returned.
///
/// # Errors
///
/// Returns [`SessionError::StreamRead`] if a pipe read fails mid-capture.
/// The partial capture is discarded in that case.
pub async fn capture_stream<R>(stream: R, boundary: &Boundary) -> Result<CapturedStream>
where
    R: AsyncRead + Unpin,
{
    let mut framed = FramedRead::new(stream, BoundaryCodec::new(boundary.clone()));
    let mut lines: Vec<String> = Vec::new();
    let mut hit_boundary = false;

    while let Some(frame) = framed.next().await {
        let frame = frame.map_err(|err| match err {
            SessionError::Io(msg) => SessionError::StreamRead(msg),
            other => other,
        })?;
        match frame {
            Frame::Line(line) => lines.push(line),
            Frame::Boundary => {
                hit_boundary = true;
                break;
            }
        }
    }

    if hit_boundary {
        debug!(boundary = %boundary, lines = lines.len(), "capture reached boundary line");
    } else {
        debug!(boundary = %boundary, lines = lines.len(), "pipe closed before boundary line");
    }

    let raw = framed.decoder_mut().take_raw();
    Ok(CapturedStream {
        text: lines.join("\n"),
        raw,
    })
}
