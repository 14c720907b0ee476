//! Unit tests for the per-pipe capture driver, over in-memory streams.

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use shellfence::fence::boundary::Boundary;
use shellfence::fence::reader::capture_stream;
use shellfence::SessionError;

/// Lines before the boundary are joined with `\n`; the boundary line is
/// excluded.
#[tokio::test]
async fn capture_stops_at_boundary_and_joins_lines() {
    let boundary = Boundary::generate();
    let data = format!("first\nsecond\n{boundary}\n");

    let captured = capture_stream(data.as_bytes(), &boundary)
        .await
        .expect("capture must succeed");
    assert_eq!(captured.text, "first\nsecond");
}

/// Bytes after the boundary line belong to nobody and are not captured.
#[tokio::test]
async fn trailing_bytes_after_boundary_are_not_captured() {
    let boundary = Boundary::generate();
    let data = format!("kept\n{boundary}\nnever seen\n");

    let captured = capture_stream(data.as_bytes(), &boundary)
        .await
        .expect("capture must succeed");
    assert_eq!(captured.text, "kept");
}

/// A pipe that closes before the boundary yields everything read so far,
/// including a final unterminated line, without an error.
#[tokio::test]
async fn eof_without_boundary_captures_everything() {
    let boundary = Boundary::generate();
    let data = "alpha\nbeta";

    let captured = capture_stream(data.as_bytes(), &boundary)
        .await
        .expect("capture must succeed at end of stream");
    assert_eq!(captured.text, "alpha\nbeta");
}

/// An immediately-closed pipe produces an empty capture.
#[tokio::test]
async fn empty_stream_yields_empty_text() {
    let boundary = Boundary::generate();
    let data: &[u8] = b"";

    let captured = capture_stream(data, &boundary)
        .await
        .expect("capture must succeed");
    assert_eq!(captured.text, "");
    assert!(captured.raw.is_empty());
}

/// A command with no output produces an empty capture: the boundary is the
/// first line.
#[tokio::test]
async fn boundary_as_first_line_yields_empty_text() {
    let boundary = Boundary::generate();
    let data = format!("{boundary}\n");

    let captured = capture_stream(data.as_bytes(), &boundary)
        .await
        .expect("capture must succeed");
    assert_eq!(captured.text, "");
}

/// The token mid-line is ordinary output and does not stop the capture.
#[tokio::test]
async fn token_inside_line_is_captured_as_output() {
    let boundary = Boundary::generate();
    let data = format!("prefix {boundary}\n{boundary}\n");

    let captured = capture_stream(data.as_bytes(), &boundary)
        .await
        .expect("capture must succeed");
    assert_eq!(captured.text, format!("prefix {boundary}"));
}

/// CRLF output joins to LF-separated text; the raw capture keeps the
/// original bytes.
#[tokio::test]
async fn crlf_output_normalises_to_lf() {
    let boundary = Boundary::generate();
    let data = format!("one\r\ntwo\r\n{boundary}\r\n");

    let captured = capture_stream(data.as_bytes(), &boundary)
        .await
        .expect("capture must succeed");
    assert_eq!(captured.text, "one\ntwo");
    assert_eq!(captured.raw, b"one\r\ntwo\r\n".to_vec());
}

/// A pipe whose reads fail poisons the whole capture.
#[tokio::test]
async fn read_failure_surfaces_as_stream_read_error() {
    let boundary = Boundary::generate();

    let err = capture_stream(BrokenPipeReader, &boundary)
        .await
        .expect_err("a failing pipe must fail the capture");
    assert!(
        matches!(err, SessionError::StreamRead(_)),
        "expected SessionError::StreamRead, got: {err:?}"
    );
}

/// Reader whose every read fails with `BrokenPipe`.
struct BrokenPipeReader;

impl AsyncRead for BrokenPipeReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Poll::Ready(Err(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe burst",
        )))
    }
}
