//! Shared helpers for the end-to-end session tests.

use shellfence::{InterpreterProfile, Session, SessionConfig};

/// Initialise test logging once; later calls are no-ops.
///
/// Run with `RUST_LOG=shellfence=debug` to watch the framing protocol.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Start a session against the system's POSIX `sh`.
pub async fn sh_session() -> Session {
    init_tracing();
    Session::start(SessionConfig::new(InterpreterProfile::sh()))
        .await
        .expect("sh must be spawnable")
}
