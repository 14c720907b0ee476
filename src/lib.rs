#![forbid(unsafe_code)]

//! Persistent interactive sessions with command-line interpreters.
//!
//! An interpreter process speaks an unstructured byte stream on stdout and
//! stderr — nothing marks where one command's output ends. This crate
//! keeps one interpreter alive across many commands and delimits each
//! command's output by injecting a unique boundary token per stream: every
//! submitted command is followed by two echo statements, one per stream,
//! and both pipes are scanned concurrently until their boundary lines
//! arrive.
//!
//! ```no_run
//! use shellfence::{InterpreterProfile, Session, SessionConfig};
//!
//! # async fn demo() -> shellfence::Result<()> {
//! let session = Session::start(SessionConfig::new(InterpreterProfile::sh())).await?;
//! session.execute("x=42").await?;
//! let output = session.execute("echo $x").await?;
//! assert_eq!(output.stdout, "42");
//! session.exit().await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod errors;
pub mod fence;
pub mod session;

pub use config::{InterpreterProfile, SessionConfig};
pub use errors::{Result, SessionError};
pub use session::{CommandOutput, Session};
