//! Boundary tokens — per-invocation sentinels echoed into the output
//! streams to delimit one command's output.

use std::fmt::{Display, Formatter};

use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Sentinel character wrapped around the random body. Rarely the first
/// character of a legitimate output line for common interpreters.
const SENTINEL: char = '$';

/// Length of the random alphanumeric body.
const BODY_LEN: usize = 12;

/// A per-invocation boundary token, e.g. `$k3JqX9dLmWp2$`.
///
/// The token is echoed by the interpreter as the last line of a command's
/// output on one stream; the capture for that stream stops at the first
/// line *starting with* the token. Uniqueness is probabilistic, not
/// guaranteed: the body is drawn from 62^12 (about 3.2e21) alphanumeric
/// strings, so a session would need on the order of 10^18 commands before
/// a birthday collision among its own tokens becomes plausible. Command
/// output that happens to begin a line with the exact token truncates that
/// capture; the risk is accepted rather than eliminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary(String);

impl Boundary {
    /// Generate a fresh token. Each call draws a new random body.
    #[must_use]
    pub fn generate() -> Self {
        let body: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(BODY_LEN)
            .map(char::from)
            .collect();
        Self(format!("{SENTINEL}{body}{SENTINEL}"))
    }

    /// The token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token as raw bytes, for prefix matching against buffered output.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Display for Boundary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
