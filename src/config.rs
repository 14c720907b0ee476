//! Interpreter profiles and session configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::fence::boundary::Boundary;
use crate::{Result, SessionError};

/// Placeholder replaced by the boundary token inside echo templates.
pub const TOKEN_PLACEHOLDER: &str = "{token}";

/// How to drive one kind of command-line interpreter.
///
/// A profile carries everything the session needs to frame commands for a
/// given interpreter: what to launch, how statements are chained, how each
/// boundary token is echoed to its stream, and how the interpreter is
/// asked to quit.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct InterpreterProfile {
    /// Executable to launch.
    pub program: String,
    /// Arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,
    /// Statement separator placed between the command and the echoes.
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Line terminator appended to every submitted command.
    #[serde(default = "default_terminator")]
    pub terminator: String,
    /// Statement echoing `{token}` to standard output.
    pub stdout_echo: String,
    /// Statement echoing `{token}` to standard error.
    pub stderr_echo: String,
    /// Statement asking the interpreter to quit.
    #[serde(default = "default_exit_statement")]
    pub exit_statement: String,
}

fn default_separator() -> String {
    ";".into()
}

fn default_terminator() -> String {
    "\n".into()
}

fn default_exit_statement() -> String {
    "exit".into()
}

impl InterpreterProfile {
    /// Profile for POSIX `sh` reading statements from stdin.
    #[must_use]
    pub fn sh() -> Self {
        Self {
            program: "sh".into(),
            args: Vec::new(),
            separator: ";".into(),
            terminator: "\n".into(),
            stdout_echo: "echo '{token}'".into(),
            stderr_echo: "echo '{token}' 1>&2".into(),
            exit_statement: "exit".into(),
        }
    }

    /// Profile for `bash` reading statements from stdin.
    #[must_use]
    pub fn bash() -> Self {
        Self {
            program: "bash".into(),
            ..Self::sh()
        }
    }

    /// Profile for Windows `PowerShell` kept resident via `-NoExit`.
    ///
    /// Commands are terminated with CRLF, and the stderr boundary is
    /// written through `[Console]::Error.WriteLine`, which bypasses
    /// `PowerShell`'s error-record formatting.
    #[must_use]
    pub fn powershell() -> Self {
        Self {
            program: "powershell.exe".into(),
            args: vec!["-NoExit".into(), "-Command".into(), "-".into()],
            separator: ";".into(),
            terminator: "\r\n".into(),
            stdout_echo: "echo '{token}'".into(),
            stderr_echo: "[Console]::Error.WriteLine('{token}')".into(),
            exit_statement: "exit".into(),
        }
    }

    /// Build the full text submitted to the interpreter for one command:
    /// the user command, the stdout boundary echo, and the stderr boundary
    /// echo, chained with the separator and terminated for the
    /// interpreter.
    #[must_use]
    pub fn frame_command(
        &self,
        command: &str,
        stdout_boundary: &Boundary,
        stderr_boundary: &Boundary,
    ) -> String {
        let out_stmt = self
            .stdout_echo
            .replace(TOKEN_PLACEHOLDER, stdout_boundary.as_str());
        let err_stmt = self
            .stderr_echo
            .replace(TOKEN_PLACEHOLDER, stderr_boundary.as_str());
        let sep = &self.separator;
        format!("{command}{sep} {out_stmt}{sep} {err_stmt}{}", self.terminator)
    }

    /// The exit statement with the profile's line terminator appended.
    #[must_use]
    pub fn exit_line(&self) -> String {
        format!("{}{}", self.exit_statement, self.terminator)
    }

    /// Check that the profile is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] when the program is empty, the
    /// terminator is empty, or an echo template lacks the `{token}`
    /// placeholder.
    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(SessionError::Config(
                "interpreter program must not be empty".into(),
            ));
        }
        if self.terminator.is_empty() {
            return Err(SessionError::Config(
                "line terminator must not be empty".into(),
            ));
        }
        for (stream, template) in [("stdout", &self.stdout_echo), ("stderr", &self.stderr_echo)] {
            if !template.contains(TOKEN_PLACEHOLDER) {
                return Err(SessionError::Config(format!(
                    "{stream} echo template must contain the {TOKEN_PLACEHOLDER} placeholder"
                )));
            }
        }
        Ok(())
    }
}

/// Session configuration: the interpreter profile plus capture limits.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SessionConfig {
    /// Interpreter to launch and drive.
    pub profile: InterpreterProfile,
    /// Per-command deadline in seconds; 0 disables the deadline.
    #[serde(default)]
    pub command_timeout_seconds: u64,
}

impl SessionConfig {
    /// Configuration for `profile` with no command deadline.
    #[must_use]
    pub fn new(profile: InterpreterProfile) -> Self {
        Self {
            profile,
            command_timeout_seconds: 0,
        }
    }

    /// Set the per-command deadline in seconds; 0 disables it.
    #[must_use]
    pub fn with_command_timeout(mut self, seconds: u64) -> Self {
        self.command_timeout_seconds = seconds;
        self
    }

    /// The per-command deadline, if one is configured.
    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        match self.command_timeout_seconds {
            0 => None,
            seconds => Some(Duration::from_secs(seconds)),
        }
    }

    /// Parse a configuration from TOML text and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] on parse or validation failure.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.profile.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file cannot be read, and
    /// [`SessionError::Config`] on parse or validation failure.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| SessionError::Io(format!("failed to read {}: {err}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
