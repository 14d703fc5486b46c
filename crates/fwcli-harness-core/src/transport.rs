// crates/fwcli-harness-core/src/transport.rs
// ============================================================================
// Module: CLI Transport
// Description: Transport boundary plus process-backed and scripted transports.
// Purpose: Issue one command per call and return raw output lines or an error.
// Dependencies: serde, thiserror, std::process
// ============================================================================

//! ## Overview
//! The executor calls exactly one transport method per attempt. Output is an
//! ordered sequence of lines that keep their terminators, so canonical output
//! can be rebuilt by plain concatenation. Error contents are opaque to the
//! executor and only interpreted by an [`crate::ErrorClassifier`].
//!
//! [`ProcessTransport`] launches the firewall CLI executable once per command.
//! [`ScriptedTransport`] replays queued results for tests and dry runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::command::Command;
use crate::config::TransportConfig;

// ============================================================================
// SECTION: Output
// ============================================================================

/// Raw response from the remote CLI.
///
/// # Invariants
/// - Lines are kept in the order the tool produced them.
/// - Each line keeps its terminator when the tool emitted one.
/// - Text is valid UTF-8 exactly as the tool wrote it; [`ProcessTransport`]
///   rejects non-UTF-8 stdout instead of substituting replacement characters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    /// Output lines including terminators.
    lines: Vec<String>,
}

impl CommandOutput {
    /// Builds output from pre-split lines.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a text blob into lines, keeping each `\n` terminator.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.split_inclusive('\n'))
    }

    /// Returns the output lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consumes the output and returns its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Returns true when the tool produced nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(String::is_empty)
    }

    /// Concatenates the lines back into the raw text.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.concat()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by a transport while executing one command.
///
/// # Invariants
/// - Messages carry the tool's own text so classification can inspect it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The CLI executable could not be launched.
    #[error("failed to launch {executable}: {message}")]
    Spawn {
        /// Executable path that failed to start.
        executable: String,
        /// Operating system error text.
        message: String,
    },
    /// The CLI ran and reported failure.
    #[error("command failed ({}): {}", exit_label(.exit_code), failure_detail(.stdout, .stderr))]
    Failed {
        /// Process exit code, when the process was not killed by a signal.
        exit_code: Option<i32>,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
    /// The command text could not be turned into an argument vector.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    /// I/O failure while talking to the tool.
    #[error("transport io error: {0}")]
    Io(String),
    /// The tool rejected the command with a bare message.
    #[error("{0}")]
    Rejected(String),
}

impl TransportError {
    /// Returns the text a classifier should match signatures against.
    #[must_use]
    pub fn diagnostic_text(&self) -> String {
        match self {
            Self::Failed {
                stdout,
                stderr,
                ..
            } => format!("{stderr}\n{stdout}"),
            other => other.to_string(),
        }
    }
}

/// Renders an optional exit code for error messages.
fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "terminated by signal".to_string(), |code| format!("exit code {code}"))
}

/// Picks the most useful stream for a failure message.
fn failure_detail<'a>(stdout: &'a str, stderr: &'a str) -> &'a str {
    let stderr = stderr.trim();
    if stderr.is_empty() { stdout.trim() } else { stderr }
}

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Single-call boundary to the remote CLI.
pub trait Transport {
    /// Sends one command and returns its raw output.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the tool cannot be reached or reports
    /// failure.
    fn send(&mut self, command: &Command) -> Result<CommandOutput, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, command: &Command) -> Result<CommandOutput, TransportError> {
        (**self).send(command)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, command: &Command) -> Result<CommandOutput, TransportError> {
        (**self).send(command)
    }
}

// ============================================================================
// SECTION: Process Transport
// ============================================================================

/// Transport that launches the CLI executable once per command.
///
/// # Invariants
/// - Every send performs exactly one process launch.
/// - No timeout is applied; a hung tool blocks the caller.
#[derive(Debug, Clone)]
pub struct ProcessTransport {
    /// CLI executable path.
    executable: PathBuf,
    /// Arguments placed before the command tokens.
    prefix_args: Vec<String>,
    /// Optional working directory for the process.
    working_dir: Option<PathBuf>,
    /// Extra environment variables for the process.
    env: BTreeMap<String, String>,
}

impl ProcessTransport {
    /// Creates a transport for the given executable.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            prefix_args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    /// Builds a transport from the `[transport]` config section.
    #[must_use]
    pub fn from_config(config: &TransportConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            prefix_args: config.args.clone(),
            working_dir: config.working_dir.clone(),
            env: config.env.clone(),
        }
    }

    /// Adds arguments placed before every command.
    #[must_use]
    pub fn with_prefix_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the process working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Adds an environment variable for the process.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Returns the executable path.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl Transport for ProcessTransport {
    fn send(&mut self, command: &Command) -> Result<CommandOutput, TransportError> {
        let tokens =
            command.tokens().map_err(|err| TransportError::InvalidCommand(err.to_string()))?;
        let mut process = std::process::Command::new(&self.executable);
        process.args(&self.prefix_args).args(&tokens).envs(&self.env);
        if let Some(dir) = &self.working_dir {
            process.current_dir(dir);
        }
        let output = process.output().map_err(|err| TransportError::Spawn {
            executable: self.executable.display().to_string(),
            message: err.to_string(),
        })?;
        let stdout = String::from_utf8(output.stdout).map_err(|err| {
            TransportError::Io(format!(
                "{} wrote non-UTF-8 output: {err}",
                self.executable.display()
            ))
        })?;
        if !output.status.success() {
            return Err(TransportError::Failed {
                exit_code: output.status.code(),
                stdout,
                // Stderr is diagnostic only and never classified.
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(CommandOutput::from_text(&stdout))
    }
}

// ============================================================================
// SECTION: Scripted Transport
// ============================================================================

/// Transport that replays queued results and records every command.
///
/// # Invariants
/// - Queued results are consumed in order; once empty, the repeat result (if
///   any) is returned for every further call.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    /// Results returned in order.
    queue: VecDeque<Result<CommandOutput, TransportError>>,
    /// Result returned once the queue is drained.
    repeat: Option<Result<CommandOutput, TransportError>>,
    /// Commands observed so far.
    sent: Vec<Command>,
}

impl ScriptedTransport {
    /// Creates an empty scripted transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response.
    #[must_use]
    pub fn then_ok(mut self, output: CommandOutput) -> Self {
        self.queue.push_back(Ok(output));
        self
    }

    /// Queues a failure.
    #[must_use]
    pub fn then_err(mut self, error: TransportError) -> Self {
        self.queue.push_back(Err(error));
        self
    }

    /// Queues the same failure `count` times.
    #[must_use]
    pub fn then_err_times(mut self, error: &TransportError, count: usize) -> Self {
        for _ in 0 .. count {
            self.queue.push_back(Err(error.clone()));
        }
        self
    }

    /// Sets the result returned after the queue is drained.
    #[must_use]
    pub fn repeat(mut self, result: Result<CommandOutput, TransportError>) -> Self {
        self.repeat = Some(result);
        self
    }

    /// Returns the commands sent so far.
    #[must_use]
    pub fn sent(&self) -> &[Command] {
        &self.sent
    }

    /// Returns how many times the transport was invoked.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.sent.len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, command: &Command) -> Result<CommandOutput, TransportError> {
        self.sent.push(command.clone());
        if let Some(result) = self.queue.pop_front() {
            return result;
        }
        self.repeat.clone().unwrap_or_else(|| {
            Err(TransportError::Rejected(format!("no scripted response for `{command}`")))
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
