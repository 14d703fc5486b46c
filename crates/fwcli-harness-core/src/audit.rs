// crates/fwcli-harness-core/src/audit.rs
// ============================================================================
// Module: Execution Audit Logging
// Description: Structured audit events for command attempts and retries.
// Purpose: Emit JSON-line execution logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every attempt the executor makes is described by an
//! [`ExecutionAuditEvent`]. Sinks route events to stderr, an append-only file,
//! or nowhere. Sink failures are swallowed so logging never changes the
//! outcome of a command.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::classifier::ErrorCode;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome recorded for a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The attempt is about to be dispatched.
    Dispatched,
    /// The attempt succeeded.
    Ok,
    /// The attempt failed with a transient error and will be retried.
    Retry,
    /// The attempt failed and the error propagates.
    Error,
}

/// Execution audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Command text as sent to the transport.
    pub command: String,
    /// One-based attempt number.
    pub attempt: u32,
    /// Attempt budget for the call.
    pub max_attempts: u32,
    /// Attempt outcome.
    pub outcome: AuditOutcome,
    /// Classified error code, when the attempt failed.
    pub error_code: Option<ErrorCode>,
    /// Error message, when the attempt failed.
    pub message: Option<String>,
}

impl ExecutionAuditEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(
        event: &'static str,
        command: &str,
        attempt: u32,
        max_attempts: u32,
        outcome: AuditOutcome,
    ) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            command: command.to_string(),
            attempt,
            max_attempts,
            outcome,
            error_code: None,
            message: None,
        }
    }

    /// Attaches failure details.
    #[must_use]
    pub fn with_error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
        self.error_code = Some(code);
        self.message = Some(message.into());
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for execution events.
pub trait ExecutionAuditSink {
    /// Record an audit event.
    fn record(&self, event: &ExecutionAuditEvent);
}

impl<T: ExecutionAuditSink + ?Sized> ExecutionAuditSink for Box<T> {
    fn record(&self, event: &ExecutionAuditEvent) {
        (**self).record(event);
    }
}

/// Audit sink that discards events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl ExecutionAuditSink for NoopAuditSink {
    fn record(&self, _event: &ExecutionAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrAuditSink;

impl ExecutionAuditSink for StderrAuditSink {
    fn record(&self, event: &ExecutionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
#[derive(Debug)]
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ExecutionAuditSink for FileAuditSink {
    fn record(&self, event: &ExecutionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
