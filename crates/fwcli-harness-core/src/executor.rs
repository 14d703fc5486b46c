// crates/fwcli-harness-core/src/executor.rs
// ============================================================================
// Module: Command Executor
// Description: Single-attempt and bounded-retry command execution.
// Purpose: Tolerate transient control-plane races without masking real errors.
// Dependencies: thiserror, crate::{audit, classifier, transport}
// ============================================================================

//! ## Overview
//! The executor owns an explicit transport handle, an error classifier, a
//! retry policy, and an audit sink. [`Executor::execute`] performs exactly one
//! attempt. [`Executor::execute_with_retry`] repeats the attempt while the
//! classifier reports a transient [`ErrorCode`], stops at the first terminal
//! error, and returns the last original error once the attempt budget is
//! spent. There is no delay between attempts and no cancellation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroU32;

use thiserror::Error;

use crate::audit::AuditOutcome;
use crate::audit::ExecutionAuditEvent;
use crate::audit::ExecutionAuditSink;
use crate::audit::NoopAuditSink;
use crate::classifier::Disposition;
use crate::classifier::ErrorClassifier;
use crate::classifier::ErrorCode;
use crate::classifier::SignatureClassifier;
use crate::command::Command;
use crate::transport::CommandOutput;
use crate::transport::Transport;
use crate::transport::TransportError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default attempt budget for retried commands.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
/// Upper bound accepted for a configured attempt budget.
pub const MAX_ATTEMPTS_LIMIT: u32 = 100;

// ============================================================================
// SECTION: Retry Policy
// ============================================================================

/// Fixed attempt budget shared by every retried call of an executor.
///
/// # Invariants
/// - At least one attempt is always made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of transport invocations per call.
    max_attempts: NonZeroU32,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget.
    #[must_use]
    pub const fn new(max_attempts: NonZeroU32) -> Self {
        Self {
            max_attempts,
        }
    }

    /// Creates a policy from a raw attempt count, rejecting zero.
    #[must_use]
    pub fn from_attempts(max_attempts: u32) -> Option<Self> {
        NonZeroU32::new(max_attempts).map(Self::new)
    }

    /// Returns the attempt budget.
    #[must_use]
    pub const fn max_attempts(self) -> u32 {
        self.max_attempts.get()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(NonZeroU32::MIN.saturating_add(DEFAULT_MAX_ATTEMPTS - 1))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Transport error annotated with its classification.
///
/// # Invariants
/// - Displays exactly as the wrapped transport error.
/// - `attempt` is the one-based attempt that produced the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct ClassifiedError {
    /// Original transport error.
    error: TransportError,
    /// Classification result.
    code: ErrorCode,
    /// Attempt that produced the error.
    attempt: u32,
}

impl ClassifiedError {
    /// Wraps a transport error with its classification.
    #[must_use]
    pub const fn new(error: TransportError, code: ErrorCode, attempt: u32) -> Self {
        Self {
            error,
            code,
            attempt,
        }
    }

    /// Returns the original transport error.
    #[must_use]
    pub const fn error(&self) -> &TransportError {
        &self.error
    }

    /// Consumes the wrapper and returns the original transport error.
    #[must_use]
    pub fn into_inner(self) -> TransportError {
        self.error
    }

    /// Returns the classified error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the retry decision for this error.
    #[must_use]
    pub const fn disposition(&self) -> Disposition {
        self.code.disposition()
    }

    /// Returns the attempt number that produced this error.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }
}

// ============================================================================
// SECTION: Executor
// ============================================================================

/// Command executor bound to one transport handle.
pub struct Executor<T, C = SignatureClassifier, A = NoopAuditSink> {
    /// Transport used for every attempt.
    transport: T,
    /// Classifier consulted after each failed attempt.
    classifier: C,
    /// Attempt budget for retried calls.
    policy: RetryPolicy,
    /// Sink receiving per-attempt audit events.
    audit: A,
}

impl<T: Transport> Executor<T> {
    /// Creates an executor with the built-in classifier, default policy, and
    /// no audit logging.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            classifier: SignatureClassifier::builtin(),
            policy: RetryPolicy::default(),
            audit: NoopAuditSink,
        }
    }
}

impl<T, C, A> Executor<T, C, A>
where
    T: Transport,
    C: ErrorClassifier,
    A: ExecutionAuditSink,
{
    /// Replaces the error classifier.
    #[must_use]
    pub fn with_classifier<C2: ErrorClassifier>(self, classifier: C2) -> Executor<T, C2, A> {
        Executor {
            transport: self.transport,
            classifier,
            policy: self.policy,
            audit: self.audit,
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit<A2: ExecutionAuditSink>(self, audit: A2) -> Executor<T, C, A2> {
        Executor {
            transport: self.transport,
            classifier: self.classifier,
            policy: self.policy,
            audit,
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Returns the transport handle.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport handle mutably.
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the executor and returns the transport handle.
    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Sends the command once; transport errors propagate unmodified.
    ///
    /// # Errors
    ///
    /// Returns the [`TransportError`] raised by the single attempt.
    pub fn execute(&mut self, command: &Command) -> Result<CommandOutput, TransportError> {
        self.record("command_attempt", command, 1, 1, AuditOutcome::Dispatched, None);
        match self.transport.send(command) {
            Ok(output) => {
                self.record("command_succeeded", command, 1, 1, AuditOutcome::Ok, None);
                Ok(output)
            }
            Err(error) => {
                let code = self.classifier.classify(&error);
                self.record("command_failed", command, 1, 1, AuditOutcome::Error, Some((code, &error)));
                Err(error)
            }
        }
    }

    /// Sends the command, retrying while failures classify as transient.
    ///
    /// # Errors
    ///
    /// Returns the first terminal [`ClassifiedError`], or the last transient
    /// one when the attempt budget is exhausted.
    pub fn execute_with_retry(&mut self, command: &Command) -> Result<CommandOutput, ClassifiedError> {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;
        loop {
            self.record(
                "command_attempt",
                command,
                attempt,
                max_attempts,
                AuditOutcome::Dispatched,
                None,
            );
            match self.transport.send(command) {
                Ok(output) => {
                    self.record(
                        "command_succeeded",
                        command,
                        attempt,
                        max_attempts,
                        AuditOutcome::Ok,
                        None,
                    );
                    return Ok(output);
                }
                Err(error) => {
                    let code = self.classifier.classify(&error);
                    if code.is_retryable() && attempt < max_attempts {
                        self.record(
                            "command_retry",
                            command,
                            attempt,
                            max_attempts,
                            AuditOutcome::Retry,
                            Some((code, &error)),
                        );
                        attempt += 1;
                        continue;
                    }
                    self.record(
                        "command_failed",
                        command,
                        attempt,
                        max_attempts,
                        AuditOutcome::Error,
                        Some((code, &error)),
                    );
                    return Err(ClassifiedError::new(error, code, attempt));
                }
            }
        }
    }

    /// Retried call for metadata lookups where an empty success is a valid
    /// answer.
    ///
    /// An empty result ends the loop with `Ok(None)` instead of being treated
    /// as a reason to keep polling.
    ///
    /// # Errors
    ///
    /// Same as [`Executor::execute_with_retry`].
    pub fn execute_metadata(
        &mut self,
        command: &Command,
    ) -> Result<Option<CommandOutput>, ClassifiedError> {
        let output = self.execute_with_retry(command)?;
        Ok(if output.is_empty() { None } else { Some(output) })
    }

    /// Emits one audit event.
    fn record(
        &self,
        event: &'static str,
        command: &Command,
        attempt: u32,
        max_attempts: u32,
        outcome: AuditOutcome,
        failure: Option<(ErrorCode, &TransportError)>,
    ) {
        let mut payload =
            ExecutionAuditEvent::new(event, command.as_str(), attempt, max_attempts, outcome);
        if let Some((code, error)) = failure {
            payload = payload.with_error(code, error.to_string());
        }
        self.audit.record(&payload);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
