// crates/fwcli-harness-core/src/classifier.rs
// ============================================================================
// Module: Error Classifier
// Description: Closed error-code set and signature table for CLI failures.
// Purpose: Decide whether a failed attempt is a transient race or terminal.
// Dependencies: serde, crate::transport
// ============================================================================

//! ## Overview
//! The firewall control plane starts workers asynchronously and refreshes its
//! metadata cache in the background, so some failures resolve on their own.
//! Classification maps a [`TransportError`] to an [`ErrorCode`]; the code's
//! [`Disposition`] is a fixed lookup table. Anything unrecognized is fatal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::transport::TransportError;

// ============================================================================
// SECTION: Error Codes
// ============================================================================

/// Known failure classes reported by the firewall CLI.
///
/// # Invariants
/// - Variants are stable for audit labels and config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// An object is not yet visible in the metadata cache.
    MetadataCacheMiss,
    /// Metadata is being refreshed or is otherwise not ready.
    MetadataNotReady,
    /// A core worker process has not finished starting.
    WorkerNotReady,
    /// The referenced object does not exist.
    ObjectNotFound,
    /// The object being created already exists.
    AlreadyExists,
    /// The tool rejected the command arguments.
    InvalidArguments,
    /// The CLI executable is missing or could not run.
    ExecutableUnavailable,
    /// The session was rejected or has expired.
    SessionRejected,
    /// No known signature matched.
    Unknown,
}

/// Retry decision attached to an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Transient; the executor may try again.
    Retry,
    /// Terminal; the error propagates immediately.
    Fatal,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::MetadataCacheMiss,
        Self::MetadataNotReady,
        Self::WorkerNotReady,
        Self::ObjectNotFound,
        Self::AlreadyExists,
        Self::InvalidArguments,
        Self::ExecutableUnavailable,
        Self::SessionRejected,
        Self::Unknown,
    ];

    /// Returns the retry decision for this code.
    #[must_use]
    pub const fn disposition(self) -> Disposition {
        match self {
            Self::MetadataCacheMiss | Self::MetadataNotReady | Self::WorkerNotReady => {
                Disposition::Retry
            }
            Self::ObjectNotFound
            | Self::AlreadyExists
            | Self::InvalidArguments
            | Self::ExecutableUnavailable
            | Self::SessionRejected
            | Self::Unknown => Disposition::Fatal,
        }
    }

    /// Returns the stable label for this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MetadataCacheMiss => "metadata_cache_miss",
            Self::MetadataNotReady => "metadata_not_ready",
            Self::WorkerNotReady => "worker_not_ready",
            Self::ObjectNotFound => "object_not_found",
            Self::AlreadyExists => "already_exists",
            Self::InvalidArguments => "invalid_arguments",
            Self::ExecutableUnavailable => "executable_unavailable",
            Self::SessionRejected => "session_rejected",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true when the executor should try again.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self.disposition(), Disposition::Retry)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Classifier Trait
// ============================================================================

/// Maps a failed attempt to an error code.
pub trait ErrorClassifier {
    /// Classifies a transport error.
    fn classify(&self, error: &TransportError) -> ErrorCode;
}

impl<F> ErrorClassifier for F
where
    F: Fn(&TransportError) -> ErrorCode,
{
    fn classify(&self, error: &TransportError) -> ErrorCode {
        self(error)
    }
}

// ============================================================================
// SECTION: Signature Classifier
// ============================================================================

/// Built-in message signatures, matched case-insensitively in order.
const BUILTIN_SIGNATURES: &[(&str, ErrorCode)] = &[
    ("is not in metadata cache", ErrorCode::MetadataCacheMiss),
    ("metadata is not loaded", ErrorCode::MetadataNotReady),
    ("metadata update is in progress", ErrorCode::MetadataNotReady),
    ("worker is not started", ErrorCode::WorkerNotReady),
    ("no active workers", ErrorCode::WorkerNotReady),
    ("core is starting", ErrorCode::WorkerNotReady),
    ("cannot read information from", ErrorCode::ExecutableUnavailable),
    ("session is expired", ErrorCode::SessionRejected),
    ("authentication failed", ErrorCode::SessionRejected),
    ("there's already", ErrorCode::AlreadyExists),
    ("there're already", ErrorCode::AlreadyExists),
    ("already exists", ErrorCode::AlreadyExists),
    ("there isn't such", ErrorCode::ObjectNotFound),
    ("not found", ErrorCode::ObjectNotFound),
    ("unknown parameter", ErrorCode::InvalidArguments),
    ("missing required parameter", ErrorCode::InvalidArguments),
    ("invalid value", ErrorCode::InvalidArguments),
];

/// Classifier that matches error text against an ordered signature table.
///
/// # Invariants
/// - Signatures are stored lowercase; the first match wins.
/// - Launch failures are always [`ErrorCode::ExecutableUnavailable`].
/// - Unmatched errors are [`ErrorCode::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureClassifier {
    /// Ordered (lowercase signature, code) pairs.
    signatures: Vec<(String, ErrorCode)>,
}

impl SignatureClassifier {
    /// Returns the classifier with the built-in signature table.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            signatures: BUILTIN_SIGNATURES
                .iter()
                .map(|(signature, code)| ((*signature).to_string(), *code))
                .collect(),
        }
    }

    /// Returns a classifier with no signatures.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            signatures: Vec::new(),
        }
    }

    /// Places extra signatures ahead of the existing table.
    #[must_use]
    pub fn with_leading<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (S, ErrorCode)>,
        S: AsRef<str>,
    {
        let mut leading: Vec<(String, ErrorCode)> = extra
            .into_iter()
            .map(|(signature, code)| (signature.as_ref().to_lowercase(), code))
            .collect();
        leading.append(&mut self.signatures);
        self.signatures = leading;
        self
    }

    /// Returns the number of signatures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Returns true when no signatures are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl Default for SignatureClassifier {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ErrorClassifier for SignatureClassifier {
    fn classify(&self, error: &TransportError) -> ErrorCode {
        if matches!(error, TransportError::Spawn { .. }) {
            return ErrorCode::ExecutableUnavailable;
        }
        let text = error.diagnostic_text().to_lowercase();
        self.signatures
            .iter()
            .find(|(signature, _)| text.contains(signature.as_str()))
            .map_or(ErrorCode::Unknown, |(_, code)| *code)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
