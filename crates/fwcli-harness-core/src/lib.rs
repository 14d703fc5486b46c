// crates/fwcli-harness-core/src/lib.rs
// ============================================================================
// Module: Firewall CLI Harness Core Library
// Description: Command execution, retry classification, and output canonicalization.
// Purpose: Provide the shared pipeline every firewall CLI assertion flows through.
// Dependencies: regex, serde, serde_json, thiserror, toml
// ============================================================================

//! ## Overview
//! `fwcli-harness-core` drives the administrative CLI of a database firewall
//! through a [`Transport`], retries commands that fail with known-transient
//! errors, and reduces raw textual output to a [`CanonicalOutput`] that can be
//! compared for exact equality across runs.
//!
//! The pipeline is synchronous and single-threaded. Each call issues one
//! command, waits for the full response, and canonicalizes it before the
//! caller asserts on it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertion;
pub mod audit;
pub mod canonical;
pub mod classifier;
pub mod command;
pub mod config;
pub mod executor;
pub mod registry;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assertion::OutputMismatch;
pub use assertion::Sample;
pub use assertion::SampleError;
pub use assertion::expect_canonical;
pub use audit::AuditOutcome;
pub use audit::ExecutionAuditEvent;
pub use audit::ExecutionAuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use canonical::CanonicalOutput;
pub use canonical::CanonicalizeError;
pub use canonical::CanonicalizeOptions;
pub use canonical::Canonicalizer;
pub use canonical::NormalizationRule;
pub use classifier::Disposition;
pub use classifier::ErrorClassifier;
pub use classifier::ErrorCode;
pub use classifier::SignatureClassifier;
pub use command::ArgValue;
pub use command::Command;
pub use command::CommandArgs;
pub use command::quote_if_needed;
pub use config::ConfigError;
pub use config::HarnessConfig;
pub use executor::ClassifiedError;
pub use executor::DEFAULT_MAX_ATTEMPTS;
pub use executor::Executor;
pub use executor::RetryPolicy;
pub use registry::OperationDescriptor;
pub use registry::OperationRegistry;
pub use registry::ParamKind;
pub use registry::ParamSpec;
pub use registry::RegistryError;
pub use registry::RenderError;
pub use transport::CommandOutput;
pub use transport::ProcessTransport;
pub use transport::ScriptedTransport;
pub use transport::Transport;
pub use transport::TransportError;
