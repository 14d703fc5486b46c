// system-tests/src/lib.rs
// ============================================================================
// Module: Firewall CLI Harness System Tests Library
// Description: Shared configuration and the stub CLI for system test scenarios.
// Purpose: Provide common utilities for harness system-test binaries.
// Dependencies: rand, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration and the `fake-dscli` stub used by the
//! harness system tests in `system-tests/tests`. The suites drive the stub
//! through the real process transport, so retries, classification, and
//! canonicalization are exercised end to end.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod fake;
