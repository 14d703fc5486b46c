// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for firewall CLI harness system-tests.
// Purpose: Provide the stub CLI fixture, artifacts, and assertion helpers.
// Dependencies: system-tests, fwcli-harness-core
// ============================================================================

//! ## Overview
//! Shared helpers for firewall CLI harness system-tests.
//! Invariants:
//! - Every test drives its own stub state file; suites never share state.
//! - The stub is launched through the real process transport.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod checks;
pub mod fake;
