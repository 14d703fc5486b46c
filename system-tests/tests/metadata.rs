// system-tests/tests/metadata.rs
// ============================================================================
// Module: Metadata Suite
// Description: Aggregates metadata lookup and audit system tests into one binary.
// Purpose: Reduce binaries while keeping metadata lookup and audit coverage centralized.
// Dependencies: suites/*, helpers
// ============================================================================

//! ## Overview
//! Aggregates metadata lookup and audit system tests into one binary.

mod helpers;

#[path = "suites/metadata.rs"]
mod metadata;
