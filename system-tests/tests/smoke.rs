// system-tests/tests/smoke.rs
// ============================================================================
// Module: Smoke Suite
// Description: Aggregates smoke system tests into one binary.
// Purpose: Reduce binaries while keeping smoke coverage centralized.
// Dependencies: suites/*, helpers
// ============================================================================

//! ## Overview
//! Aggregates smoke system tests into one binary.

mod helpers;

#[path = "suites/smoke.rs"]
mod smoke;
