// crates/fwcli-harness-cli/src/lib.rs
// ============================================================================
// Module: Firewall CLI Harness CLI Library
// Description: Shared helpers for the `fwcli-harness` binary.
// Purpose: Expose the message catalog to the binary and its tests.
// Dependencies: Standard library only.
// ============================================================================

//! ## Overview
//! Library half of the `fwcli-harness` command-line tool. It currently holds
//! the message catalog used for every user-facing string the binary prints.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod i18n;
