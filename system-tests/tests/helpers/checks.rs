// system-tests/tests/helpers/checks.rs
// ============================================================================
// Module: Test Checks
// Description: Result-returning assertions for system-tests.
// Purpose: Let suites fail with context through `?` instead of panics.
// Dependencies: std
// ============================================================================

use std::error::Error;
use std::fmt::Display;

/// Boxed error returned by system tests.
pub type TestResult = Result<(), Box<dyn Error>>;

/// Fails with `message` unless `condition` holds.
pub fn require(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into().into()) }
}

/// Fails with both values unless they are equal.
pub fn require_eq<T: PartialEq + Display + ?Sized>(left: &T, right: &T, context: &str) -> TestResult {
    if left == right {
        Ok(())
    } else {
        Err(format!("{context}: left=`{left}` right=`{right}`").into())
    }
}
