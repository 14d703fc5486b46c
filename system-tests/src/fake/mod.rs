// system-tests/src/fake/mod.rs
// ============================================================================
// Module: Fake Firewall CLI
// Description: Stub implementation of the firewall administrative CLI.
// Purpose: Give system tests a deterministic tool with realistic faults.
// Dependencies: rand, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! The `fake-dscli` binary is a thin wrapper around [`run`]. Each launch
//! handles exactly one command, the same way the real tool is driven by the
//! harness's process transport. State lives in a JSON file named by the
//! leading `--state PATH` arguments, so faults such as metadata cache misses
//! can span several launches.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod handlers;
mod state;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use handlers::Invocation;
pub use handlers::Reply;
pub use handlers::Volatile;
pub use handlers::dispatch;
pub use state::FakeState;
pub use state::HostRecord;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Leading switch naming the state file.
pub const STATE_FLAG: &str = "--state";

/// Exit code for stub infrastructure failures, distinct from tool failures.
pub const USAGE_EXIT_CODE: u8 = 2;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Stub infrastructure failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FakeError {
    /// The invocation could not be parsed.
    #[error("fake-dscli usage: {0}")]
    Usage(String),
    /// The state file could not be read or written.
    #[error("fake-dscli state: {0}")]
    State(String),
    /// The current time could not be formatted.
    #[error("fake-dscli clock: {0}")]
    Clock(String),
}

// ============================================================================
// SECTION: Entry
// ============================================================================

/// Handles one invocation; `args` excludes the program name.
///
/// # Errors
///
/// Returns [`FakeError`] when the arguments are malformed or the state file
/// cannot be loaded or saved. Tool-level failures are carried in [`Reply`].
pub fn run(args: &[String], volatile: &Volatile) -> Result<Reply, FakeError> {
    let (state_path, tokens) = split_state_path(args)?;
    let invocation = Invocation::parse(tokens)?;
    let mut state = FakeState::load(&state_path)?;
    state.calls += 1;
    let reply = dispatch(&mut state, &invocation, volatile);
    state.save(&state_path)?;
    Ok(reply)
}

/// Splits the leading `--state PATH` pair from the command tokens.
fn split_state_path(args: &[String]) -> Result<(PathBuf, &[String]), FakeError> {
    match args {
        [flag, path, rest @ ..] if flag == STATE_FLAG => Ok((PathBuf::from(path), rest)),
        _ => Err(FakeError::Usage(format!("expected {STATE_FLAG} PATH before the command"))),
    }
}

/// Layout the tool uses for dates, e.g. `2025-01-02 03:04:05`.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Samples the volatile fields for one launch.
///
/// # Errors
///
/// Returns [`FakeError::Clock`] when the current time cannot be formatted.
pub fn sample_volatile() -> Result<Volatile, FakeError> {
    Ok(Volatile {
        now: format_timestamp(OffsetDateTime::now_utc())?,
        backend: rand::random::<u32>(),
    })
}

/// Formats a timestamp the way the tool prints dates.
///
/// # Errors
///
/// Returns [`FakeError::Clock`] when formatting fails.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, FakeError> {
    at.format(TIMESTAMP_FORMAT).map_err(|err| FakeError::Clock(err.to_string()))
}
