// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Settings are read from `FWCLI_SYSTEM_TEST_*` variables. A variable that is
//! set must be valid UTF-8 and non-blank; unset variables fall back to the
//! in-tree stub and fresh per-run artifact directories.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional root for persistent per-test state and artifacts.
    RunRoot,
    /// Optional override for the stub CLI executable.
    FakeDscli,
    /// Allow reusing an existing per-test state directory (`true`/`false` or `1`/`0`).
    AllowOverwrite,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "FWCLI_SYSTEM_TEST_RUN_ROOT",
            Self::FakeDscli => "FWCLI_SYSTEM_TEST_FAKE_DSCLI",
            Self::AllowOverwrite => "FWCLI_SYSTEM_TEST_ALLOW_OVERWRITE",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Environment parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// The value is not valid UTF-8.
    #[error("{name} must be valid UTF-8")]
    NotUtf8 {
        /// Variable name.
        name: &'static str,
    },
    /// The value is empty or whitespace.
    #[error("{name} must not be empty")]
    Empty {
        /// Variable name.
        name: &'static str,
    },
    /// The value is not a boolean literal.
    #[error("{name} must be 1, 0, true, or false (got `{value}`)")]
    InvalidBool {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Shared artifact root; each test writes below `<run_root>/<test name>`.
    pub run_root: Option<PathBuf>,
    /// Stub executable replacing the in-tree `fake-dscli` build.
    pub fake_dscli: Option<PathBuf>,
    /// Whether an existing test directory below `run_root` may be reused.
    pub allow_overwrite: bool,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError`] for the first variable that fails to parse.
    pub fn load() -> Result<Self, EnvError> {
        Ok(Self {
            run_root: read_path(SystemTestEnv::RunRoot)?,
            fake_dscli: read_path(SystemTestEnv::FakeDscli)?,
            allow_overwrite: read_bool(SystemTestEnv::AllowOverwrite)?,
        })
    }
}

// ============================================================================
// SECTION: Readers
// ============================================================================

/// Reads a set variable as UTF-8 text; blank values are rejected.
///
/// # Errors
///
/// Returns [`EnvError::NotUtf8`] or [`EnvError::Empty`].
pub fn read_env(key: SystemTestEnv) -> Result<Option<String>, EnvError> {
    let name = key.as_str();
    let Some(raw) = std::env::var_os(name) else {
        return Ok(None);
    };
    let value = raw.into_string().map_err(|_| EnvError::NotUtf8 {
        name,
    })?;
    if value.trim().is_empty() {
        return Err(EnvError::Empty {
            name,
        });
    }
    Ok(Some(value))
}

/// Reads a path variable.
fn read_path(key: SystemTestEnv) -> Result<Option<PathBuf>, EnvError> {
    Ok(read_env(key)?.map(PathBuf::from))
}

/// Reads a boolean variable; unset means `false`.
fn read_bool(key: SystemTestEnv) -> Result<bool, EnvError> {
    let Some(value) = read_env(key)? else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(EnvError::InvalidBool {
            name: key.as_str(),
            value,
        }),
    }
}
