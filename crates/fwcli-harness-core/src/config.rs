// crates/fwcli-harness-core/src/config.rs
// ============================================================================
// Module: Harness Configuration
// Description: TOML configuration loading and validation for the harness.
// Purpose: Wire transport, retry, canonicalizer, classifier, and audit settings.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! Configuration is read from TOML and validated fail-closed: unknown fields,
//! oversized files, non-UTF-8 content, and out-of-range values are rejected.
//! The path comes from the caller, then `FWCLI_HARNESS_CONFIG`, then
//! `fwcli-harness.toml` in the working directory. When no explicit path or
//! environment override is given and the default file is absent, the
//! built-in defaults apply.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::audit::ExecutionAuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::canonical::Canonicalizer;
use crate::classifier::ErrorCode;
use crate::classifier::SignatureClassifier;
use crate::executor::DEFAULT_MAX_ATTEMPTS;
use crate::executor::MAX_ATTEMPTS_LIMIT;
use crate::executor::RetryPolicy;
use crate::transport::ProcessTransport;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default config filename.
const DEFAULT_CONFIG_NAME: &str = "fwcli-harness.toml";
/// Environment variable override for config path.
pub const CONFIG_ENV_VAR: &str = "FWCLI_HARNESS_CONFIG";
/// Maximum allowed config file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length for config-related paths.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Default firewall CLI executable name.
const DEFAULT_EXECUTABLE: &str = "dscli";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Harness config errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O error.
    #[error("harness config io error: {0}")]
    Io(String),
    /// Parse error.
    #[error("harness config parse error: {0}")]
    Parse(String),
    /// Invalid configuration.
    #[error("harness config invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Process transport settings.
    #[serde(default)]
    pub transport: TransportConfig,
    /// Retry budget.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Canonicalizer extensions.
    #[serde(default)]
    pub canonical: CanonicalConfig,
    /// Classifier extensions.
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Audit log routing.
    #[serde(default)]
    pub audit: AuditConfig,
}

/// `[transport]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransportConfig {
    /// Firewall CLI executable.
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    /// Arguments placed before every command.
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory for the process.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }
}

/// `[retry]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Attempt budget for retried commands.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// `[canonical]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanonicalConfig {
    /// Labels suppressed in addition to the built-in list.
    #[serde(default)]
    pub extra_suppressed_labels: Vec<String>,
}

/// `[classifier]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Signatures evaluated before the built-in table.
    #[serde(default)]
    pub signatures: Vec<SignatureConfig>,
}

/// One configured error signature.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureConfig {
    /// Case-insensitive substring to look for.
    pub pattern: String,
    /// Code assigned on match.
    pub code: ErrorCode,
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditMode {
    /// Discard events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `path`.
    File,
}

/// `[audit]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink selection.
    #[serde(default)]
    pub mode: AuditMode,
    /// Log file for [`AuditMode::File`].
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl HarnessConfig {
    /// Loads configuration from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(resolved) = resolve_path(path)? else {
            return Ok(Self::default());
        };
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transport.executable.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("transport.executable is required".to_string()));
        }
        validate_path(&self.transport.executable)?;
        if let Some(dir) = &self.transport.working_dir {
            validate_path(dir)?;
        }
        if self.transport.env.keys().any(|key| key.is_empty() || key.contains('=')) {
            return Err(ConfigError::Invalid(
                "transport.env keys must be non-empty and must not contain '='".to_string(),
            ));
        }
        if !(1 ..= MAX_ATTEMPTS_LIMIT).contains(&self.retry.max_attempts) {
            return Err(ConfigError::Invalid(format!(
                "retry.max_attempts must be between 1 and {MAX_ATTEMPTS_LIMIT}"
            )));
        }
        if self.canonical.extra_suppressed_labels.iter().any(|label| label.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "canonical.extra_suppressed_labels must not contain blank labels".to_string(),
            ));
        }
        if self.classifier.signatures.iter().any(|sig| sig.pattern.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "classifier.signatures patterns must not be blank".to_string(),
            ));
        }
        match (self.audit.mode, &self.audit.path) {
            (AuditMode::File, None) => {
                Err(ConfigError::Invalid("audit mode file requires audit.path".to_string()))
            }
            (AuditMode::File, Some(path)) => validate_path(path),
            (AuditMode::None | AuditMode::Stderr, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid with mode file".to_string()))
            }
            (AuditMode::None | AuditMode::Stderr, None) => Ok(()),
        }
    }

    /// Builds the process transport.
    #[must_use]
    pub fn build_transport(&self) -> ProcessTransport {
        ProcessTransport::from_config(&self.transport)
    }

    /// Builds the retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the attempt budget is zero.
    pub fn build_retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        RetryPolicy::from_attempts(self.retry.max_attempts)
            .ok_or_else(|| ConfigError::Invalid("retry.max_attempts must be positive".to_string()))
    }

    /// Builds the canonicalizer with configured extra labels.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a label cannot be compiled.
    pub fn build_canonicalizer(&self) -> Result<Canonicalizer, ConfigError> {
        Canonicalizer::new()
            .and_then(|canonicalizer| {
                canonicalizer.with_extra_labels(self.canonical.extra_suppressed_labels.as_slice())
            })
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Builds the classifier with configured signatures ahead of the built-ins.
    #[must_use]
    pub fn build_classifier(&self) -> SignatureClassifier {
        SignatureClassifier::builtin()
            .with_leading(self.classifier.signatures.iter().map(|sig| (sig.pattern.as_str(), sig.code)))
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn build_audit_sink(&self) -> Result<Box<dyn ExecutionAuditSink>, ConfigError> {
        match (self.audit.mode, &self.audit.path) {
            (AuditMode::None, _) => Ok(Box::new(NoopAuditSink)),
            (AuditMode::Stderr, _) => Ok(Box::new(StderrAuditSink)),
            (AuditMode::File, Some(path)) => FileAuditSink::new(path)
                .map(|sink| Box::new(sink) as Box<dyn ExecutionAuditSink>)
                .map_err(|err| ConfigError::Io(err.to_string())),
            (AuditMode::File, None) => {
                Err(ConfigError::Invalid("audit mode file requires audit.path".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Serde default for the executable.
fn default_executable() -> PathBuf {
    PathBuf::from(DEFAULT_EXECUTABLE)
}

/// Serde default for the attempt budget.
const fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

/// Resolves the config path from explicit input or environment.
///
/// Returns `None` when only the default file applies and it does not exist.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default.is_file().then_some(default))
}

/// Validates path length and components.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
