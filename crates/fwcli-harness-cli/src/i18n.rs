// crates/fwcli-harness-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and placeholder substitution for CLI output.
// Purpose: Keep every user-facing string in one reviewed table.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! The harness CLI stores user-facing strings in a small catalog keyed by
//! stable identifiers. Runtime output should be routed through the
//! [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `path`).
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Catalog entries, one per user-facing message.
pub(crate) const CATALOG: &[(&str, &str)] = &[
    ("main.version", "fwcli-harness {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("input.stdin", "standard input"),
    ("input.read_failed", "Failed to read {path}: {error}"),
    ("input.too_large", "Refusing to read {path}: size {size} exceeds limit {limit}"),
    ("input.not_utf8", "Input {path} is not valid UTF-8"),
    ("config.load_failed", "Failed to load harness config: {error}"),
    ("canonicalizer.build_failed", "Failed to build canonicalizer: {error}"),
    ("compare.match", "Canonical output matches {path}"),
    ("render.failed", "Failed to render operation: {error}"),
    ("render.arg_invalid", "Expected KEY=VALUE, got '{value}'"),
    ("operations.header", "Registered operations ({count}):"),
    ("operations.entry", "{name}\t{command}\t{params}"),
    ("operations.json_failed", "Failed to encode operations: {error}"),
    ("exec.failed", "Command failed: {error}"),
    ("exec.failed_classified", "Command failed on attempt {attempt} ({code}): {error}"),
    ("exec.metadata_empty", "Metadata lookup returned no entries"),
];

/// Returns the message catalog as a lookup map.
pub(crate) fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG_MAP.get_or_init(|| CATALOG.iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Looks up `key` and substitutes `args` into its placeholders.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================
