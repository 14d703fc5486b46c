// crates/fwcli-harness-core/src/canonical.rs
// ============================================================================
// Module: Output Canonicalizer
// Description: Reduces raw CLI output to a deterministic comparison string.
// Purpose: Strip volatile fields so outputs compare exactly across runs.
// Dependencies: regex, thiserror
// ============================================================================

//! ## Overview
//! The firewall CLI prints identifiers, timestamps, host names, and proxy
//! annotations that differ between runs. [`Canonicalizer::canonicalize`]
//! applies a fixed per-line pipeline:
//!
//! 1. trailing spaces before the line terminator are cut;
//! 2. the line is dropped when any suppression rule matches;
//! 3. otherwise every rewrite rule is applied until it no longer matches,
//!    and spaces left before the terminator are cut again;
//! 4. surviving lines are concatenated without a separator.
//!
//! Canonical text is a fixed point of the pipeline with one exception:
//! suppression is decided before rewriting, so a rewrite that exposes a
//! suppressed shape (`ID (remote) : 42` becoming `ID : 42`) keeps the line on
//! the first pass and drops it on the second.
//!
//! Security posture: output text is untrusted; all patterns are compiled
//! once and extra labels are regex-escaped before compilation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use regex::Regex;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Field labels whose lines are always suppressed, in evaluation order.
pub const SUPPRESSED_LABELS: &[&str] = &[
    "Database Type",
    "Instance Type",
    "SYSDBA",
    "Host FQDN",
    "Kerberos Realm",
    "Database",
    "Instance",
    "Backend",
    "ID",
    "Start Date",
    "Active up to",
    "Starting Time",
    "Ending Time",
    "Row Delimiter",
    "Column Delimiter",
    "Quote",
    "Instance not found",
];

/// Trailing run of spaces before a line terminator.
const TRAILING_SPACES: &str = " +\n";
/// Date-time stamp such as `2024-01-31 12:00:05`.
const DATE_PATTERN: &str = r"(\d+-)+\d+\s(\d+:)+\d+";
/// Tag name line such as `Name      : ds::audit`.
const TAG_NAME_PATTERN: &str = r"Name( *): ds::(\w+)";
/// Tag value line such as `Value     : enabled`.
const TAG_VALUE_PATTERN: &str = r"Value( *): (\w+)";
/// Parenthesized proxy annotation such as ` (local)`.
const PROXY_PATTERN: &str = r" \((.*?)\)";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Canonicalizer construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalizeError {
    /// A pattern failed to compile.
    #[error("invalid canonicalization pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// Pattern source text.
        pattern: String,
        /// Compiler diagnostic.
        message: String,
    },
    /// An extra suppression label was empty.
    #[error("suppressed label must not be empty")]
    EmptyLabel,
}

// ============================================================================
// SECTION: Options
// ============================================================================

/// Optional normalization passes, all disabled by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanonicalizeOptions {
    /// Drop lines containing a date-time stamp.
    pub skip_date: bool,
    /// Remove parenthesized proxy annotations.
    pub cut_proxy: bool,
    /// Drop `ds::` tag name lines and tag value lines.
    pub skip_tags: bool,
}

impl CanonicalizeOptions {
    /// Returns options with every optional pass disabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            skip_date: false,
            cut_proxy: false,
            skip_tags: false,
        }
    }

    /// Sets the date suppression pass.
    #[must_use]
    pub const fn with_skip_date(mut self, enabled: bool) -> Self {
        self.skip_date = enabled;
        self
    }

    /// Sets the proxy annotation rewrite pass.
    #[must_use]
    pub const fn with_cut_proxy(mut self, enabled: bool) -> Self {
        self.cut_proxy = enabled;
        self
    }

    /// Sets the tag suppression pass.
    #[must_use]
    pub const fn with_skip_tags(mut self, enabled: bool) -> Self {
        self.skip_tags = enabled;
        self
    }
}

// ============================================================================
// SECTION: Rules
// ============================================================================

/// One compiled normalization rule.
#[derive(Debug, Clone)]
pub enum NormalizationRule {
    /// Drop the whole line when the pattern matches anywhere in it.
    Suppress(Regex),
    /// Delete every match of the pattern from the line.
    Rewrite(Regex),
}

impl NormalizationRule {
    /// Returns the compiled pattern.
    #[must_use]
    pub const fn pattern(&self) -> &Regex {
        match self {
            Self::Suppress(pattern) | Self::Rewrite(pattern) => pattern,
        }
    }

    /// Returns true for suppression rules.
    #[must_use]
    pub const fn is_suppression(&self) -> bool {
        matches!(self, Self::Suppress(_))
    }
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Canonical comparison string produced by [`Canonicalizer::canonicalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CanonicalOutput(String);

impl CanonicalOutput {
    /// Returns the canonical text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the value and returns the canonical text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns true when every line was suppressed or the input was empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for CanonicalOutput {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CanonicalOutput {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ============================================================================
// SECTION: Canonicalizer
// ============================================================================

/// Compiled canonicalization pipeline.
///
/// # Invariants
/// - Label rules keep the built-in order; configured labels follow them.
/// - Suppression is always evaluated before rewriting.
/// - Rewritten lines contain no further rewrite match and no spaces before
///   the terminator.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    /// Trailing-space cutter.
    trailing: Regex,
    /// Label suppression rules.
    labels: Vec<NormalizationRule>,
    /// Date suppression rule.
    date: NormalizationRule,
    /// Tag suppression rules.
    tags: Vec<NormalizationRule>,
    /// Proxy annotation rewrite rule.
    proxy: NormalizationRule,
}

impl Canonicalizer {
    /// Compiles the built-in pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizeError::InvalidPattern`] if a built-in pattern
    /// fails to compile.
    pub fn new() -> Result<Self, CanonicalizeError> {
        let labels = SUPPRESSED_LABELS
            .iter()
            .map(|label| compile(&label_pattern(label)).map(NormalizationRule::Suppress))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            trailing: compile(TRAILING_SPACES)?,
            labels,
            date: NormalizationRule::Suppress(compile(DATE_PATTERN)?),
            tags: vec![
                NormalizationRule::Suppress(compile(TAG_NAME_PATTERN)?),
                NormalizationRule::Suppress(compile(TAG_VALUE_PATTERN)?),
            ],
            proxy: NormalizationRule::Rewrite(compile(PROXY_PATTERN)?),
        })
    }

    /// Appends extra suppression labels after the built-in ones.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizeError::EmptyLabel`] for blank labels.
    pub fn with_extra_labels<S: AsRef<str>>(mut self, labels: &[S]) -> Result<Self, CanonicalizeError> {
        for label in labels {
            let label = label.as_ref();
            if label.trim().is_empty() {
                return Err(CanonicalizeError::EmptyLabel);
            }
            let pattern = label_pattern(&regex::escape(label));
            self.labels.push(NormalizationRule::Suppress(compile(&pattern)?));
        }
        Ok(self)
    }

    /// Returns the number of label suppression rules.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Returns the active rules in evaluation order.
    #[must_use]
    pub fn rules(&self, options: CanonicalizeOptions) -> Vec<&NormalizationRule> {
        let mut rules: Vec<&NormalizationRule> = self.labels.iter().collect();
        if options.skip_date {
            rules.push(&self.date);
        }
        if options.skip_tags {
            rules.extend(self.tags.iter());
        }
        if options.cut_proxy {
            rules.push(&self.proxy);
        }
        rules
    }

    /// Canonicalizes raw output lines.
    ///
    /// Lines are expected to carry their own terminators; the result joins
    /// surviving lines with no separator.
    #[must_use]
    pub fn canonicalize<S: AsRef<str>>(&self, lines: &[S], options: CanonicalizeOptions) -> CanonicalOutput {
        let rules = self.rules(options);
        let mut out = String::new();
        for raw in lines {
            if let Some(line) = self.normalize_line(raw.as_ref(), &rules) {
                out.push_str(&line);
            }
        }
        CanonicalOutput(out)
    }

    /// Canonicalizes a block of text split on `\n`, keeping terminators.
    #[must_use]
    pub fn canonicalize_text(&self, text: &str, options: CanonicalizeOptions) -> CanonicalOutput {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        self.canonicalize(&lines, options)
    }

    /// Runs the pipeline on one line; `None` means the line is dropped.
    fn normalize_line(&self, raw: &str, rules: &[&NormalizationRule]) -> Option<String> {
        let cut = self.trailing.replace_all(raw, "\n");
        if rules.iter().any(|rule| rule.is_suppression() && rule.pattern().is_match(&cut)) {
            return None;
        }
        let mut line = cut.into_owned();
        for rule in rules.iter().filter(|rule| !rule.is_suppression()) {
            while rule.pattern().is_match(&line) {
                line = rule.pattern().replace_all(&line, "").into_owned();
            }
        }
        Some(self.trailing.replace_all(&line, "\n").into_owned())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the `<label>( +):` suppression shape.
fn label_pattern(label: &str) -> String {
    format!("{label}( +):")
}

/// Compiles a pattern, mapping failures into [`CanonicalizeError`].
fn compile(pattern: &str) -> Result<Regex, CanonicalizeError> {
    Regex::new(pattern).map_err(|err| CanonicalizeError::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
