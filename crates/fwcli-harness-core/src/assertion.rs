// crates/fwcli-harness-core/src/assertion.rs
// ============================================================================
// Module: Canonical Output Assertions
// Description: Exact-equality checks and expected-output sample helpers.
// Purpose: Surface mismatches with both strings and the first differing line.
// Dependencies: thiserror, crate::canonical
// ============================================================================

//! ## Overview
//! A mismatch between canonical output and an expected literal is the normal
//! test-failure path. [`expect_canonical`] reports it as an
//! [`OutputMismatch`] carrying both strings so callers can diff them.
//! [`Sample`] builds expected literals from indented multi-line text with
//! `%s` placeholders.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::canonical::CanonicalOutput;

// ============================================================================
// SECTION: Mismatch
// ============================================================================

/// Canonical output differed from the expected literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("canonical output mismatch at line {line}\n--- expected\n{expected}\n--- actual\n{actual}")]
pub struct OutputMismatch {
    /// Expected literal.
    pub expected: String,
    /// Actual canonical text.
    pub actual: String,
    /// One-based number of the first differing line.
    pub line: usize,
}

/// Compares canonical output with an expected literal.
///
/// # Errors
///
/// Returns [`OutputMismatch`] when the strings differ.
pub fn expect_canonical(actual: &CanonicalOutput, expected: &str) -> Result<(), OutputMismatch> {
    if actual == expected {
        return Ok(());
    }
    Err(OutputMismatch {
        expected: expected.to_string(),
        actual: actual.to_string(),
        line: first_differing_line(expected, actual.as_str()),
    })
}

/// Returns the one-based line where `a` and `b` first diverge.
fn first_differing_line(a: &str, b: &str) -> usize {
    let mut left = a.split_inclusive('\n');
    let mut right = b.split_inclusive('\n');
    let mut line = 1;
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) if x == y => line += 1,
            _ => return line,
        }
    }
}

// ============================================================================
// SECTION: Samples
// ============================================================================

/// Placeholder substitution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// The number of arguments does not match the placeholders.
    #[error("sample has {placeholders} placeholder(s) but {supplied} argument(s) were supplied")]
    ArgumentCount {
        /// Placeholders in the sample.
        placeholders: usize,
        /// Arguments supplied.
        supplied: usize,
    },
}

/// Expected-output template.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sample(String);

impl Sample {
    /// Wraps text verbatim.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Removes the whitespace prefix common to every non-blank line.
    ///
    /// Lines holding only whitespace are reduced to their terminator and do
    /// not take part in the prefix computation.
    #[must_use]
    pub fn dedent(text: &str) -> Self {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut margin: Option<&str> = None;
        for line in &lines {
            if is_blank(line) {
                continue;
            }
            let indent = leading_whitespace(line);
            margin = Some(match margin {
                None => indent,
                Some(current) => common_prefix(current, indent),
            });
        }
        let margin = margin.unwrap_or("");
        let mut out = String::with_capacity(text.len());
        for line in lines {
            if is_blank(line) {
                if line.ends_with('\n') {
                    out.push('\n');
                }
            } else {
                out.push_str(line.strip_prefix(margin).unwrap_or(line));
            }
        }
        Self(out)
    }

    /// Returns the template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number of `%s` placeholders.
    #[must_use]
    pub fn placeholders(&self) -> usize {
        let mut count = 0;
        let mut chars = self.0.chars();
        while let Some(ch) = chars.next() {
            if ch == '%' {
                match chars.next() {
                    Some('s') => count += 1,
                    Some(_) | None => {}
                }
            }
        }
        count
    }

    /// Substitutes `%s` placeholders in order; `%%` yields a literal `%`.
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::ArgumentCount`] unless exactly one argument is
    /// supplied per placeholder.
    pub fn fill<S: AsRef<str>>(&self, args: &[S]) -> Result<String, SampleError> {
        let placeholders = self.placeholders();
        if placeholders != args.len() {
            return Err(SampleError::ArgumentCount {
                placeholders,
                supplied: args.len(),
            });
        }
        let mut values = args.iter();
        let mut out = String::with_capacity(self.0.len());
        let mut chars = self.0.chars();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('s') => {
                    if let Some(value) = values.next() {
                        out.push_str(value.as_ref());
                    }
                }
                Some('%') => out.push('%'),
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true for lines holding only spaces, tabs, and a terminator.
fn is_blank(line: &str) -> bool {
    line.trim_matches(|ch| matches!(ch, ' ' | '\t' | '\n' | '\r')).is_empty()
}

/// Returns the leading run of spaces and tabs.
fn leading_whitespace(line: &str) -> &str {
    let end = line.find(|ch| !matches!(ch, ' ' | '\t')).unwrap_or(line.len());
    &line[..end]
}

/// Returns the longest shared prefix of two whitespace runs.
fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let end = a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count();
    &a[..end]
}

// ============================================================================
// SECTION: Tests
// ============================================================================
