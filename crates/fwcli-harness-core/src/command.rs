// crates/fwcli-harness-core/src/command.rs
// ============================================================================
// Module: Firewall CLI Commands
// Description: Immutable command strings and free-form key/value arguments.
// Purpose: Model what callers hand to the executor and how values are quoted.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`Command`] is an opaque, immutable instruction for the remote CLI: a
//! base command followed by space-delimited `-flagName value` pairs. Values
//! containing spaces or separator characters must be wrapped in double quotes
//! before they reach the executor; [`quote_if_needed`] applies that rule and
//! [`Command::tokens`] reverses it when a transport needs an argument vector.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Characters that force a value to be wrapped in double quotes.
const QUOTE_TRIGGERS: &[char] = &[' ', '"', '\'', ':', '{', '}', '\\', '='];

// ============================================================================
// SECTION: Command
// ============================================================================

/// Opaque command string for the remote CLI.
///
/// # Invariants
/// - The text is never modified after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Command(String);

impl Command {
    /// Wraps a pre-formatted command string.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the raw command text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the base command (first whitespace-delimited word), if any.
    #[must_use]
    pub fn base(&self) -> Option<&str> {
        self.0.split_whitespace().next()
    }

    /// Splits the command into argument tokens, honoring double quotes.
    ///
    /// Inside quotes, `\"` and `\\` are unescaped; every other character is
    /// taken literally.
    ///
    /// # Errors
    ///
    /// Returns [`CommandParseError`] when the command is blank or a quote is
    /// left open.
    pub fn tokens(&self) -> Result<Vec<String>, CommandParseError> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut has_token = false;
        let mut in_quotes = false;
        let mut chars = self.0.chars();
        while let Some(ch) = chars.next() {
            if in_quotes {
                match ch {
                    '"' => in_quotes = false,
                    '\\' => match chars.next() {
                        Some(next @ ('"' | '\\')) => current.push(next),
                        Some(next) => {
                            current.push('\\');
                            current.push(next);
                        }
                        None => return Err(CommandParseError::UnterminatedQuote),
                    },
                    _ => current.push(ch),
                }
                continue;
            }
            match ch {
                '"' => {
                    in_quotes = true;
                    has_token = true;
                }
                ch if ch.is_whitespace() => {
                    if has_token {
                        tokens.push(std::mem::take(&mut current));
                        has_token = false;
                    }
                }
                _ => {
                    current.push(ch);
                    has_token = true;
                }
            }
        }
        if in_quotes {
            return Err(CommandParseError::UnterminatedQuote);
        }
        if has_token {
            tokens.push(current);
        }
        if tokens.is_empty() {
            return Err(CommandParseError::Empty);
        }
        Ok(tokens)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Command {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Command {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Errors raised while tokenizing a command string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    /// The command contained no tokens.
    #[error("command is empty")]
    Empty,
    /// A double-quoted value was not closed.
    #[error("command has an unterminated quoted value")]
    UnterminatedQuote,
}

// ============================================================================
// SECTION: Quoting
// ============================================================================

/// Wraps a value in double quotes when it contains a space or separator.
///
/// Embedded `"` and `\` are escaped so [`Command::tokens`] restores the
/// original value. Empty values become `""`.
#[must_use]
pub fn quote_if_needed(value: &str) -> String {
    if !value.is_empty() && !value.contains(QUOTE_TRIGGERS) {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

// ============================================================================
// SECTION: Arguments
// ============================================================================

/// Free-form argument value supplied for an operation parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// Text value, quoted on render when needed.
    Text(String),
    /// Integer value.
    Number(i64),
    /// Presence flag; rendered as the bare flag when true.
    Flag(bool),
}

impl ArgValue {
    /// Interprets a raw `key=value` right-hand side as the most specific value.
    #[must_use]
    pub fn parse_loose(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            return Self::Flag(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Flag(false);
        }
        raw.parse::<i64>().map_or_else(|_| Self::Text(raw.to_string()), Self::Number)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Ordered key/value argument set for a single operation call.
///
/// # Invariants
/// - Keys are unique; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    /// Entries in insertion order.
    entries: Vec<(String, ArgValue)>,
}

impl CommandArgs {
    /// Creates an empty argument set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces an argument.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ArgValue>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Returns the value bound to `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.entries.iter().find(|(existing, _)| existing == key).map(|(_, value)| value)
    }

    /// Iterates over argument keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Returns the number of arguments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no arguments are set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
