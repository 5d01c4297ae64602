//! Module for structuring the author-supplied directive block
//!
//! A [`DirectiveInvocation`] is built once per embedded block by the host's
//! directive parser and consumed by one [`crate::SqlTableDirective`] run. It
//! also provides the option-value converters the host wires into the block's
//! option table (`widths`, `class`).
use core::fmt;
use std::error;

/// One parsed `sqltable` block: options, optional title argument, body lines
/// (the query text), and the source location used for error reporting.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirectiveInvocation {
    title: Option<String>,
    widths: Option<Vec<u32>>,
    classes: Vec<String>,
    name: Option<String>,
    connection_string: Option<String>,
    body: Vec<String>,
    line: u64,
    block_text: String,
}

impl DirectiveInvocation {
    /// Creates a builder for an invocation located at `line` with the raw
    /// `block_text` of the whole directive block.
    pub fn builder(block_text: impl Into<String>, line: u64) -> InvocationBuilder {
        InvocationBuilder {
            invocation: Self {
                title: None,
                widths: None,
                classes: Vec::new(),
                name: None,
                connection_string: None,
                body: Vec::new(),
                line,
                block_text: block_text.into(),
            },
        }
    }

    /// Getter for the optional title argument
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Getter for the explicit `widths` option
    #[must_use]
    pub fn widths(&self) -> Option<&[u32]> {
        self.widths.as_deref()
    }

    /// Getter for the `class` option values
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Getter for the `name` (anchor) option
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Getter for the per-block `connection_string` option
    #[must_use]
    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string.as_deref()
    }

    /// Getter for the body lines in source order
    #[must_use]
    pub fn body_lines(&self) -> &[String] {
        &self.body
    }

    /// Getter for the source line number of the block
    #[must_use]
    pub const fn line(&self) -> u64 {
        self.line
    }

    /// Getter for the raw text of the whole block
    #[must_use]
    pub fn block_text(&self) -> &str {
        &self.block_text
    }

    /// Returns the body joined with newlines into one query string.
    #[must_use]
    pub fn query_text(&self) -> String {
        self.body.join("\n")
    }

    /// Returns `true` if the body contains any non-blank line.
    #[must_use]
    pub fn has_query(&self) -> bool {
        self.body.iter().any(|line| !line.trim().is_empty())
    }
}

/// Builder for [`DirectiveInvocation`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvocationBuilder {
    invocation: DirectiveInvocation,
}

impl InvocationBuilder {
    /// Sets the title argument of the block.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.invocation.title = Some(title.into());
        self
    }

    /// Sets the explicit `widths` option.
    #[must_use]
    pub fn widths(mut self, widths: Vec<u32>) -> Self {
        self.invocation.widths = Some(widths);
        self
    }

    /// Sets the `class` option values.
    #[must_use]
    pub fn classes<I>(mut self, classes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.invocation.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the `name` (anchor) option.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.invocation.name = Some(name.into());
        self
    }

    /// Sets the per-block `connection_string` option.
    #[must_use]
    pub fn connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.invocation.connection_string = Some(connection_string.into());
        self
    }

    /// Appends one body line.
    #[must_use]
    pub fn body_line(mut self, line: impl Into<String>) -> Self {
        self.invocation.body.push(line.into());
        self
    }

    /// Replaces the body with the given lines.
    #[must_use]
    pub fn body<I>(mut self, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.invocation.body = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> DirectiveInvocation {
        self.invocation
    }
}

/// Error enum for rejecting malformed option values
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OptionError {
    /// The option value was empty where a value is required
    Empty,
    /// A token could not be read as a positive integer
    NotAPositiveInteger {
        /// The offending token
        token: String,
    },
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "option value is empty"),
            Self::NotAPositiveInteger { token } => {
                write!(f, "{token:?} is not a positive integer")
            }
        }
    }
}

impl error::Error for OptionError {}

/// Converts a `widths` option value into a list of positive integers.
///
/// Tokens may be separated by commas or by whitespace, matching the host's
/// positive-int-list converter.
///
/// # Errors
/// - [`OptionError::Empty`] if the value holds no tokens
/// - [`OptionError::NotAPositiveInteger`] if any token is zero or non-numeric
pub fn positive_int_list(value: &str) -> Result<Vec<u32>, OptionError> {
    let tokens: Vec<&str> = if value.contains(',') {
        value.split(',').map(str::trim).filter(|t| !t.is_empty()).collect()
    } else {
        value.split_whitespace().collect()
    };
    if tokens.is_empty() {
        return Err(OptionError::Empty);
    }
    tokens
        .into_iter()
        .map(|token| match token.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(OptionError::NotAPositiveInteger { token: token.to_owned() }),
        })
        .collect()
}

/// Converts a `class` option value into a list of normalized class names.
///
/// Names are whitespace-separated; each is passed through [`normalize_name`].
/// An empty value yields an empty list.
#[must_use]
pub fn class_option(value: &str) -> Vec<String> {
    value.split_whitespace().map(normalize_name).collect()
}

/// Normalizes an anchor or class name the way the host normalizes
/// identifiers: lowercased, runs of non-alphanumeric characters collapsed to
/// a single `-`, leading and trailing `-` removed.
#[must_use]
pub fn normalize_name(value: &str) -> String {
    let mut normalized = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !normalized.is_empty() {
                normalized.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                normalized.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }
    normalized
}
