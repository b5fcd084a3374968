//! Error types for rule parsing, input validation and configuration.

use std::fmt;

use thiserror::Error;

/// Category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// Unbalanced brackets, empty atoms, stray characters.
    Lexical,
    /// Structural problems such as a missing `>` or focus marker.
    Syntax,
    /// Well-formed text that does not describe a usable rule
    /// (backreferences out of range, mismatched correspondence sets).
    Semantic,
    /// Unknown graphemes, sound classes or feature names.
    Phonological,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseErrorKind::Lexical => "lexical",
            ParseErrorKind::Syntax => "syntax",
            ParseErrorKind::Semantic => "semantic",
            ParseErrorKind::Phonological => "phonological",
        };
        f.write_str(name)
    }
}

/// Structured failure produced while parsing a rule or a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error at position {position}: {message}{}", format_suggestions(.suggestions))]
pub struct ParseError {
    /// Error category.
    pub kind: ParseErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Character offset into the parsed text.
    pub position: usize,
    /// Possible corrections, most relevant first.
    pub suggestions: Vec<String>,
}

impl ParseError {
    /// Create an error without suggestions.
    pub fn new(kind: ParseErrorKind, position: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
            suggestions: Vec::new(),
        }
    }

    /// Attach suggestions to the error.
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

/// Errors raised while loading an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for the expected schema.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// A value is outside its allowed range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Top-level error type of the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Rule or sequence text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// An argument passed to a public entry point violates its contract.
    ///
    /// Raised before any work is done, so no partial result exists.
    #[error("invalid `{parameter}`: found {found}; {suggestion}")]
    Validation {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// What was actually received.
        found: String,
        /// How to fix the call.
        suggestion: String,
    },

    /// Engine configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    pub(crate) fn validation(
        parameter: &'static str,
        found: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Error::Validation {
            parameter,
            found: found.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// A specialized `Result` type for sound change operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_with_suggestions() {
        let err = ParseError::new(ParseErrorKind::Phonological, 4, "unknown grapheme `q̃`")
            .with_suggestions(vec!["q".to_string(), "ɢ".to_string()]);
        let text = err.to_string();
        assert!(text.starts_with("phonological error at position 4"));
        assert!(text.ends_with("(did you mean: q, ɢ?)"));
    }

    #[test]
    fn test_parse_error_display_without_suggestions() {
        let err = ParseError::new(ParseErrorKind::Syntax, 0, "missing `>`");
        assert_eq!(err.to_string(), "syntax error at position 0: missing `>`");
    }

    #[test]
    fn test_validation_error_names_parameter() {
        let err = Error::validation("strength", "NaN", "pass a value in [0, 1]");
        assert_eq!(
            err.to_string(),
            "invalid `strength`: found NaN; pass a value in [0, 1]"
        );
    }

    #[test]
    fn test_parse_error_converts_into_error() {
        let err: Error = ParseError::new(ParseErrorKind::Lexical, 2, "unclosed `{`").into();
        assert!(matches!(err, Error::Parse(ref p) if p.kind == ParseErrorKind::Lexical));
    }
}
