//! Error types for the Trogdor compiler.
//!
//! Uses `thiserror` for ergonomic error definition. Every phase of a
//! compilation (lexing, parsing, validation, execution) reports through the
//! same [`Error`] so callers only ever handle one type.

use std::fmt;

use thiserror::Error;

use crate::types::EntityType;

/// The main error type for Trogdor operations.
#[derive(Debug, Error)]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Stamps the name of the file being compiled onto this error,
    /// keeping any line already recorded in the context.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_filename(filename));
        self
    }

    /// Records the source line in this error's context.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_line(line));
        self
    }

    /// Creates a lexical error.
    #[must_use]
    pub fn lex(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Lex {
            message: message.into(),
            line,
        })
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Parse {
            message: message.into(),
            line,
        })
    }

    /// Creates a validation error for an operation on the given line.
    #[must_use]
    pub fn validation(message: impl Into<String>, line: usize) -> Self {
        Self::new(ErrorKind::Validation {
            message: message.into(),
            line,
        })
    }

    /// Creates an internal error. These indicate a defect in the compiler
    /// wiring rather than a problem with the game definition.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Creates an I/O error for the given path.
    #[must_use]
    pub fn io(path: impl Into<String>, source: &std::io::Error) -> Self {
        Self::new(ErrorKind::Io {
            path: path.into(),
            message: source.to_string(),
        })
    }

    /// Returns true for lexical and parse errors.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Lex { .. } | ErrorKind::Parse { .. } | ErrorKind::UnresolvedReferences(_)
        )
    }

    /// Returns true for validation errors, including a missing start room.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Validation { .. } | ErrorKind::NoStartRoom
        )
    }

    /// Returns true for internal errors.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self.kind, ErrorKind::Internal(_))
    }

    /// Returns the 1-based source line this error points at, if known.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match &self.kind {
            ErrorKind::Lex { line, .. }
            | ErrorKind::Parse { line, .. }
            | ErrorKind::Validation { line, .. } => Some(*line),
            _ => self.context.as_ref().and_then(|ctx| ctx.line),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            if context.filename.is_some() || context.line.is_some() {
                write!(f, "{context}: ")?;
            }
        }
        write!(f, "{}", self.kind)
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Source text could not be tokenized.
    #[error("lex error on line {line}: {message}")]
    Lex {
        /// Description of the problem.
        message: String,
        /// Line number (1-indexed).
        line: usize,
    },

    /// Source text is not grammatical, or contradicts itself.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// Description of the problem.
        message: String,
        /// Line number (1-indexed).
        line: usize,
    },

    /// One or more entities were referenced but never declared.
    #[error("{}", describe_unresolved(.0))]
    UnresolvedReferences(Vec<UnresolvedName>),

    /// An operation failed its pre-execution check.
    #[error("validation error on line {line}: {message}")]
    Validation {
        /// Description of the problem.
        message: String,
        /// Line of the operation being validated.
        line: usize,
    },

    /// The game has no room named `start`.
    #[error("game must contain a room named \"start\" where new players begin")]
    NoStartRoom,

    /// A source or script file could not be read.
    #[error("could not read {path}: {message}")]
    Io {
        /// The path that failed.
        path: String,
        /// The underlying I/O message.
        message: String,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// An entity name that was used but never declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedName {
    /// The referenced name.
    pub name: String,
    /// The type the name was referenced as.
    pub entity_type: EntityType,
    /// Every line that referenced the name, in source order.
    pub lines: Vec<usize>,
}

fn describe_unresolved(names: &[UnresolvedName]) -> String {
    let mut out = String::from("undeclared entities were referenced:");
    for unresolved in names {
        let lines = unresolved
            .lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "\n  {} \"{}\" on line(s) {lines}",
            unresolved.entity_type, unresolved.name
        ));
    }
    out
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The file being compiled.
    pub filename: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filename.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the line.
    #[must_use]
    pub const fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.filename, self.line) {
            (Some(filename), Some(line)) => write!(f, "{filename}:{line}"),
            (Some(filename), None) => write!(f, "{filename}"),
            (None, Some(line)) => write!(f, "line {line}"),
            (None, None) => Ok(()),
        }
    }
}

/// Result type alias using the Trogdor error type.
pub type Result<T> = std::result::Result<T, Error>;
