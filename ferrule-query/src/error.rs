//! Error types for Where-clause compilation.
//!
//! Compilation is best-effort: malformed conditions are dropped, not
//! reported. The errors here cover the failures that abort a whole call:
//! a missing or invalid schema, a failed relationship subquery, a bad
//! configuration file or an unparsable typed Where clause.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: F{category}{number}
//! - 2xxx: Schema errors (unknown collection, invalid definition)
//! - 3xxx: Lookup errors (relationship subqueries)
//! - 6xxx: Data errors (deserialization)
//! - 7xxx: Configuration errors
//!
//! ```rust
//! use ferrule_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::unknown_target("collection", "posts");
//! assert_eq!(err.code, ErrorCode::UnknownTarget);
//! assert_eq!(err.code.code(), "F2002");
//! assert!(err.to_string().contains("posts"));
//! ```

use std::fmt;

use ferrule_schema::SchemaError;
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Schema errors (2xxx)
    /// Unknown collection or global (F2002).
    UnknownTarget = 2002,
    /// Invalid schema definition (F2003).
    InvalidSchema = 2003,

    // Lookup errors (3xxx)
    /// Relationship subquery failed (F3001).
    LookupFailed = 3001,

    // Data errors (6xxx)
    /// Deserialization error (F6003).
    DeserializationError = 6003,

    // Configuration errors (7xxx)
    /// Invalid configuration (F7001).
    InvalidConfiguration = 7001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "F2002").
    pub fn code(&self) -> String {
        format!("F{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::UnknownTarget => "Unknown collection or global",
            Self::InvalidSchema => "Invalid schema definition",
            Self::LookupFailed => "Relationship lookup failed",
            Self::DeserializationError => "Deserialization error",
            Self::InvalidConfiguration => "Invalid configuration",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The collection or global involved.
    pub target: Option<String>,
    /// The logical field path involved.
    pub path: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that abort a compilation.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Set the collection or global.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.context.target = Some(target.into());
        self
    }

    /// Set the logical field path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.context.path = Some(path.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create an unknown collection/global error.
    pub fn unknown_target(kind: &str, slug: &str) -> Self {
        Self::new(ErrorCode::UnknownTarget, format!("Unknown {kind} `{slug}`"))
            .with_target(format!("{kind}:{slug}"))
            .with_suggestion(format!("Register the `{slug}` schema with the schema provider"))
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidSchema, message)
    }

    /// Create a relationship lookup error.
    pub fn lookup(collection: impl Into<String>, message: impl Into<String>) -> Self {
        let collection = collection.into();
        Self::new(
            ErrorCode::LookupFailed,
            format!("Relationship lookup on `{collection}` failed: {}", message.into()),
        )
        .with_target(format!("collection:{collection}"))
    }

    /// Create a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DeserializationError, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
            .with_help("See the [localization], [query] and [debug] sections of ferrule.toml")
    }

    // ============== Error Checks ==============

    /// Check if the schema for a target was missing or invalid.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::UnknownTarget | ErrorCode::InvalidSchema
        )
    }

    /// Check if a relationship subquery failed.
    pub fn is_lookup_error(&self) -> bool {
        self.code == ErrorCode::LookupFailed
    }

    // ============== Display Functions ==============

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = format!("Error [{}]: {}\n", self.code.code(), self.message);

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref target) = self.context.target {
            output.push_str(&format!("  → Target: {}\n", target));
        }
        if let Some(ref path) = self.context.path {
            output.push_str(&format!("  → Path: {}\n", path));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

impl From<SchemaError> for QueryError {
    fn from(err: SchemaError) -> Self {
        let base = match &err {
            SchemaError::UnknownTarget { kind, slug } => Self::unknown_target(kind, slug),
            SchemaError::ConfigError { .. } | SchemaError::TomlError { .. } | SchemaError::IoError { .. } => {
                Self::configuration(err.to_string())
            }
            _ => Self::schema(err.to_string()),
        };
        base.with_source(err)
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::deserialization(err.to_string()).with_source(err)
    }
}
