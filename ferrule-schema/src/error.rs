//! Error types for schema flattening, lookup and configuration.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while building or looking up schemas.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(ferrule::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A field that stores data has no name.
    #[error("unnamed {kind} field in `{schema}`")]
    #[diagnostic(
        code(ferrule::schema::unnamed_field),
        help("only groups, tabs, collapsibles and rows may be left unnamed")
    )]
    UnnamedField { schema: String, kind: String },

    /// Invalid field definition.
    #[error("invalid field `{schema}.{field}`: {message}")]
    #[diagnostic(code(ferrule::schema::invalid_field))]
    InvalidField {
        schema: String,
        field: String,
        message: String,
    },

    /// Two sibling fields resolve to the same path.
    #[error("duplicate field path `{path}` in `{schema}`")]
    #[diagnostic(code(ferrule::schema::duplicate))]
    Duplicate { schema: String, path: String },

    /// No schema registered for a collection or global.
    #[error("unknown {kind} `{slug}`")]
    #[diagnostic(code(ferrule::schema::unknown_target))]
    UnknownTarget { kind: String, slug: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(ferrule::schema::config_error))]
    ConfigError { message: String },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(ferrule::schema::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },
}

impl SchemaError {
    /// Create an unnamed field error.
    pub fn unnamed(schema: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnnamedField {
            schema: schema.into(),
            kind: kind.into(),
        }
    }

    /// Create an invalid field error.
    pub fn invalid_field(
        schema: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            schema: schema.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate path error.
    pub fn duplicate(schema: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Duplicate {
            schema: schema.into(),
            path: path.into(),
        }
    }

    /// Create an unknown collection or global error.
    pub fn unknown_target(kind: impl Into<String>, slug: impl Into<String>) -> Self {
        Self::UnknownTarget {
            kind: kind.into(),
            slug: slug.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Check if this error means the requested schema does not exist.
    pub fn is_unknown_target(&self) -> bool {
        matches!(self, Self::UnknownTarget { .. })
    }
}

#[cfg(test)]
#[allow(unused_assignments)]
mod tests {
    use super::*;

    #[test]
    fn test_unnamed_field_display() {
        let err = SchemaError::unnamed("posts", "text");
        let display = err.to_string();
        assert!(display.contains("posts"));
        assert!(display.contains("text"));
    }

    #[test]
    fn test_duplicate_display() {
        let err = SchemaError::duplicate("posts", "meta.title");
        assert_eq!(
            err.to_string(),
            "duplicate field path `meta.title` in `posts`"
        );
    }

    #[test]
    fn test_unknown_target() {
        let err = SchemaError::unknown_target("collection", "authors");
        assert!(err.is_unknown_target());
        assert_eq!(err.to_string(), "unknown collection `authors`");

        let err = SchemaError::config("bad locale");
        assert!(!err.is_unknown_target());
    }

    #[test]
    fn test_invalid_field_fields() {
        let err = SchemaError::invalid_field("pages", "layout", "blocks need at least one block");

        match err {
            SchemaError::InvalidField {
                schema,
                field,
                message,
            } => {
                assert_eq!(schema, "pages");
                assert_eq!(field, "layout");
                assert!(message.contains("block"));
            }
            _ => panic!("Expected InvalidField"),
        }
    }

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SchemaError::IoError {
            path: "ferrule.toml".to_string(),
            source: io_err,
        };

        assert!(err.to_string().contains("ferrule.toml"));
    }
}
