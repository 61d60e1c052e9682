//! Error types for the browser library.

use thiserror::Error;

/// Exit code for configuration errors (bad arguments, no database found).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for selection/validation errors.
pub const EXIT_VALIDATION_ERROR: u8 = 2;
/// Exit code for operations the browser refuses to perform.
pub const EXIT_UNSUPPORTED: u8 = 3;
/// Exit code for metadata read failures.
pub const EXIT_SCHEMA_ERROR: u8 = 4;
/// Exit code when the selected row cannot be identified.
pub const EXIT_IDENTIFIER_ERROR: u8 = 5;
/// Exit code for failed INSERT/UPDATE/DELETE/DROP statements.
pub const EXIT_ENGINE_ERROR: u8 = 6;
/// Exit code for file system errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for browser operations.
#[derive(Error, Debug)]
pub enum BrowseError {
    /// Empty or out-of-range selection, or no table selected.
    #[error("{0}")]
    Validation(String),

    /// The requested operation is not supported for this object.
    #[error("{0}")]
    Unsupported(String),

    /// Engine failure while reading metadata.
    #[error("Schema error ({context}): {source}")]
    Schema {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The named table or view does not exist.
    #[error("Schema error: no such table or view: {0}")]
    SchemaMissing(String),

    /// The current row has neither a primary key nor an implicit row id.
    #[error("{0}")]
    Identifier(String),

    /// Engine failure during a mutating statement.
    #[error("{operation} error: {source}")]
    Engine {
        operation: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Configuration error (missing database path, bad flags).
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BrowseError {
    /// Create a Schema error naming the metadata probe that failed.
    pub fn schema(context: impl Into<String>, source: rusqlite::Error) -> Self {
        BrowseError::Schema {
            context: context.into(),
            source,
        }
    }

    /// Create an Engine error labelled with the operation that failed.
    pub fn engine(operation: impl Into<String>, source: rusqlite::Error) -> Self {
        BrowseError::Engine {
            operation: operation.into(),
            source,
        }
    }

    /// The canonical row identifier failure.
    pub fn unidentifiable() -> Self {
        BrowseError::Identifier("cannot resolve row identifier".to_string())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            BrowseError::Config(_) | BrowseError::Json(_) => EXIT_CONFIG_ERROR,
            BrowseError::Validation(_) => EXIT_VALIDATION_ERROR,
            BrowseError::Unsupported(_) => EXIT_UNSUPPORTED,
            BrowseError::Schema { .. } | BrowseError::SchemaMissing(_) => EXIT_SCHEMA_ERROR,
            BrowseError::Identifier(_) => EXIT_IDENTIFIER_ERROR,
            BrowseError::Engine { .. } => EXIT_ENGINE_ERROR,
            BrowseError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for browser operations.
pub type Result<T> = std::result::Result<T, BrowseError>;
