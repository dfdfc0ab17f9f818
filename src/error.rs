use std::path::PathBuf;

/// Error types for sqlstore
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error during SQL template parsing
    #[error("Failed to parse SQL template: {0}")]
    Parse(#[from] regex::Error),

    /// A catalog file or directory could not be read
    #[error("Failed to read query catalog {}: {source}", path.display())]
    Catalog {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The SQL references a placeholder absent from the supplied parameter map
    #[error("Missing value for named parameter: {{{0}}}")]
    MissingParameter(String),

    /// A single-row query returned more than one row
    #[error("Expected at most one row from query '{query}', got {count}")]
    MultipleRows { query: String, count: usize },

    /// A result row could not be mapped onto the target type
    #[error("Failed to map row to {target}: {source}")]
    Mapping {
        target: &'static str,
        source: sqlx::Error,
    },

    /// Error from SQLx database operations
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for sqlstore operations
pub type Result<T> = std::result::Result<T, Error>;
