use thiserror::Error;

/// Errors from schema catalog population and lookup.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A second schema was registered under an existing table name.
    #[error("table '{0}' is already registered")]
    DuplicateTable(String),

    /// A lookup referenced a table the catalog does not hold.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// The schema catalog document could not be parsed.
    #[error("invalid schema document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}
