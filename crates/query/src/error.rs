use thiserror::Error;

/// Errors produced while planning a statement.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryBuildError {
    /// Neither side of a join pair declares a foreign key pointing at the
    /// other, so no ON condition can be synthesized. The field is not named
    /// `source` because thiserror reserves that name for an error cause.
    #[error("could not infer relationship between {from_table} and {to_table}")]
    RelationshipNotFound { from_table: String, to_table: String },

    /// Strict projection found a field no joined table can supply.
    #[error("field '{field}' of shape '{shape}' matched no joined table")]
    UnresolvedField { field: String, shape: String },
}
