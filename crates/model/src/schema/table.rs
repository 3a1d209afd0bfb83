use super::column::ColumnDescriptor;
use serde::{Deserialize, Serialize};

/// Structural description of one table: name, primary-key column, and the
/// ordered column list. Column order is load-bearing: projection resolution
/// scans columns in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub primary_key: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn new(name: &str, primary_key: &str) -> Self {
        Self {
            name: name.to_string(),
            primary_key: primary_key.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }

    /// Looks up a column by logical field name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Two schema values describe the same table iff their names are equal.
    pub fn is_same_table(&self, other: &TableSchema) -> bool {
        self.name == other.name
    }
}
