use serde::{Deserialize, Serialize};

/// A declared foreign-key target: the referenced table and column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

/// One table column: the logical field name callers use, the physical column
/// name it maps to, an optional alias applied when the column is projected
/// into a different result shape, and an optional foreign-key target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub column_name: String,
    pub alias: Option<String>,
    pub references: Option<ForeignKeyRef>,
}

impl ColumnDescriptor {
    /// Creates a column whose physical name equals its logical name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            column_name: name.to_string(),
            alias: None,
            references: None,
        }
    }

    pub fn with_column_name(mut self, column_name: &str) -> Self {
        self.column_name = column_name.to_owned();
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_owned());
        self
    }

    pub fn references(mut self, table: &str, column: &str) -> Self {
        self.references = Some(ForeignKeyRef {
            table: table.to_owned(),
            column: column.to_owned(),
        });
        self
    }
}
