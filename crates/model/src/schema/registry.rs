use super::{error::SchemaError, table::TableSchema};
use std::{collections::HashMap, sync::Arc};

/// A read-only catalog of table schemas, populated once at startup and then
/// shared by reference across query builders. Handles are `Arc`s, so
/// concurrent reads from independent builders are cheap; the registry itself
/// is not mutated after population.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    tables: HashMap<String, Arc<TableSchema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    /// Adds a schema to the catalog. Table names are identities: a second
    /// registration under the same name is rejected rather than replaced.
    pub fn register(&mut self, schema: TableSchema) -> Result<(), SchemaError> {
        if self.tables.contains_key(&schema.name) {
            return Err(SchemaError::DuplicateTable(schema.name));
        }
        self.tables.insert(schema.name.clone(), Arc::new(schema));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<TableSchema>> {
        self.tables.get(name).cloned()
    }

    pub fn table(&self, name: &str) -> Result<Arc<TableSchema>, SchemaError> {
        self.get(name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Loads a catalog from a JSON array of table schemas.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schemas: Vec<TableSchema> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column::ColumnDescriptor;

    fn customer() -> TableSchema {
        TableSchema::new("Customer", "Id")
            .with_column(ColumnDescriptor::new("Id"))
            .with_column(ColumnDescriptor::new("Name"))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = SchemaRegistry::new();
        registry.register(customer()).unwrap();

        assert!(registry.contains("Customer"));
        assert_eq!(registry.table("Customer").unwrap().primary_key, "Id");
        assert!(matches!(
            registry.table("Order"),
            Err(SchemaError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = SchemaRegistry::new();
        registry.register(customer()).unwrap();

        let err = registry.register(customer()).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateTable(name) if name == "Customer"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_json_document() {
        let json = r#"[
            {
                "name": "Order",
                "primary_key": "Id",
                "columns": [
                    { "name": "Id", "column_name": "Id" },
                    {
                        "name": "CustomerId",
                        "column_name": "CustomerId",
                        "references": { "table": "Customer", "column": "Id" }
                    }
                ]
            }
        ]"#;

        let registry = SchemaRegistry::from_json(json).unwrap();
        let order = registry.table("Order").unwrap();
        assert_eq!(order.columns.len(), 2);
        assert_eq!(
            order.columns[1].references.as_ref().map(|fk| fk.table.as_str()),
            Some("Customer")
        );
    }
}
