//! Result-shape projection over the joined tables.

use super::SqlExpressionBuilder;
use crate::error::QueryBuildError;
use model::{
    core::value::Value,
    schema::{column::ColumnDescriptor, table::TableSchema},
};
use std::sync::Arc;
use tracing::warn;

impl<'a> SqlExpressionBuilder<'a> {
    /// Maps the fields of `shape` back to source columns across every joined
    /// table and renders the statement. Fields that resolve nowhere are
    /// omitted from the SELECT list; a shape that resolves nothing at all
    /// projects `*`.
    pub fn select_into(&mut self, shape: &TableSchema) -> (String, Vec<Value>) {
        if shape.is_same_table(&self.base) && !self.qualify_columns {
            return self.to_select_statement();
        }

        let (columns, unresolved) = self.resolve_projection(shape);
        for field in &unresolved {
            warn!(
                "Field `{}` of `{}` matched no joined table; omitting it",
                field, shape.name
            );
        }
        self.set_projection(columns);
        self.to_select_statement()
    }

    /// Like [`select_into`], except a field that resolves nowhere fails the
    /// projection instead of being omitted.
    ///
    /// [`select_into`]: Self::select_into
    pub fn select_into_strict(
        &mut self,
        shape: &TableSchema,
    ) -> Result<(String, Vec<Value>), QueryBuildError> {
        if shape.is_same_table(&self.base) && !self.qualify_columns {
            return Ok(self.to_select_statement());
        }

        let (columns, unresolved) = self.resolve_projection(shape);
        if let Some(field) = unresolved.into_iter().next() {
            return Err(QueryBuildError::UnresolvedField {
                field,
                shape: shape.name.clone(),
            });
        }
        self.set_projection(columns);
        Ok(self.to_select_statement())
    }

    fn resolve_projection(&self, shape: &TableSchema) -> (Vec<String>, Vec<String>) {
        let candidates = self.candidate_tables(shape);
        let mut columns = Vec::new();
        let mut unresolved = Vec::new();
        for field in &shape.columns {
            match self.resolve_projection_field(&candidates, field) {
                Some(column) => columns.push(column),
                None => unresolved.push(field.name.clone()),
            }
        }
        (columns, unresolved)
    }

    /// The joined tables, with the shape's own table moved to the front when
    /// it participated in a join. A shape prefers its own columns over
    /// same-named columns of other tables.
    fn candidate_tables(&self, shape: &TableSchema) -> Vec<Arc<TableSchema>> {
        let mut ordered = self.table_defs.clone();
        if !shape.is_same_table(&self.base)
            && let Some(pos) = ordered.iter().position(|def| def.is_same_table(shape))
        {
            let own = ordered.remove(pos);
            ordered.insert(0, own);
        }
        ordered
    }

    fn resolve_projection_field(
        &self,
        candidates: &[Arc<TableSchema>],
        field: &ColumnDescriptor,
    ) -> Option<String> {
        // Direct match first. An exact hit on the physical name wins over a
        // case-insensitive hit, across all candidate tables.
        let direct = candidates
            .iter()
            .find_map(|table| {
                table
                    .columns
                    .iter()
                    .find(|col| col.column_name == field.name)
                    .map(|col| (table, col))
            })
            .or_else(|| {
                candidates.iter().find_map(|table| {
                    table
                        .columns
                        .iter()
                        .find(|col| {
                            col.name.eq_ignore_ascii_case(&field.name)
                                || col.column_name.eq_ignore_ascii_case(&field.name)
                        })
                        .map(|col| (table, col))
                })
            });

        if let Some((table, column)) = direct {
            let mut rendered = format!(
                "{}.{}",
                self.dialect.quote_identifier(&table.name),
                self.dialect.quote_identifier(&column.column_name)
            );
            if column.alias.is_some() {
                // Keep the result column keyed by the shape's field name.
                rendered.push_str(&format!(
                    " AS {}",
                    self.dialect.quote_identifier(&field.name)
                ));
            }
            return Some(rendered);
        }

        // Fall back to the `{Table}{Field}` flattening convention.
        candidates.iter().find_map(|table| {
            table
                .columns
                .iter()
                .find(|col| format!("{}{}", table.name, col.name).eq_ignore_ascii_case(&field.name))
                .map(|col| {
                    format!(
                        "{}.{} AS {}",
                        self.dialect.quote_identifier(&table.name),
                        self.dialect.quote_identifier(&col.column_name),
                        self.dialect.quote_identifier(&field.name)
                    )
                })
        })
    }

    fn set_projection(&mut self, columns: Vec<String>) {
        self.select_expression = Some(if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        });
    }

    /// Finds the first joined table and column matching a bare field name.
    /// A direct match on the logical or physical name wins; the
    /// `{Table}{Field}` flattening convention is the fallback. Registration
    /// order breaks ties.
    pub fn first_matching_field(
        &self,
        name: &str,
    ) -> Option<(&Arc<TableSchema>, &ColumnDescriptor)> {
        let direct = self.table_defs.iter().find_map(|table| {
            table
                .columns
                .iter()
                .find(|col| {
                    col.name.eq_ignore_ascii_case(name) || col.column_name.eq_ignore_ascii_case(name)
                })
                .map(|col| (table, col))
        });
        if direct.is_some() {
            return direct;
        }

        self.table_defs.iter().find_map(|table| {
            table
                .columns
                .iter()
                .find(|col| format!("{}{}", table.name, col.name).eq_ignore_ascii_case(name))
                .map(|col| (table, col))
        })
    }

    /// Locates a field for SELECT list restriction. Before any join the
    /// base schema answers; afterwards the joined tables do.
    pub(super) fn locate_field(&self, name: &str) -> Option<(String, String)> {
        if let Some((table, column)) = self.first_matching_field(name) {
            return Some((table.name.clone(), column.column_name.clone()));
        }
        if self.table_defs.is_empty() {
            return self
                .base
                .columns
                .iter()
                .find(|col| {
                    col.name.eq_ignore_ascii_case(name) || col.column_name.eq_ignore_ascii_case(name)
                })
                .map(|col| (self.base.name.clone(), col.column_name.clone()));
        }
        None
    }
}
