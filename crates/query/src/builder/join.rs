//! Join planning over declared foreign keys.

use super::SqlExpressionBuilder;
use crate::{
    ast::{
        common::JoinKind,
        expr::{Expr, Ident},
    },
    error::QueryBuildError,
};
use model::schema::{column::ColumnDescriptor, table::TableSchema};
use std::sync::Arc;
use tracing::debug;

/// Searches `child`'s columns for a declared foreign key pointing at
/// `parent`. Direction is the caller's problem; the planner probes both.
fn resolve_reference<'s>(
    parent: &TableSchema,
    child: &'s TableSchema,
) -> Option<&'s ColumnDescriptor> {
    child.columns.iter().find(|col| {
        col.references
            .as_ref()
            .map_or(false, |fk| fk.table.eq_ignore_ascii_case(&parent.name))
    })
}

impl<'a> SqlExpressionBuilder<'a> {
    /// INNER JOIN against the base table, inferring the ON condition from
    /// declared foreign keys.
    pub fn join(&mut self, target: &Arc<TableSchema>) -> Result<&mut Self, QueryBuildError> {
        let base = Arc::clone(&self.base);
        self.internal_join(JoinKind::Inner, None, &base, target)
    }

    /// INNER JOIN against the base table with an explicit ON predicate.
    pub fn join_on(
        &mut self,
        target: &Arc<TableSchema>,
        predicate: Expr,
    ) -> Result<&mut Self, QueryBuildError> {
        let base = Arc::clone(&self.base);
        self.internal_join(JoinKind::Inner, Some(predicate), &base, target)
    }

    /// LEFT JOIN against the base table, inferring the ON condition from
    /// declared foreign keys.
    pub fn left_join(&mut self, target: &Arc<TableSchema>) -> Result<&mut Self, QueryBuildError> {
        let base = Arc::clone(&self.base);
        self.internal_join(JoinKind::Left, None, &base, target)
    }

    /// LEFT JOIN against the base table with an explicit ON predicate.
    pub fn left_join_on(
        &mut self,
        target: &Arc<TableSchema>,
        predicate: Expr,
    ) -> Result<&mut Self, QueryBuildError> {
        let base = Arc::clone(&self.base);
        self.internal_join(JoinKind::Left, Some(predicate), &base, target)
    }

    /// RIGHT JOIN against the base table, inferring the ON condition from
    /// declared foreign keys.
    pub fn right_join(&mut self, target: &Arc<TableSchema>) -> Result<&mut Self, QueryBuildError> {
        let base = Arc::clone(&self.base);
        self.internal_join(JoinKind::Right, None, &base, target)
    }

    /// RIGHT JOIN against the base table with an explicit ON predicate.
    pub fn right_join_on(
        &mut self,
        target: &Arc<TableSchema>,
        predicate: Expr,
    ) -> Result<&mut Self, QueryBuildError> {
        let base = Arc::clone(&self.base);
        self.internal_join(JoinKind::Right, Some(predicate), &base, target)
    }

    /// FULL JOIN against the base table, inferring the ON condition from
    /// declared foreign keys.
    pub fn full_join(&mut self, target: &Arc<TableSchema>) -> Result<&mut Self, QueryBuildError> {
        let base = Arc::clone(&self.base);
        self.internal_join(JoinKind::Full, None, &base, target)
    }

    /// FULL JOIN against the base table with an explicit ON predicate.
    pub fn full_join_on(
        &mut self,
        target: &Arc<TableSchema>,
        predicate: Expr,
    ) -> Result<&mut Self, QueryBuildError> {
        let base = Arc::clone(&self.base);
        self.internal_join(JoinKind::Full, Some(predicate), &base, target)
    }

    /// Joins two explicitly named tables, letting chains continue past the
    /// base table.
    pub fn join_between(
        &mut self,
        kind: JoinKind,
        source: &Arc<TableSchema>,
        target: &Arc<TableSchema>,
    ) -> Result<&mut Self, QueryBuildError> {
        self.internal_join(kind, None, source, target)
    }

    /// Joins two explicitly named tables with an explicit ON predicate.
    pub fn join_between_on(
        &mut self,
        kind: JoinKind,
        source: &Arc<TableSchema>,
        target: &Arc<TableSchema>,
        predicate: Expr,
    ) -> Result<&mut Self, QueryBuildError> {
        self.internal_join(kind, Some(predicate), source, target)
    }

    fn internal_join(
        &mut self,
        kind: JoinKind,
        predicate: Option<Expr>,
        source: &Arc<TableSchema>,
        target: &Arc<TableSchema>,
    ) -> Result<&mut Self, QueryBuildError> {
        // Qualified-column mode is sticky: once a join is attempted, every
        // later rendering in this builder prefixes columns with their table.
        self.qualify_columns = true;

        // The clause is appended and the registry updated only after the
        // condition exists, so a failed inference never leaves a partial join.
        let condition = self.emit_condition(predicate, source, target)?;

        // The table named after the join keyword must be the one this clause
        // introduces. When the caller passed an already-known table as the
        // target and a new one as the source, the source is the newcomer.
        let join_table = if self.is_registered(target) && !self.is_registered(source) {
            Arc::clone(source)
        } else {
            Arc::clone(target)
        };

        debug!(
            "Planned {} with `{}` ON {}",
            kind.as_sql(),
            join_table.name,
            condition
        );

        self.from_expression.push_str(&format!(
            " {} {} ON {}",
            kind.as_sql(),
            self.dialect.quote_identifier(&join_table.name),
            condition
        ));

        self.register_table(source);
        self.register_table(target);

        Ok(self)
    }

    /// Renders the ON condition: the explicit predicate when one is given,
    /// a synthesized equality over a declared foreign key otherwise.
    fn emit_condition(
        &mut self,
        predicate: Option<Expr>,
        source: &Arc<TableSchema>,
        target: &Arc<TableSchema>,
    ) -> Result<String, QueryBuildError> {
        if let Some(predicate) = predicate {
            let predicate = scope_to_pair(predicate, source, target);
            return Ok(self.render_fragment(&predicate));
        }

        // Try source -> target FK, otherwise target -> source. Argument
        // order carries no relationship direction.
        let (parent, child, fk_column) = match resolve_reference(source, target) {
            Some(column) => (source, target, column),
            None => match resolve_reference(target, source) {
                Some(column) => (target, source, column),
                None => {
                    return Err(QueryBuildError::RelationshipNotFound {
                        from_table: source.name.clone(),
                        to_table: target.name.clone(),
                    });
                }
            },
        };

        debug!(
            "Inferred relationship `{}`.`{}` -> `{}`",
            child.name, fk_column.column_name, parent.name
        );

        let condition = Expr::eq(
            Expr::Identifier(Ident {
                qualifier: Some(parent.name.clone()),
                name: parent.primary_key.clone(),
            }),
            Expr::Identifier(Ident {
                qualifier: Some(child.name.clone()),
                name: fk_column.column_name.clone(),
            }),
        );
        Ok(self.render_fragment(&condition))
    }
}

/// Bare identifiers in an explicit join predicate resolve against the
/// joining pair only, source columns first.
fn scope_to_pair(predicate: Expr, source: &TableSchema, target: &TableSchema) -> Expr {
    predicate.qualify_bare(&|name| {
        find_pair_column(source, name).or_else(|| find_pair_column(target, name))
    })
}

fn find_pair_column(schema: &TableSchema, name: &str) -> Option<(String, String)> {
    schema
        .columns
        .iter()
        .find(|col| {
            col.name.eq_ignore_ascii_case(name) || col.column_name.eq_ignore_ascii_case(name)
        })
        .map(|col| (schema.name.clone(), col.column_name.clone()))
}
