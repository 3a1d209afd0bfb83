//! A SELECT statement accumulator driven by table schemas.

use crate::{
    ast::expr::Expr,
    dialect::Dialect,
    render::{Render, Renderer},
};
use model::{core::value::Value, schema::table::TableSchema};
use std::{fmt, mem, sync::Arc};
use tracing::debug;

pub mod join;
pub mod projection;

/// A SQL SELECT statement under construction against a primary table.
///
/// The builder is created over a base schema, mutated through a sequence of
/// join, where and projection calls, and finally rendered. It provides no
/// internal synchronization; one builder belongs to one caller.
pub struct SqlExpressionBuilder<'a> {
    dialect: &'a dyn Dialect,
    base: Arc<TableSchema>,
    table_defs: Vec<Arc<TableSchema>>,
    from_expression: String,
    select_expression: Option<String>,
    where_expression: Option<String>,
    params: Vec<Value>,
    qualify_columns: bool,
}

impl fmt::Debug for SqlExpressionBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlExpressionBuilder")
            .field("dialect", &self.dialect.name())
            .field("base", &self.base.name)
            .field("from_expression", &self.from_expression)
            .field("select_expression", &self.select_expression)
            .field("where_expression", &self.where_expression)
            .field("qualify_columns", &self.qualify_columns)
            .finish()
    }
}

impl<'a> SqlExpressionBuilder<'a> {
    pub fn new(base: Arc<TableSchema>, dialect: &'a dyn Dialect) -> Self {
        let from_expression = format!("FROM {}", dialect.quote_identifier(&base.name));
        Self {
            dialect,
            base,
            table_defs: Vec::new(),
            from_expression,
            select_expression: None,
            where_expression: None,
            params: Vec::new(),
            qualify_columns: false,
        }
    }

    pub fn base(&self) -> &Arc<TableSchema> {
        &self.base
    }

    /// Tables that have participated in a join so far, in registration order.
    pub fn joined_tables(&self) -> &[Arc<TableSchema>] {
        &self.table_defs
    }

    /// Membership is by table identity, not handle identity.
    pub fn is_registered(&self, schema: &TableSchema) -> bool {
        self.table_defs.iter().any(|def| def.is_same_table(schema))
    }

    /// Whether column references render with their table prefix. Off until
    /// the first join, then on for the rest of the builder's life.
    pub fn qualifies_columns(&self) -> bool {
        self.qualify_columns
    }

    fn register_table(&mut self, schema: &Arc<TableSchema>) {
        if !self.is_registered(schema) {
            self.table_defs.push(Arc::clone(schema));
        }
    }

    /// Appends a predicate to the WHERE clause, combining with AND.
    pub fn where_clause(&mut self, predicate: Expr) -> &mut Self {
        self.append_to_where("AND", predicate)
    }

    /// Appends a predicate to the WHERE clause, combining with AND.
    pub fn and(&mut self, predicate: Expr) -> &mut Self {
        self.append_to_where("AND", predicate)
    }

    /// Appends a predicate to the WHERE clause, combining with OR.
    pub fn or(&mut self, predicate: Expr) -> &mut Self {
        self.append_to_where("OR", predicate)
    }

    fn append_to_where(&mut self, combinator: &str, predicate: Expr) -> &mut Self {
        let predicate = self.scope_to_registry(predicate);
        let sql = self.render_fragment(&predicate);
        match &mut self.where_expression {
            Some(where_expr) => {
                where_expr.push(' ');
                where_expr.push_str(combinator);
                where_expr.push(' ');
                where_expr.push_str(&sql);
            }
            None => self.where_expression = Some(sql),
        }
        self
    }

    /// Restricts the SELECT list to the named fields. Names resolve through
    /// the joined tables once joins exist and against the base schema before
    /// that; names that resolve nowhere are dropped. An empty result restores
    /// the default projection.
    pub fn select_only(&mut self, field_names: &[&str]) -> &mut Self {
        let mut columns = Vec::new();
        for name in field_names.iter().copied() {
            match self.locate_field(name) {
                Some((table, column)) => columns.push(self.column_ref(&table, &column)),
                None => debug!(field = name, "dropping field no table supplies"),
            }
        }
        self.select_expression = if columns.is_empty() {
            None
        } else {
            Some(columns.join(", "))
        };
        self
    }

    /// Renders the accumulated statement with its parameters in bind order.
    pub fn to_select_statement(&self) -> (String, Vec<Value>) {
        let select = match &self.select_expression {
            Some(select) => select.clone(),
            None => self.default_select_expression(),
        };
        let mut sql = format!("SELECT {} {}", select, self.from_expression);
        if let Some(where_expr) = &self.where_expression {
            sql.push_str(" WHERE ");
            sql.push_str(where_expr);
        }
        (sql, self.params.clone())
    }

    fn default_select_expression(&self) -> String {
        let columns = self
            .base
            .columns
            .iter()
            .map(|col| self.column_ref(&self.base.name, &col.column_name))
            .collect::<Vec<_>>();
        if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        }
    }

    /// Emits a column reference, table-prefixed when the builder is in
    /// qualified-column mode.
    fn column_ref(&self, table: &str, column: &str) -> String {
        if self.qualify_columns {
            format!(
                "{}.{}",
                self.dialect.quote_identifier(table),
                self.dialect.quote_identifier(column)
            )
        } else {
            self.dialect.quote_identifier(column)
        }
    }

    /// Resolves bare identifiers through the joined tables when the builder
    /// is in qualified-column mode. Outside that mode predicates render as
    /// written.
    fn scope_to_registry(&self, predicate: Expr) -> Expr {
        if !self.qualify_columns {
            return predicate;
        }
        predicate.qualify_bare(&|name| {
            self.first_matching_field(name)
                .map(|(table, column)| (table.name.clone(), column.column_name.clone()))
        })
    }

    /// Renders one expression, carrying parameter numbering on from the
    /// fragments rendered before it.
    fn render_fragment(&mut self, expr: &Expr) -> String {
        let mut renderer = Renderer::with_params(self.dialect, mem::take(&mut self.params));
        expr.render(&mut renderer);
        let (sql, params) = renderer.finish();
        self.params = params;
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::SqlExpressionBuilder;
    use crate::{
        ast::expr::Expr,
        dialect::{MySql, Postgres},
        ident, value,
    };
    use model::{
        core::value::Value,
        schema::{column::ColumnDescriptor, table::TableSchema},
    };
    use std::sync::Arc;

    fn users_schema() -> Arc<TableSchema> {
        Arc::new(
            TableSchema::new("users", "id")
                .with_column(ColumnDescriptor::new("id"))
                .with_column(ColumnDescriptor::new("name"))
                .with_column(ColumnDescriptor::new("status")),
        )
    }

    #[test]
    fn test_default_select_lists_base_columns() {
        let dialect = Postgres;
        let builder = SqlExpressionBuilder::new(users_schema(), &dialect);

        let (sql, params) = builder.to_select_statement();

        assert_eq!(sql, r#"SELECT "id", "name", "status" FROM "users""#);
        assert!(params.is_empty());
    }

    #[test]
    fn test_where_clauses_accumulate_with_and_and_or() {
        let dialect = Postgres;
        let mut builder = SqlExpressionBuilder::new(users_schema(), &dialect);

        builder
            .where_clause(Expr::eq(
                ident("status"),
                value(Value::String("active".to_string())),
            ))
            .and(Expr::gt(ident("id"), value(Value::Int(10))))
            .or(Expr::eq(ident("name"), value(Value::String("root".to_string()))));

        let (sql, params) = builder.to_select_statement();

        assert_eq!(
            sql,
            r#"SELECT "id", "name", "status" FROM "users" WHERE ("status" = $1) AND ("id" > $2) OR ("name" = $3)"#
        );
        assert_eq!(
            params,
            vec![
                Value::String("active".to_string()),
                Value::Int(10),
                Value::String("root".to_string()),
            ]
        );
    }

    #[test]
    fn test_select_only_restricts_projection() {
        let dialect = MySql;
        let mut builder = SqlExpressionBuilder::new(users_schema(), &dialect);

        builder.select_only(&["name", "status"]);
        let (sql, _) = builder.to_select_statement();

        assert_eq!(sql, "SELECT `name`, `status` FROM `users`");
    }

    #[test]
    fn test_select_only_drops_unknown_fields() {
        let dialect = Postgres;
        let mut builder = SqlExpressionBuilder::new(users_schema(), &dialect);

        builder.select_only(&["name", "no_such_field"]);
        let (sql, _) = builder.to_select_statement();

        assert_eq!(sql, r#"SELECT "name" FROM "users""#);
    }

    #[test]
    fn test_select_only_with_nothing_resolved_restores_default() {
        let dialect = Postgres;
        let mut builder = SqlExpressionBuilder::new(users_schema(), &dialect);

        builder.select_only(&["no_such_field"]);
        let (sql, _) = builder.to_select_statement();

        assert_eq!(sql, r#"SELECT "id", "name", "status" FROM "users""#);
    }

    #[test]
    fn test_builder_starts_unqualified_with_empty_registry() {
        let dialect = Postgres;
        let builder = SqlExpressionBuilder::new(users_schema(), &dialect);

        assert!(!builder.qualifies_columns());
        assert!(builder.joined_tables().is_empty());
    }
}
