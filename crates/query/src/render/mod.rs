//! Defines the core rendering trait and context for converting AST to SQL.

use crate::dialect::Dialect;
use model::core::value::Value;

pub mod expr;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, r: &mut Renderer);
}

/// A context that holds the state during the rendering process.
///
/// It accumulates the SQL string and the bound parameters, and exposes the
/// dialect for syntax-specific details.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self::with_params(dialect, Vec::new())
    }

    /// Seeds the renderer with parameters accumulated by earlier fragments
    /// of the same statement, so placeholder numbering continues instead of
    /// restarting at one.
    pub fn with_params(dialect: &'a dyn Dialect, params: Vec<Value>) -> Self {
        Self {
            sql: String::new(),
            params,
            dialect,
        }
    }

    /// Consumes the renderer and returns the final SQL string and parameters.
    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }

    /// Registers a bound value and writes its dialect placeholder.
    pub fn add_param(&mut self, value: Value) {
        self.params.push(value);
        let placeholder = self.dialect.get_placeholder(self.params.len() - 1);
        self.sql.push_str(&placeholder);
    }
}
