//! Defines the AST for SQL predicate expressions.

use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `users` or `users.id`.
    Identifier(Ident),

    /// A literal value, such as a string, number, boolean, or NULL.
    Value(Value),

    /// A binary operation, e.g., `column = 'value'` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    /// A function call, e.g., `COUNT(*)` or `LOWER(name)`.
    FunctionCall(FunctionCall),

    /// An aliased expression, e.g. `COUNT(*) AS total_count`
    Alias { expr: Box<Expr>, alias: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'users' in 'users.id'
    pub name: String,              // e.g., the 'id' in 'users.id'
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub wildcard: bool, // represents the '*' in 'COUNT(*)'
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    // Logical
    And,
    Or,
}

impl Expr {
    pub fn compare(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    pub fn eq(left: Expr, right: Expr) -> Expr {
        Expr::compare(left, BinaryOperator::Eq, right)
    }

    pub fn not_eq(left: Expr, right: Expr) -> Expr {
        Expr::compare(left, BinaryOperator::NotEq, right)
    }

    pub fn lt(left: Expr, right: Expr) -> Expr {
        Expr::compare(left, BinaryOperator::Lt, right)
    }

    pub fn lt_eq(left: Expr, right: Expr) -> Expr {
        Expr::compare(left, BinaryOperator::LtEq, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Expr {
        Expr::compare(left, BinaryOperator::Gt, right)
    }

    pub fn gt_eq(left: Expr, right: Expr) -> Expr {
        Expr::compare(left, BinaryOperator::GtEq, right)
    }

    pub fn and(left: Expr, right: Expr) -> Expr {
        Expr::compare(left, BinaryOperator::And, right)
    }

    pub fn or(left: Expr, right: Expr) -> Expr {
        Expr::compare(left, BinaryOperator::Or, right)
    }

    /// Rewrites every unqualified identifier for which `resolve` produces a
    /// (table, column) pair. Qualified identifiers and names `resolve` does
    /// not recognize pass through unchanged.
    pub fn qualify_bare<F>(self, resolve: &F) -> Expr
    where
        F: Fn(&str) -> Option<(String, String)>,
    {
        match self {
            Expr::Identifier(ident) if ident.qualifier.is_none() => match resolve(&ident.name) {
                Some((table, column)) => Expr::Identifier(Ident {
                    qualifier: Some(table),
                    name: column,
                }),
                None => Expr::Identifier(ident),
            },
            Expr::Identifier(_) | Expr::Value(_) => self,
            Expr::BinaryOp(binary) => {
                let BinaryOp { left, op, right } = *binary;
                Expr::BinaryOp(Box::new(BinaryOp {
                    left: left.qualify_bare(resolve),
                    op,
                    right: right.qualify_bare(resolve),
                }))
            }
            Expr::FunctionCall(func) => Expr::FunctionCall(FunctionCall {
                name: func.name,
                args: func
                    .args
                    .into_iter()
                    .map(|arg| arg.qualify_bare(resolve))
                    .collect(),
                wildcard: func.wildcard,
            }),
            Expr::Alias { expr, alias } => Expr::Alias {
                expr: Box::new(expr.qualify_bare(resolve)),
                alias,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ident, qual_ident, value};
    use model::core::value::Value;

    #[test]
    fn test_comparison_constructors_build_binary_ops() {
        let expr = Expr::eq(ident("id"), value(Value::Int(7)));

        assert_eq!(
            expr,
            Expr::BinaryOp(Box::new(BinaryOp {
                left: ident("id"),
                op: BinaryOperator::Eq,
                right: value(Value::Int(7)),
            }))
        );
    }

    #[test]
    fn test_qualify_bare_rewrites_known_names_only() {
        let resolve = |name: &str| {
            (name == "status").then(|| ("orders".to_string(), "status_code".to_string()))
        };

        let expr = Expr::and(
            Expr::eq(ident("status"), value(Value::Int(1))),
            Expr::eq(qual_ident("users", "id"), ident("missing")),
        )
        .qualify_bare(&resolve);

        assert_eq!(
            expr,
            Expr::and(
                Expr::eq(qual_ident("orders", "status_code"), value(Value::Int(1))),
                Expr::eq(qual_ident("users", "id"), ident("missing")),
            )
        );
    }
}
