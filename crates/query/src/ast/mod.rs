pub mod common;
pub mod expr;
