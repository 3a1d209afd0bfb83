pub mod column;
pub mod error;
pub mod registry;
pub mod table;
