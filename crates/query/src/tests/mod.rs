
use model::schema::{column::ColumnDescriptor, table::TableSchema};
use std::sync::Arc;

fn customer_schema() -> Arc<TableSchema> {
    Arc::new(
        TableSchema::new("Customer", "Id")
            .with_column(ColumnDescriptor::new("Id"))
            .with_column(ColumnDescriptor::new("Name")),
    )
}

fn order_schema() -> Arc<TableSchema> {
    Arc::new(
        TableSchema::new("Order", "Id")
            .with_column(ColumnDescriptor::new("Id"))
            .with_column(ColumnDescriptor::new("CustomerId").references("Customer", "Id"))
            .with_column(ColumnDescriptor::new("CustomerName")),
    )
}

fn line_schema() -> Arc<TableSchema> {
    Arc::new(
        TableSchema::new("Line", "Id")
            .with_column(ColumnDescriptor::new("Id"))
            .with_column(ColumnDescriptor::new("OrderId").references("Order", "Id"))
            .with_column(ColumnDescriptor::new("Quantity")),
    )
}
