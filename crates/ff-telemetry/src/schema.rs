//! Arrow schemas for materialized tables.
//!
//! Every column is a nullable `Float64`. Units travel as field metadata and
//! the table identity as schema metadata, so Parquet files are
//! self-describing.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::util::pretty::pretty_format_batches;
use ff_common::MaterializedTable;

/// Field metadata key holding a column's unit.
pub const UNITS_KEY: &str = "units";
/// Schema metadata key holding the friendly table name.
pub const MESSAGE_NAME_KEY: &str = "message_name";
/// Schema metadata key holding the record-type identifier.
pub const MESSAGE_NUM_KEY: &str = "message_num";
/// Schema metadata key holding the export schema version.
pub const SCHEMA_VERSION_KEY: &str = "schema_version";

/// Arrow schema for one table, columns in table order.
pub fn table_schema(table: &MaterializedTable) -> Schema {
    let fields: Vec<Field> = table
        .columns
        .iter()
        .map(|column| {
            Field::new(&column.name, DataType::Float64, true).with_metadata(HashMap::from([(
                UNITS_KEY.to_string(),
                column.unit.clone(),
            )]))
        })
        .collect();

    let metadata = HashMap::from([
        (MESSAGE_NAME_KEY.to_string(), table.name.clone()),
        (MESSAGE_NUM_KEY.to_string(), table.type_id.to_string()),
        (
            SCHEMA_VERSION_KEY.to_string(),
            crate::SCHEMA_VERSION.to_string(),
        ),
    ]);

    Schema::new_with_metadata(fields, metadata)
}

/// Convert a table into a single record batch.
///
/// The row count is set explicitly so tables whose records carried no
/// fields still report their rows.
pub fn to_record_batch(table: &MaterializedTable) -> Result<RecordBatch, ArrowError> {
    let schema = Arc::new(table_schema(table));
    let arrays: Vec<ArrayRef> = table
        .columns
        .iter()
        .map(|column| Arc::new(Float64Array::from(column.values.clone())) as ArrayRef)
        .collect();

    let options = RecordBatchOptions::new().with_row_count(Some(table.row_count));
    RecordBatch::try_new_with_options(schema, arrays, &options)
}

/// Render the first `limit` rows as an ASCII table.
pub fn pretty_preview(table: &MaterializedTable, limit: usize) -> Result<String, ArrowError> {
    let batch = to_record_batch(table)?;
    let rows = limit.min(batch.num_rows());
    let shown = batch.slice(0, rows);
    Ok(pretty_format_batches(&[shown])?.to_string())
}
