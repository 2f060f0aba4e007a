//! fitframe tabular export.
//!
//! This crate provides:
//! - Arrow schema and record batch conversion for materialized tables
//! - Parquet writer producing one file per table
//! - Pretty-printed previews of table rows

pub mod schema;
pub mod writer;

pub use schema::{pretty_preview, table_schema, to_record_batch, MESSAGE_NAME_KEY, MESSAGE_NUM_KEY, UNITS_KEY};
pub use writer::{ParquetTableWriter, WriteError, WriterConfig, WrittenTable};

/// Schema version for exported tables.
pub const SCHEMA_VERSION: &str = ff_common::SCHEMA_VERSION;
