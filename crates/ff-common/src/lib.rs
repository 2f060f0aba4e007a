//! fitframe common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the fitframe crates:
//! - The decoded record abstraction (`Record`, `Field`, `BaseType`)
//! - The `RecordSink` seam between decoders and the aggregation core
//! - The dense table model shared by renderers and exporters
//! - Run identifiers and schema versioning
//! - Common error types
//! - CLI output formats

pub mod error;
pub mod id;
pub mod output;
pub mod record;
pub mod schema;
pub mod table;

pub use error::{Error, Result};
pub use id::RunId;
pub use output::OutputFormat;
pub use record::{BaseType, Field, RawValue, Record, RecordSink};
pub use schema::SCHEMA_VERSION;
pub use table::{DenseColumn, MaterializedTable};
