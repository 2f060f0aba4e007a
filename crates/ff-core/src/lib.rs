//! fitframe core: table aggregation over decoded FIT records.
//!
//! Records flow from a [`pipeline::RecordSource`] through the
//! [`dispatch::RecordDispatcher`] into per-type [`table::TableBuilder`]s,
//! which are then materialized into dense, row-aligned columns.

pub mod assemble;
pub mod cli;
pub mod dispatch;
pub mod exit_codes;
pub mod logging;
pub mod materialize;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod table;

pub use assemble::{assemble, Assembly};
pub use dispatch::RecordDispatcher;
pub use exit_codes::ExitCode;
pub use materialize::materialize;
pub use pipeline::{aggregate, check_file, decode_file, DecodeOptions, DecodeOutcome, RecordSource};
pub use registry::TableRegistry;
pub use table::{Column, RowIndex, TableBuilder};
