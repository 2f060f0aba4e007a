//! Command reports and their renderings.

use std::fmt::Write as _;
use std::path::PathBuf;

use ff_common::{Error, RunId, SCHEMA_VERSION};
use ff_telemetry::WrittenTable;
use serde::Serialize;

use crate::assemble::Assembly;

/// Output of `fitframe decode`.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    pub schema_version: &'static str,
    pub run_id: RunId,
    pub source: PathBuf,
    pub generated_at: String,
    pub records: u64,
    pub tables: Assembly,
}

impl DecodeReport {
    pub fn new(source: PathBuf, records: u64, tables: Assembly) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: RunId::new(),
            source,
            generated_at: chrono::Utc::now().to_rfc3339(),
            records,
            tables,
        }
    }

    /// One line per table: key, rows, columns, unrecognized scalars.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}: {} records in {} tables",
            self.source.display(),
            self.records,
            self.tables.len()
        );
        for (key, table) in self.tables.iter() {
            let _ = write!(
                out,
                "  {key:<24} rows={:<8} columns={}",
                table.row_count,
                table.columns.len()
            );
            if table.unrecognized > 0 {
                let _ = write!(out, " unrecognized={}", table.unrecognized);
            }
            out.push('\n');
        }
        out
    }
}

/// Output of `fitframe export`.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub schema_version: &'static str,
    pub run_id: RunId,
    pub source: PathBuf,
    pub out_dir: PathBuf,
    pub written: Vec<WrittenTable>,
    /// Tables with rows but no columns, which Parquet cannot hold.
    pub skipped: Vec<String>,
}

impl ExportReport {
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for entry in &self.written {
            let _ = writeln!(
                out,
                "{:<24} rows={:<8} -> {}",
                entry.table,
                entry.rows,
                entry.path.display()
            );
        }
        for key in &self.skipped {
            let _ = writeln!(out, "{key:<24} skipped (no columns)");
        }
        out
    }
}

/// Output of `fitframe check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub source: PathBuf,
    pub status: &'static str,
    pub segments: Vec<SegmentInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentInfo {
    pub protocol_version: u8,
    pub profile_version: u16,
    pub data_size: u32,
}

impl CheckReport {
    pub fn summary(&self) -> String {
        format!(
            "{}: {} ({} segment{})\n",
            self.source.display(),
            self.status,
            self.segments.len(),
            if self.segments.len() == 1 { "" } else { "s" }
        )
    }
}

/// Error body printed on failure in JSON mode.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub status: &'static str,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub code: u32,
    pub message: String,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        Self {
            status: "error",
            error: ErrorBody {
                kind: err.kind(),
                code: err.code(),
                message: err.to_string(),
            },
        }
    }
}
