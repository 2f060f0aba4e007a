//! Parquet writer: one file per materialized table.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use ff_common::MaterializedTable;
use ff_config::CompressionKind;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::schema::to_record_batch;

/// Errors from table export.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),
}

/// Writer configuration.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Directory receiving `<table>.parquet` files; created if missing.
    pub out_dir: PathBuf,
    pub compression: CompressionKind,
}

impl WriterConfig {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            compression: CompressionKind::default(),
        }
    }

    pub fn with_compression(mut self, compression: CompressionKind) -> Self {
        self.compression = compression;
        self
    }
}

/// One exported table.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenTable {
    pub table: String,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Writes materialized tables as Parquet files.
#[derive(Debug, Clone)]
pub struct ParquetTableWriter {
    config: WriterConfig,
}

impl ParquetTableWriter {
    pub fn new(config: WriterConfig) -> Result<Self, WriteError> {
        fs::create_dir_all(&config.out_dir)?;
        Ok(Self { config })
    }

    pub fn out_dir(&self) -> &Path {
        &self.config.out_dir
    }

    fn properties(&self) -> WriterProperties {
        let compression = match self.config.compression {
            CompressionKind::Zstd => Compression::ZSTD(ZstdLevel::default()),
            CompressionKind::Snappy => Compression::SNAPPY,
            CompressionKind::None => Compression::UNCOMPRESSED,
        };
        WriterProperties::builder()
            .set_compression(compression)
            .build()
    }

    /// Write `table` to `<out_dir>/<key>.parquet`.
    ///
    /// Tables without columns cannot be represented in Parquet and are
    /// skipped (`Ok(None)`).
    pub fn write_table(
        &self,
        key: &str,
        table: &MaterializedTable,
    ) -> Result<Option<WrittenTable>, WriteError> {
        if table.columns.is_empty() {
            warn!(table = key, rows = table.row_count, "table has no columns, skipped");
            return Ok(None);
        }

        let batch = to_record_batch(table)?;
        let path = self.config.out_dir.join(format!("{}.parquet", file_stem(key)));
        let file = File::create(&path)?;

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(self.properties()))?;
        writer.write(&batch)?;
        writer.close()?;

        debug!(table = key, path = %path.display(), rows = table.row_count, "wrote parquet file");
        Ok(Some(WrittenTable {
            table: key.to_string(),
            path,
            rows: table.row_count,
            columns: table.columns.len(),
        }))
    }

    /// Write every table, returning the ones actually written.
    pub fn write_all<'a, I>(&self, tables: I) -> Result<Vec<WrittenTable>, WriteError>
    where
        I: IntoIterator<Item = (&'a str, &'a MaterializedTable)>,
    {
        let mut written = Vec::new();
        for (key, table) in tables {
            if let Some(entry) = self.write_table(key, table)? {
                written.push(entry);
            }
        }
        info!(
            files = written.len(),
            out_dir = %self.config.out_dir.display(),
            "export finished"
        );
        Ok(written)
    }
}

/// Keep file names portable: anything but ASCII alphanumerics, `-` and `_`
/// becomes `_`.
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
