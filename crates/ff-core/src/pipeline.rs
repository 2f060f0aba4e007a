//! End-to-end decode: open, verify, ingest, assemble.
//!
//! ```text
//! path ──► open ──► check_integrity ──► run(dispatcher) ──► assemble
//!           │             │                   │
//!     FileNotFound  IntegrityCheckFailed  DecodeRuntime (rows discarded)
//! ```
//!
//! A fatal error never comes back together with tables.

use std::path::Path;

use ff_common::{Error, RecordSink, Result};
use ff_config::{ColumnOrder, FrameConfig, UnrecognizedPolicy};
use ff_fit::{FileHeader, FitDecoder, FitError};
use tracing::{info, warn};

use crate::assemble::{assemble, Assembly};
use crate::dispatch::RecordDispatcher;

/// Something that can verify itself and then push records into a sink.
pub trait RecordSource {
    type Error: std::fmt::Display;

    /// Verify structural integrity before any record is emitted.
    fn check_integrity(&self) -> std::result::Result<(), Self::Error>;

    /// Emit every record into `sink`, in stream order.
    fn run(&self, sink: &mut dyn RecordSink) -> std::result::Result<(), Self::Error>;
}

impl RecordSource for FitDecoder {
    type Error = FitError;

    fn check_integrity(&self) -> std::result::Result<(), FitError> {
        FitDecoder::check_integrity(self).map(|_| ())
    }

    fn run(&self, sink: &mut dyn RecordSink) -> std::result::Result<(), FitError> {
        FitDecoder::run(self, sink).map(|_| ())
    }
}

/// Knobs that shape the assembled tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub column_order: ColumnOrder,
    pub unrecognized: UnrecognizedPolicy,
}

impl From<&FrameConfig> for DecodeOptions {
    fn from(config: &FrameConfig) -> Self {
        Self {
            column_order: config.column_order,
            unrecognized: config.unrecognized_values,
        }
    }
}

/// Result of a successful decode.
#[derive(Debug, Clone)]
pub struct DecodeOutcome {
    pub assembly: Assembly,
    /// Records delivered by the source.
    pub records: u64,
}

/// Aggregate every record of `source` into dense tables.
pub fn aggregate<S: RecordSource + ?Sized>(
    source: &S,
    options: &DecodeOptions,
) -> Result<DecodeOutcome> {
    source
        .check_integrity()
        .map_err(|e| Error::IntegrityCheckFailed(e.to_string()))?;

    let mut dispatcher = RecordDispatcher::new(options.unrecognized);
    if let Err(e) = source.run(&mut dispatcher) {
        warn!(
            records = dispatcher.ingested(),
            rows = dispatcher.registry().total_rows(),
            "decode aborted, discarding partial tables"
        );
        return Err(Error::DecodeRuntime(e.to_string()));
    }

    let records = dispatcher.ingested();
    let registry = dispatcher.into_registry();
    let assembly = assemble(&registry, options.column_order);
    drop(registry);

    info!(
        records,
        tables = assembly.len(),
        rows = assembly.total_rows(),
        "assembled tables"
    );
    Ok(DecodeOutcome { assembly, records })
}

/// Open a FIT file; any failure to open it is `FileNotFound`.
pub fn open_file(path: &Path) -> Result<FitDecoder> {
    FitDecoder::open(path).map_err(|source| Error::FileNotFound {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a FIT file into dense tables.
pub fn decode_file(path: &Path, options: &DecodeOptions) -> Result<DecodeOutcome> {
    info!(path = %path.display(), "decoding FIT file");
    let decoder = open_file(path)?;
    aggregate(&decoder, options)
}

/// Open and verify a FIT file without decoding records.
pub fn check_file(path: &Path) -> Result<Vec<FileHeader>> {
    let decoder = open_file(path)?;
    decoder
        .check_integrity()
        .map_err(|e| Error::IntegrityCheckFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_common::{BaseType, Field, RawValue, Record};
    use std::cell::Cell;

    /// Scripted source that counts how many records it delivered.
    struct ScriptedSource {
        records: Vec<Record>,
        integrity_ok: bool,
        fail_after: Option<usize>,
        delivered: Cell<usize>,
    }

    impl ScriptedSource {
        fn new(records: Vec<Record>) -> Self {
            Self {
                records,
                integrity_ok: true,
                fail_after: None,
                delivered: Cell::new(0),
            }
        }
    }

    impl RecordSource for ScriptedSource {
        type Error = String;

        fn check_integrity(&self) -> std::result::Result<(), String> {
            if self.integrity_ok {
                Ok(())
            } else {
                Err("bad crc".to_string())
            }
        }

        fn run(&self, sink: &mut dyn RecordSink) -> std::result::Result<(), String> {
            for (i, record) in self.records.iter().enumerate() {
                if self.fail_after == Some(i) {
                    return Err(format!("truncated at record {i}"));
                }
                sink.ingest(record);
                self.delivered.set(self.delivered.get() + 1);
            }
            Ok(())
        }
    }

    fn hr(v: u64) -> Record {
        Record::new(20, "record").with_field(Field::new(
            "heart_rate",
            "bpm",
            BaseType::Uint8,
            RawValue::Unsigned(v),
        ))
    }

    #[test]
    fn integrity_failure_happens_before_any_record() {
        let mut source = ScriptedSource::new(vec![hr(60), hr(61)]);
        source.integrity_ok = false;

        let err = aggregate(&source, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::IntegrityCheckFailed(_)));
        assert_eq!(source.delivered.get(), 0);
    }

    #[test]
    fn mid_stream_failure_returns_no_tables() {
        let mut source = ScriptedSource::new(vec![hr(60), hr(61), hr(62)]);
        source.fail_after = Some(2);

        let err = aggregate(&source, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DecodeRuntime(ref m) if m.contains("record 2")));
        assert_eq!(source.delivered.get(), 2);
    }

    #[test]
    fn successful_run_counts_records() {
        let source = ScriptedSource::new(vec![hr(60), hr(61), Record::new(18, "session")]);
        let outcome = aggregate(&source, &DecodeOptions::default()).unwrap();
        assert_eq!(outcome.records, 3);
        assert_eq!(outcome.assembly.get("record").unwrap().row_count, 2);
        assert_eq!(outcome.assembly.get("session").unwrap().row_count, 1);
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_file(&dir.path().join("nope.fit"), &DecodeOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn options_follow_config() {
        let config = FrameConfig {
            column_order: ColumnOrder::Discovery,
            unrecognized_values: UnrecognizedPolicy::Sentinel,
            ..FrameConfig::default()
        };
        let options = DecodeOptions::from(&config);
        assert_eq!(options.column_order, ColumnOrder::Discovery);
        assert_eq!(options.unrecognized, UnrecognizedPolicy::Sentinel);
    }
}
