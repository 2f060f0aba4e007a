//! Parquet files written by the exporter read back with identical cells.

use std::fs::File;

use arrow::array::{Array, Float64Array};
use ff_common::{DenseColumn, MaterializedTable};
use ff_config::CompressionKind;
use ff_telemetry::{ParquetTableWriter, WriterConfig, UNITS_KEY};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tempfile::tempdir;

fn record_table() -> MaterializedTable {
    MaterializedTable {
        type_id: 20,
        name: "record".into(),
        row_count: 3,
        columns: vec![
            DenseColumn {
                name: "cadence".into(),
                unit: "rpm".into(),
                values: vec![None, Some(80.0), Some(81.0)],
            },
            DenseColumn {
                name: "heart_rate".into(),
                unit: "bpm".into(),
                values: vec![Some(60.0), Some(62.0), None],
            },
        ],
        unrecognized: 0,
    }
}

fn read_back(path: &std::path::Path) -> Vec<arrow::record_batch::RecordBatch> {
    let file = File::open(path).expect("open parquet");
    ParquetRecordBatchReaderBuilder::try_new(file)
        .expect("reader builder")
        .build()
        .expect("reader")
        .collect::<Result<Vec<_>, _>>()
        .expect("batches")
}

#[test]
fn written_table_reads_back_with_nulls_and_units() {
    for compression in [CompressionKind::Zstd, CompressionKind::Snappy, CompressionKind::None] {
        let dir = tempdir().unwrap();
        let writer =
            ParquetTableWriter::new(WriterConfig::new(dir.path()).with_compression(compression))
                .unwrap();

        let written = writer
            .write_table("record", &record_table())
            .unwrap()
            .expect("table has columns");
        assert_eq!(written.rows, 3);
        assert_eq!(written.columns, 2);
        assert!(written.path.ends_with("record.parquet"));

        let batches = read_back(&written.path);
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 3);

        let batch = &batches[0];
        let schema = batch.schema();
        let cadence_field = schema.field_with_name("cadence").unwrap();
        assert_eq!(
            cadence_field.metadata().get(UNITS_KEY).map(String::as_str),
            Some("rpm")
        );

        let cadence = batch
            .column(schema.index_of("cadence").unwrap())
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert!(cadence.is_null(0));
        assert_eq!(cadence.value(1), 80.0);

        let heart_rate = batch
            .column(schema.index_of("heart_rate").unwrap())
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(heart_rate.value(0), 60.0);
        assert!(heart_rate.is_null(2));
    }
}

#[test]
fn tables_without_columns_are_skipped() {
    let dir = tempdir().unwrap();
    let writer = ParquetTableWriter::new(WriterConfig::new(dir.path().join("nested"))).unwrap();

    let empty = MaterializedTable {
        type_id: 21,
        name: "event".into(),
        row_count: 4,
        columns: Vec::new(),
        unrecognized: 0,
    };
    let written = writer
        .write_all([("record", &record_table()), ("event", &empty)])
        .unwrap();

    assert_eq!(written.len(), 1);
    assert_eq!(written[0].table, "record");
    assert!(dir.path().join("nested/record.parquet").exists());
    assert!(!dir.path().join("nested/event.parquet").exists());
}
