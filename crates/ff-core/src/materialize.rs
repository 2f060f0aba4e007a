//! Dense materializer: sparse builder columns to aligned, null-filled ones.

use ff_common::{DenseColumn, MaterializedTable};
use ff_config::ColumnOrder;

use crate::table::TableBuilder;

/// Densify one table.
///
/// Each column gets one entry per row in arrival order, `None` where the row
/// did not supply it. Calling this twice without an intervening append
/// returns equal tables.
pub fn materialize(table: &TableBuilder, order: ColumnOrder) -> MaterializedTable {
    let rows = table.rows();

    let mut columns: Vec<DenseColumn> = table
        .columns()
        .map(|(name, column)| DenseColumn {
            name: name.to_string(),
            unit: column.unit().to_string(),
            values: rows.iter().map(|&row| column.get(row)).collect(),
        })
        .collect();

    if order == ColumnOrder::Name {
        columns.sort_by(|a, b| a.name.cmp(&b.name));
    }

    MaterializedTable {
        type_id: table.type_id(),
        name: table.name().to_string(),
        row_count: rows.len(),
        columns,
        unrecognized: table.unrecognized(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_common::{BaseType, Field, RawValue, Record};
    use ff_config::UnrecognizedPolicy;

    fn field(name: &str, units: &str, v: u64) -> Field {
        Field::new(name, units, BaseType::Uint16, RawValue::Unsigned(v))
    }

    fn sample() -> TableBuilder {
        let mut table = TableBuilder::new(20, "record", UnrecognizedPolicy::Null);
        table.append(&Record::new(20, "record").with_field(field("speed", "m/s", 3)));
        table.append(&Record::new(20, "record"));
        table.append(
            &Record::new(20, "record")
                .with_field(field("altitude", "m", 120))
                .with_field(field("speed", "m/s", 4)),
        );
        table
    }

    #[test]
    fn every_column_matches_row_count() {
        let dense = materialize(&sample(), ColumnOrder::Name);
        assert_eq!(dense.row_count, 3);
        for column in &dense.columns {
            assert_eq!(column.values.len(), 3, "column {}", column.name);
        }
    }

    #[test]
    fn gaps_become_none() {
        let dense = materialize(&sample(), ColumnOrder::Name);
        assert_eq!(
            dense.column("speed").unwrap().values,
            vec![Some(3.0), None, Some(4.0)]
        );
        assert_eq!(
            dense.column("altitude").unwrap().values,
            vec![None, None, Some(120.0)]
        );
    }

    #[test]
    fn name_order_is_alphabetical() {
        let dense = materialize(&sample(), ColumnOrder::Name);
        assert_eq!(dense.column_names(), ["altitude", "speed"]);
        assert_eq!(dense.units(), ["m", "m/s"]);
    }

    #[test]
    fn discovery_order_follows_first_sighting() {
        let dense = materialize(&sample(), ColumnOrder::Discovery);
        assert_eq!(dense.column_names(), ["speed", "altitude"]);
        assert_eq!(dense.units(), ["m/s", "m"]);
    }

    #[test]
    fn repeated_materialization_is_identical() {
        let table = sample();
        let first = materialize(&table, ColumnOrder::Name);
        let second = materialize(&table, ColumnOrder::Name);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn table_without_columns_keeps_row_count() {
        let mut table = TableBuilder::new(21, "event", UnrecognizedPolicy::Null);
        table.append(&Record::new(21, "event"));
        table.append(&Record::new(21, "event"));
        let dense = materialize(&table, ColumnOrder::Name);
        assert_eq!(dense.row_count, 2);
        assert!(dense.columns.is_empty());
    }
}
