//! Per-type table builder.
//!
//! A [`TableBuilder`] accumulates every record of one type. Columns are
//! discovered lazily: the first record that carries a field creates its
//! column, later records only add cells. Cells are sparse; rows that never
//! supplied a field stay empty until densification fills them with nulls.
//!
//! Multi-valued fields expand into one column per value position:
//!
//! ```text
//! position = [a, b, c]  ──►  position_1 = a, position_2 = b, position_3 = c
//! heart_rate = [60]     ──►  heart_rate = 60
//! ```

use std::collections::BTreeMap;
use std::fmt;

use ff_common::{Field, Record};
use ff_config::UnrecognizedPolicy;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Position of a record within its table, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowIndex(pub u64);

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sparse storage for one column.
#[derive(Debug, Clone, Default)]
pub struct Column {
    unit: String,
    cells: BTreeMap<RowIndex, f64>,
    unrecognized: u64,
}

impl Column {
    fn new(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            ..Self::default()
        }
    }

    /// Unit fixed by the first field that created this column.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Value at `row`, if that row supplied one.
    pub fn get(&self, row: RowIndex) -> Option<f64> {
        self.cells.get(&row).copied()
    }

    /// Number of rows holding a value.
    pub fn populated(&self) -> usize {
        self.cells.len()
    }

    /// Number of scalars whose encoding could not be widened.
    pub fn unrecognized(&self) -> u64 {
        self.unrecognized
    }
}

/// Evolving schema and row data for exactly one record type.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    type_id: u16,
    name: String,
    rows: Vec<RowIndex>,
    counter: u64,
    columns: IndexMap<String, Column>,
    policy: UnrecognizedPolicy,
}

impl TableBuilder {
    pub fn new(type_id: u16, name: impl Into<String>, policy: UnrecognizedPolicy) -> Self {
        Self {
            type_id,
            name: name.into(),
            rows: Vec::new(),
            counter: 0,
            columns: IndexMap::new(),
            policy,
        }
    }

    pub fn type_id(&self) -> u16 {
        self.type_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Row indices in arrival order.
    pub fn rows(&self) -> &[RowIndex] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Columns in discovery order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, col)| (name.as_str(), col))
    }

    /// Unrecognized scalars across all columns.
    pub fn unrecognized(&self) -> u64 {
        self.columns.values().map(Column::unrecognized).sum()
    }

    /// Append one record as a new row.
    ///
    /// The row is recorded even when the record carries no fields.
    pub fn append(&mut self, record: &Record) -> RowIndex {
        self.counter += 1;
        let row = RowIndex(self.counter);
        self.rows.push(row);

        for field in &record.fields {
            let k = field.num_values();
            if k == 1 {
                self.insert(&field.name, field, 0, row);
            } else {
                for j in 0..k {
                    let name = format!("{}_{}", field.name, j + 1);
                    self.insert(&name, field, j, row);
                }
            }
        }
        row
    }

    fn insert(&mut self, column_name: &str, field: &Field, index: usize, row: RowIndex) {
        if !self.columns.contains_key(column_name) {
            debug!(
                table = %self.name,
                column = column_name,
                unit = %field.units,
                "new column"
            );
            self.columns
                .insert(column_name.to_string(), Column::new(&field.units));
        }
        let Some(column) = self.columns.get_mut(column_name) else {
            return;
        };

        if column.unit != field.units {
            debug!(
                table = %self.name,
                column = column_name,
                kept = %column.unit,
                discarded = %field.units,
                "conflicting unit ignored"
            );
        }

        let value = match field.value_as_f64(index) {
            Some(v) => Some(v),
            None => {
                if column.unrecognized == 0 {
                    warn!(
                        table = %self.name,
                        column = column_name,
                        base_type = %field.base_type,
                        policy = ?self.policy,
                        "unrecognized field encoding"
                    );
                }
                column.unrecognized += 1;
                self.policy.substitute()
            }
        };

        match value {
            Some(v) => {
                column.cells.insert(row, v);
            }
            None => {
                column.cells.remove(&row);
            }
        }
    }
}
