//! Dense table model handed to renderers and exporters.
//!
//! Every column of a [`MaterializedTable`] has exactly `row_count` entries;
//! `None` marks a row that did not supply the column.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// One densified column.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseColumn {
    pub name: String,
    pub unit: String,
    pub values: Vec<Option<f64>>,
}

impl DenseColumn {
    /// Rows holding a value.
    pub fn non_null(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// A record type's rows, densified and column-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedTable {
    pub type_id: u16,
    pub name: String,
    pub row_count: usize,
    pub columns: Vec<DenseColumn>,
    /// Scalars whose encoding could not be widened during ingestion.
    pub unrecognized: u64,
}

impl MaterializedTable {
    pub fn column(&self, name: &str) -> Option<&DenseColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Units parallel to [`MaterializedTable::columns`].
    pub fn units(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.unit.as_str()).collect()
    }
}

struct ColumnValues<'a>(&'a [DenseColumn]);

impl Serialize for ColumnValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for column in self.0 {
            map.serialize_entry(&column.name, &column.values)?;
        }
        map.end()
    }
}

struct ColumnUnits<'a>(&'a [DenseColumn]);

impl Serialize for ColumnUnits<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for column in self.0 {
            map.serialize_entry(&column.name, &column.unit)?;
        }
        map.end()
    }
}

impl Serialize for MaterializedTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MaterializedTable", 5)?;
        state.serialize_field("type_id", &self.type_id)?;
        state.serialize_field("row_count", &self.row_count)?;
        state.serialize_field("columns", &ColumnValues(&self.columns))?;
        state.serialize_field("units", &ColumnUnits(&self.columns))?;
        state.serialize_field("unrecognized", &self.unrecognized)?;
        state.end()
    }
}
