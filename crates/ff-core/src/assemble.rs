//! Output assembly: every table, materialized, keyed by friendly name.

use ff_common::MaterializedTable;
use ff_config::ColumnOrder;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::materialize::materialize;
use crate::registry::TableRegistry;

/// Ordered association from table key to dense table.
///
/// Keys are friendly type names. When two type ids share a name, the table
/// discovered later is keyed `<name>_<type_id>`, repeating the suffix until
/// the key is free.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Assembly {
    tables: IndexMap<String, MaterializedTable>,
}

impl Assembly {
    pub fn get(&self, key: &str) -> Option<&MaterializedTable> {
        self.tables.get(key)
    }

    /// Tables in type-discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterializedTable)> {
        self.tables.iter().map(|(k, t)| (k.as_str(), t))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.tables.values().map(|t| t.row_count).sum()
    }

    /// Keep only the named tables, preserving order.
    pub fn retain_keys(&mut self, keys: &[String]) {
        self.tables.retain(|k, _| keys.iter().any(|want| want == k));
    }
}

/// Materialize every table in discovery order.
pub fn assemble(registry: &TableRegistry, order: ColumnOrder) -> Assembly {
    let mut tables = IndexMap::with_capacity(registry.len());

    for builder in registry.iter() {
        let table = materialize(builder, order);
        let mut key = table.name.clone();
        if tables.contains_key(&key) {
            while tables.contains_key(&key) {
                key = format!("{key}_{}", table.type_id);
            }
            warn!(
                name = %table.name,
                type_id = table.type_id,
                key = %key,
                "duplicate table name, keyed by type id"
            );
        }
        tables.insert(key, table);
    }

    Assembly { tables }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_common::{BaseType, Field, RawValue, Record};
    use ff_config::UnrecognizedPolicy;

    #[test]
    fn tables_follow_discovery_order() {
        let mut registry = TableRegistry::new(UnrecognizedPolicy::Null);
        registry.table_mut(20, "record").append(&Record::new(20, "record"));
        registry.table_mut(0, "file_id").append(&Record::new(0, "file_id"));

        let assembly = assemble(&registry, ColumnOrder::Name);
        let keys: Vec<&str> = assembly.keys().collect();
        assert_eq!(keys, ["record", "file_id"]);
        assert_eq!(assembly.total_rows(), 2);
    }

    #[test]
    fn duplicate_names_are_disambiguated() {
        let mut registry = TableRegistry::new(UnrecognizedPolicy::Null);
        registry.table_mut(0xFF00, "unknown").append(&Record::new(0xFF00, "unknown"));
        registry.table_mut(0xFF01, "unknown").append(&Record::new(0xFF01, "unknown"));

        let assembly = assemble(&registry, ColumnOrder::Name);
        let keys: Vec<&str> = assembly.keys().collect();
        assert_eq!(keys, ["unknown", "unknown_65281"]);
        assert_eq!(assembly.get("unknown_65281").unwrap().type_id, 0xFF01);
    }

    #[test]
    fn fallback_key_never_overwrites_an_existing_table() {
        let mut registry = TableRegistry::new(UnrecognizedPolicy::Null);
        registry.table_mut(1, "x_2").append(&Record::new(1, "x_2"));
        registry.table_mut(3, "x").append(&Record::new(3, "x"));
        registry.table_mut(2, "x").append(&Record::new(2, "x"));

        let assembly = assemble(&registry, ColumnOrder::Name);
        assert_eq!(assembly.len(), registry.len());
        let keys: Vec<&str> = assembly.keys().collect();
        assert_eq!(keys, ["x_2", "x", "x_2_2"]);
        assert_eq!(assembly.get("x_2").unwrap().type_id, 1);
        assert_eq!(assembly.get("x").unwrap().type_id, 3);
        assert_eq!(assembly.get("x_2_2").unwrap().type_id, 2);
    }

    #[test]
    fn retain_keys_filters_in_place() {
        let mut registry = TableRegistry::new(UnrecognizedPolicy::Null);
        registry.table_mut(20, "record");
        registry.table_mut(18, "session");
        registry.table_mut(19, "lap");

        let mut assembly = assemble(&registry, ColumnOrder::Name);
        assembly.retain_keys(&["lap".to_string(), "record".to_string()]);
        let keys: Vec<&str> = assembly.keys().collect();
        assert_eq!(keys, ["record", "lap"]);
    }

    #[test]
    fn serializes_as_ordered_object() {
        let mut registry = TableRegistry::new(UnrecognizedPolicy::Null);
        let hr = Field::new("heart_rate", "bpm", BaseType::Uint8, RawValue::Unsigned(60));
        registry
            .table_mut(20, "record")
            .append(&Record::new(20, "record").with_field(hr));
        registry.table_mut(18, "session");

        let json = serde_json::to_string(&assemble(&registry, ColumnOrder::Name)).unwrap();
        assert!(json.starts_with(r#"{"record":{"type_id":20,"row_count":1"#));
        assert!(json.contains(r#""session":{"type_id":18,"row_count":0"#));
    }
}
