//! Table registry: one builder per record type, in discovery order.

use ff_config::UnrecognizedPolicy;
use indexmap::IndexMap;
use tracing::debug;

use crate::table::TableBuilder;

/// Owns every table discovered in a stream.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: IndexMap<u16, TableBuilder>,
    policy: UnrecognizedPolicy,
}

impl TableRegistry {
    pub fn new(policy: UnrecognizedPolicy) -> Self {
        Self {
            tables: IndexMap::new(),
            policy,
        }
    }

    /// Builder for `type_id`, created at the end of the discovery order on
    /// first sighting.
    pub fn table_mut(&mut self, type_id: u16, type_name: &str) -> &mut TableBuilder {
        let policy = self.policy;
        self.tables.entry(type_id).or_insert_with(|| {
            debug!(type_id, name = type_name, "new table");
            TableBuilder::new(type_id, type_name, policy)
        })
    }

    pub fn get(&self, type_id: u16) -> Option<&TableBuilder> {
        self.tables.get(&type_id)
    }

    /// Tables in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &TableBuilder> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total rows across all tables.
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(TableBuilder::row_count).sum()
    }
}
