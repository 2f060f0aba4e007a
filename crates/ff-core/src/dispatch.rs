//! Record dispatcher: the single entry point decoders push records into.

use ff_common::{Record, RecordSink};
use ff_config::UnrecognizedPolicy;

use crate::registry::TableRegistry;

/// Routes each record to the table of its type.
#[derive(Debug, Default)]
pub struct RecordDispatcher {
    registry: TableRegistry,
    ingested: u64,
}

impl RecordDispatcher {
    pub fn new(policy: UnrecognizedPolicy) -> Self {
        Self {
            registry: TableRegistry::new(policy),
            ingested: 0,
        }
    }

    /// Records received so far.
    pub fn ingested(&self) -> u64 {
        self.ingested
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Hand the accumulated tables over for assembly.
    pub fn into_registry(self) -> TableRegistry {
        self.registry
    }
}

impl RecordSink for RecordDispatcher {
    fn ingest(&mut self, record: &Record) {
        self.registry
            .table_mut(record.type_id, &record.type_name)
            .append(record);
        self.ingested += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff_common::{BaseType, Field, RawValue};

    #[test]
    fn routes_by_type_id() {
        let mut dispatcher = RecordDispatcher::new(UnrecognizedPolicy::Null);
        let hr = Field::new("heart_rate", "bpm", BaseType::Uint8, RawValue::Unsigned(60));

        dispatcher.ingest(&Record::new(20, "record").with_field(hr.clone()));
        dispatcher.ingest(&Record::new(18, "session"));
        dispatcher.ingest(&Record::new(20, "record").with_field(hr));

        assert_eq!(dispatcher.ingested(), 3);
        let registry = dispatcher.into_registry();
        assert_eq!(registry.get(20).unwrap().row_count(), 2);
        assert_eq!(registry.get(18).unwrap().row_count(), 1);
        assert_eq!(registry.total_rows(), 3);
    }
}
