use doctopdf_core::{prepend_bounded, ConversionRecord, HISTORY_CAPACITY};
use doctopdf_logging::{dtp_debug, dtp_info, dtp_warn};
use serde_json::Value;

use crate::store::KeyValueStore;

/// Storage key of the serialized history list.
pub const HISTORY_KEY: &str = "doctopdf_history";

/// Best-effort persistence of the bounded conversion history.
///
/// Storage failures are logged and swallowed; the in-memory list stays
/// authoritative for the current session.
pub struct HistoryStore<S: KeyValueStore> {
    store: S,
    records: Vec<ConversionRecord>,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            records: Vec::new(),
        }
    }

    /// Reads the persisted list. Missing, unreadable or malformed data yields an empty list.
    pub fn load(&mut self) -> Vec<ConversionRecord> {
        self.records = self.read_persisted();
        dtp_debug!("Loaded {} history records", self.records.len());
        self.records.clone()
    }

    /// Prepends `record`, keeps the newest [`HISTORY_CAPACITY`], and persists the whole list.
    pub fn append(&mut self, record: ConversionRecord) -> Vec<ConversionRecord> {
        prepend_bounded(&mut self.records, record);
        self.persist();
        self.records.clone()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        if let Err(err) = self.store.remove(HISTORY_KEY) {
            dtp_warn!("Failed to remove persisted history: {}", err);
        } else {
            dtp_info!("History cleared");
        }
    }

    pub fn records(&self) -> &[ConversionRecord] {
        &self.records
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_persisted(&self) -> Vec<ConversionRecord> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                dtp_warn!("Failed to read persisted history: {}", err);
                return Vec::new();
            }
        };
        let items = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                dtp_warn!("Persisted history is not a list; ignoring it");
                return Vec::new();
            }
            Err(err) => {
                dtp_warn!("Failed to parse persisted history: {}", err);
                return Vec::new();
            }
        };

        let total = items.len();
        let mut records: Vec<ConversionRecord> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if records.len() < total {
            dtp_warn!(
                "Skipped {} malformed history entries",
                total - records.len()
            );
        }
        records.truncate(HISTORY_CAPACITY);
        records
    }

    fn persist(&mut self) {
        let blob = match serde_json::to_string(&self.records) {
            Ok(blob) => blob,
            Err(err) => {
                dtp_warn!("Failed to serialize history: {}", err);
                return;
            }
        };
        if let Err(err) = self.store.set(HISTORY_KEY, &blob) {
            dtp_warn!("Failed to persist history: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryKeyValueStore;
    use doctopdf_core::Artifact;

    fn record(id: u64) -> ConversionRecord {
        ConversionRecord {
            id,
            source_url: format!("https://docs.example.com/page/{id}"),
            title: format!("Page {id}"),
            created_at: "2026-03-01T12:00:00Z".to_string(),
            artifacts: vec![Artifact::new(format!("https://files.example.com/{id}.pdf"))],
        }
    }

    #[test]
    fn append_keeps_the_newest_records_first() {
        let mut history = HistoryStore::new(MemoryKeyValueStore::new());
        for id in 1..=21 {
            history.append(record(id));
        }

        let ids: Vec<u64> = history.records().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), HISTORY_CAPACITY);
        assert_eq!(ids.first(), Some(&21));
        assert_eq!(ids.last(), Some(&2));

        let mut reloaded = HistoryStore::new(history.store().clone());
        assert_eq!(reloaded.load(), history.records());
    }

    #[test]
    fn clear_then_load_is_empty() {
        let mut history = HistoryStore::new(MemoryKeyValueStore::new());
        history.append(record(1));
        history.clear();

        assert!(history.records().is_empty());
        assert!(history.store().raw(HISTORY_KEY).is_none());
        assert!(history.load().is_empty());
    }

    #[test]
    fn write_failure_keeps_memory_copy() {
        let mut store = MemoryKeyValueStore::new();
        store.set_fail_writes(true);
        let mut history = HistoryStore::new(store);

        let records = history.append(record(5));
        assert_eq!(records.len(), 1);
        assert!(history.store().raw(HISTORY_KEY).is_none());

        history.clear();
        assert!(history.records().is_empty());
    }

    #[test]
    fn corrupt_or_non_list_blob_loads_as_empty() {
        for blob in ["{not json", r#"{"id": 1}"#, "42"] {
            let store = MemoryKeyValueStore::new().with_entry(HISTORY_KEY, blob);
            let mut history = HistoryStore::new(store);
            assert!(history.load().is_empty(), "blob {blob:?}");
        }
    }

    #[test]
    fn malformed_entries_are_skipped_and_list_is_truncated() {
        let mut items: Vec<Value> = (1..=25)
            .map(|id| serde_json::to_value(record(id)).unwrap())
            .collect();
        items.insert(0, serde_json::json!({"title": "missing fields"}));
        let blob = serde_json::to_string(&items).unwrap();

        let store = MemoryKeyValueStore::new().with_entry(HISTORY_KEY, blob);
        let mut history = HistoryStore::new(store);
        let loaded = history.load();
        assert_eq!(loaded.len(), HISTORY_CAPACITY);
        assert_eq!(loaded[0].id, 1);
    }
}
