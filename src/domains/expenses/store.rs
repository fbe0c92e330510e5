//! Record Store: the canonical expense collection and its on-disk mirror.
//!
//! The in-memory collection is a per-operation snapshot rather than a
//! long-lived authoritative cache: callers reload before every operation
//! that needs a current view and persist after mutating. There is no
//! locking; two concurrent read-modify-persist sequences can race and the
//! later persist wins.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, error, warn};

use super::record::ExpenseRecord;
use super::validate::repair;
use crate::core::config::StoreConfig;

/// The expense collection plus persistence over a whole-file JSON document.
#[derive(Debug, Clone)]
pub struct ExpenseStore {
    data_file: PathBuf,
    records: Vec<ExpenseRecord>,
}

impl ExpenseStore {
    /// Create a store over the configured data file. The collection starts
    /// empty; call [`load`](Self::load) before reading.
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_data_file(config.data_file.clone())
    }

    /// Create a store over an explicit data file path.
    pub fn with_data_file(data_file: PathBuf) -> Self {
        Self {
            data_file,
            records: Vec::new(),
        }
    }

    /// Current in-memory snapshot, insertion-ordered.
    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    /// Consume the store, returning the snapshot.
    pub fn into_records(self) -> Vec<ExpenseRecord> {
        self.records
    }

    /// Reload the collection from the persisted document.
    ///
    /// A missing document is initialized to an empty sequence and persisted.
    /// A malformed document (unparseable, or not an array) leaves the
    /// collection empty; the condition is logged, never raised. Elements are
    /// re-hydrated through lenient repair, so no record is dropped.
    pub async fn load(&mut self) {
        let contents = match tokio::fs::read_to_string(&self.data_file).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "Expense document {} not found; initializing empty",
                    self.data_file.display()
                );
                self.records = Vec::new();
                self.persist().await;
                return;
            }
            Err(e) => {
                warn!(
                    "Failed to read expense document {}: {}",
                    self.data_file.display(),
                    e
                );
                self.records = Vec::new();
                return;
            }
        };

        self.records = match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Array(items)) => items.iter().map(repair).collect(),
            Ok(_) => {
                warn!(
                    "Expense document {} is not an array; treating as empty",
                    self.data_file.display()
                );
                Vec::new()
            }
            Err(e) => {
                warn!(
                    "Failed to parse expense document {}: {}",
                    self.data_file.display(),
                    e
                );
                Vec::new()
            }
        };
    }

    /// Append a record to the end of the in-memory sequence.
    ///
    /// The append is durable only after a subsequent [`persist`](Self::persist).
    pub fn append(&mut self, record: ExpenseRecord) {
        self.records.push(record);
    }

    /// Overwrite the document with the full in-memory collection.
    ///
    /// Write failures are logged and not raised: the in-memory state stays
    /// authoritative for the current process.
    pub async fn persist(&self) {
        let json = match serde_json::to_string_pretty(&self.records) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize expenses: {}", e);
                return;
            }
        };

        if let Err(e) = tokio::fs::write(&self.data_file, json).await {
            error!(
                "Failed to persist expenses to {}: {}",
                self.data_file.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store(dir: &TempDir) -> ExpenseStore {
        ExpenseStore::with_data_file(dir.path().join("expenses.json"))
    }

    #[tokio::test]
    async fn test_load_missing_file_initializes_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = temp_store(&dir);

        store.load().await;

        assert!(store.records().is_empty());
        // The empty state was persisted, so the document now exists.
        let contents = std::fs::read_to_string(dir.path().join("expenses.json")).unwrap();
        assert_eq!(contents.trim(), "[]");
    }

    #[tokio::test]
    async fn test_persist_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut store = temp_store(&dir);
        store.load().await;

        store.append(ExpenseRecord::new("Coffee", 4.5));
        store.append(ExpenseRecord::new("Bus", 2.25));
        store.persist().await;

        let mut reloaded = temp_store(&dir);
        reloaded.load().await;
        assert_eq!(reloaded.records(), store.records());

        // Idempotent under repeated reload with no intervening writes.
        let snapshot = reloaded.records().to_vec();
        reloaded.load().await;
        assert_eq!(reloaded.records(), snapshot.as_slice());
    }

    #[tokio::test]
    async fn test_load_preserves_insertion_order() {
        let dir = TempDir::new().unwrap();
        let mut store = temp_store(&dir);
        store.load().await;
        for i in 0..5 {
            store.append(ExpenseRecord::new(format!("item-{}", i), i as f64));
        }
        store.persist().await;

        let mut reloaded = temp_store(&dir);
        reloaded.load().await;
        let names: Vec<_> = reloaded.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["item-0", "item-1", "item-2", "item-3", "item-4"]);
    }

    #[tokio::test]
    async fn test_load_recovers_from_unparseable_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("expenses.json"), "not json at all {{{").unwrap();

        let mut store = temp_store(&dir);
        store.load().await;
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_load_recovers_from_non_array_document() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("expenses.json"), r#"{"expenses": []}"#).unwrap();

        let mut store = temp_store(&dir);
        store.load().await;
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_load_repairs_corrupt_elements() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("expenses.json"),
            r#"[{"name": "Lunch", "amount": "bad"}, null, {"id": "keep", "name": "Tea", "amount": 1.5}]"#,
        )
        .unwrap();

        let mut store = temp_store(&dir);
        store.load().await;

        // No record is dropped; bad fields get safe defaults.
        assert_eq!(store.records().len(), 3);
        assert_eq!(store.records()[0].name, "Lunch");
        assert_eq!(store.records()[0].amount, 0.0);
        assert!(!store.records()[1].id.is_empty());
        assert_eq!(store.records()[2].id, "keep");
        assert_eq!(store.records()[2].amount, 1.5);
    }

    #[tokio::test]
    async fn test_persist_failure_is_not_raised() {
        let dir = TempDir::new().unwrap();
        // Pointing the data file at a directory makes the write fail.
        let mut store = ExpenseStore::with_data_file(dir.path().to_path_buf());
        store.append(ExpenseRecord::new("Coffee", 4.5));
        store.persist().await;
        // In-memory state is still authoritative.
        assert_eq!(store.records().len(), 1);
    }
}
