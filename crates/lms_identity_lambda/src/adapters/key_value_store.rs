use std::collections::HashMap;
use std::sync::Mutex;

use lms_identity_core::contract::StoreItem;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Put,
    Get,
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Put => f.write_str("put_item"),
            Self::Get => f.write_str("get_item"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} on table '{table}' failed: {detail}")]
pub struct StoreError {
    pub operation: StoreOperation,
    pub table: String,
    pub detail: String,
}

impl StoreError {
    pub fn new(operation: StoreOperation, table: &str, detail: impl Into<String>) -> Self {
        Self {
            operation,
            table: table.to_string(),
            detail: detail.into(),
        }
    }
}

/// Point reads and upserts against named tables.
pub trait KeyValueStore: Send + Sync {
    /// Replaces any existing item with the same primary key.
    fn put_item(&self, table: &str, item: StoreItem) -> Result<(), StoreError>;

    fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key: &str,
    ) -> Result<Option<StoreItem>, StoreError>;
}

/// Process-local store used for local runs and tests.
///
/// Items are keyed by the string value of their `key_name` attribute.
#[derive(Debug)]
pub struct InMemoryKeyValueStore {
    key_name: String,
    tables: Mutex<HashMap<String, HashMap<String, StoreItem>>>,
}

impl InMemoryKeyValueStore {
    pub fn new(key_name: impl Into<String>) -> Self {
        Self {
            key_name: key_name.into(),
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn item_count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .map(|tables| tables.get(table).map_or(0, HashMap::len))
            .unwrap_or(0)
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn put_item(&self, table: &str, item: StoreItem) -> Result<(), StoreError> {
        let key = match item.get(&self.key_name) {
            Some(Value::String(key)) => key.clone(),
            _ => {
                return Err(StoreError::new(
                    StoreOperation::Put,
                    table,
                    format!("item is missing string key attribute '{}'", self.key_name),
                ))
            }
        };

        let mut tables = self
            .tables
            .lock()
            .map_err(|_| StoreError::new(StoreOperation::Put, table, "store lock poisoned"))?;
        tables.entry(table.to_string()).or_default().insert(key, item);
        Ok(())
    }

    fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key: &str,
    ) -> Result<Option<StoreItem>, StoreError> {
        if key_name != self.key_name {
            return Err(StoreError::new(
                StoreOperation::Get,
                table,
                format!("unknown key attribute '{key_name}'"),
            ));
        }

        let tables = self
            .tables
            .lock()
            .map_err(|_| StoreError::new(StoreOperation::Get, table, "store lock poisoned"))?;
        Ok(tables.get(table).and_then(|items| items.get(key)).cloned())
    }
}
