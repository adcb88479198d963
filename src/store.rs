//! Macro record store
//!
//! Saved macros are records of `{id, description, commands}`. The
//! concrete on-disk store belongs to the surrounding application; this
//! module defines the interface it must satisfy, an in-memory
//! implementation for tests and embedding, and the export/import and
//! search operations that work over any store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::types::MacroRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("macro not found: {0}")]
    NotFound(i64),

    #[error("store backend failed: {0}")]
    Backend(String),
}

/// Record persistence, as the interactive surface consumes it.
#[async_trait]
pub trait MacroStore: Send + Sync {
    async fn list(&self) -> Result<Vec<MacroRecord>, StoreError>;

    async fn create(&self, description: &str, commands: &str) -> Result<MacroRecord, StoreError>;

    async fn update(&self, id: i64, description: &str, commands: &str)
        -> Result<(), StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/* ===================== In-memory store ===================== */

#[derive(Debug, Default)]
struct MemoryStoreInner {
    next_id: i64,
    records: Vec<MacroRecord>,
}

/// Store backed by process memory. Ids are assigned sequentially.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MacroStore for MemoryStore {
    async fn list(&self) -> Result<Vec<MacroRecord>, StoreError> {
        Ok(self.inner.lock().await.records.clone())
    }

    async fn create(&self, description: &str, commands: &str) -> Result<MacroRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let record = MacroRecord {
            id: inner.next_id,
            description: description.to_string(),
            commands: commands.to_string(),
        };
        inner.records.push(record.clone());
        debug!(id = record.id, "macro created");
        Ok(record)
    }

    async fn update(
        &self,
        id: i64,
        description: &str,
        commands: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;
        record.description = description.to_string();
        record.commands = commands.to_string();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.records.len();
        inner.records.retain(|r| r.id != id);
        if inner.records.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

/* ===================== Search ===================== */

/// Case-insensitive substring filter over description and commands.
/// An empty query matches everything.
pub fn search(records: &[MacroRecord], query: &str) -> Vec<MacroRecord> {
    let query = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            query.is_empty()
                || r.description.to_lowercase().contains(&query)
                || r.commands.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/* ===================== Export / import ===================== */

/// A record as it arrives from an import file, before it gets an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedMacro {
    pub description: String,
    pub commands: String,
}

/// Serialize records to the interchange format: a JSON array of
/// `{id, description, commands}` objects.
pub fn export_json(records: &[MacroRecord]) -> Result<String, StoreError> {
    serde_json::to_string_pretty(records).map_err(|e| StoreError::Backend(e.to_string()))
}

/// Parse an interchange file. Entries missing either `description` or
/// `commands` are skipped rather than failing the whole import.
pub fn parse_import(json: &str) -> Result<Vec<ImportedMacro>, StoreError> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| StoreError::Backend(e.to_string()))?;

    Ok(values
        .into_iter()
        .filter_map(|value| {
            let description = value.get("description")?.as_str()?.to_string();
            let commands = value.get("commands")?.as_str()?.to_string();
            if description.is_empty() || commands.is_empty() {
                return None;
            }
            Some(ImportedMacro {
                description,
                commands,
            })
        })
        .collect())
}

/// Import every well-formed entry, assigning fresh ids through the
/// store. Returns how many records were created.
pub async fn import_into(store: &dyn MacroStore, json: &str) -> Result<usize, StoreError> {
    let imported = parse_import(json)?;
    let count = imported.len();
    for macro_def in imported {
        store.create(&macro_def.description, &macro_def.commands).await?;
    }
    Ok(count)
}
