use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::CoreError;
use crate::models::Plugin;

/// Which backing table a key belongs to, mirroring the original's
/// `common.OnDisk` / `common.InMemory` database selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    InMemory,
    OnDisk,
}

/// External key-value store backing the plugin registry and the telemetry
/// resource collections. Out of scope to implement against a real store
/// (Postgres/etcd/whatever ODIM uses in production); this crate only needs
/// the contract plus a fake for tests.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn get_all_keys(&self, table: &str, db: DbType) -> Result<Vec<String>, CoreError>;

    /// Fetches a single resource. Implementations should return
    /// `CoreError::NotFound` (not a generic error) when the key is absent,
    /// so callers can map it straight to a 404.
    async fn get_resource(&self, table: &str, key: &str, db: DbType) -> Result<JsonValue, CoreError>;

    async fn get_plugin(&self, id: &str) -> Result<Plugin, CoreError>;
}

/// Deterministic in-memory fake used by tests and local development. Not a
/// production store.
#[derive(Default)]
pub struct InMemoryResourceStore {
    tables: RwLock<HashMap<String, HashMap<String, JsonValue>>>,
    plugins: RwLock<HashMap<String, Plugin>>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_resource(&self, table: &str, key: &str, value: JsonValue) {
        self.tables
            .write()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn put_plugin(&self, plugin: Plugin) {
        self.plugins.write().unwrap().insert(plugin.id.clone(), plugin);
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn get_all_keys(&self, table: &str, _db: DbType) -> Result<Vec<String>, CoreError> {
        if table == "Plugin" {
            return Ok(self.plugins.read().unwrap().keys().cloned().collect());
        }
        Ok(self
            .tables
            .read()
            .unwrap()
            .get(table)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_resource(&self, table: &str, key: &str, _db: DbType) -> Result<JsonValue, CoreError> {
        self.tables
            .read()
            .unwrap()
            .get(table)
            .and_then(|entries| entries.get(key))
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("{table}/{key}")))
    }

    async fn get_plugin(&self, id: &str) -> Result<Plugin, CoreError> {
        self.plugins
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("Plugin/{id}")))
    }
}
