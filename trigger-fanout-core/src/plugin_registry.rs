//! Enumerates the plugins a trigger update must fan out to.

use std::sync::Arc;

use tracing::warn;
use trigger_fanout_shared::contracts::{DbType, ResourceStore};
use trigger_fanout_shared::models::Plugin;
use trigger_fanout_shared::CoreError;

/// Thin wrapper over a `ResourceStore`, grounded on the original's
/// `tmodel.GetAllKeysFromTable("Plugin", common.OnDisk)` followed by a
/// per-key `GetPluginData` fetch.
pub struct PluginRegistry {
    store: Arc<dyn ResourceStore>,
}

impl PluginRegistry {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        PluginRegistry { store }
    }

    /// Lists every registered plugin. A plugin whose individual load fails
    /// is skipped and logged, not treated as a fatal error for the whole
    /// listing -- mirrors `formTargetList`'s skip-and-log behavior in the
    /// original source.
    pub async fn list(&self) -> Result<Vec<Plugin>, CoreError> {
        let keys = self.store.get_all_keys("Plugin", DbType::OnDisk).await?;

        let mut plugins = Vec::with_capacity(keys.len());
        for key in keys {
            match self.store.get_plugin(&key).await {
                Ok(plugin) => plugins.push(plugin),
                Err(err) => warn!(plugin_id = %key, error = %err, "skipping plugin that failed to load"),
            }
        }
        Ok(plugins)
    }
}
