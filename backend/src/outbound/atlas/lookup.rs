//! Cached id-to-name tables for mechanics and categories.

use std::collections::HashMap;

use tokio::sync::RwLock;

/// Id-to-name table refreshed on demand.
#[derive(Debug, Default)]
pub(super) struct LookupTable {
    names: RwLock<HashMap<String, String>>,
}

impl LookupTable {
    /// Whether any of `ids` has no cached name.
    pub(super) async fn is_missing_any<'a>(&self, mut ids: impl Iterator<Item = &'a str>) -> bool {
        let names = self.names.read().await;
        ids.any(|id| !names.contains_key(id))
    }

    /// Merge freshly fetched entries into the table.
    pub(super) async fn merge(&self, entries: impl IntoIterator<Item = (String, String)>) {
        self.names.write().await.extend(entries);
    }

    /// Copy of the current table for resolving one response.
    pub(super) async fn snapshot(&self) -> HashMap<String, String> {
        self.names.read().await.clone()
    }
}
