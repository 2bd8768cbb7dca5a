use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Process-wide sidecar state. The store is owned here and released explicitly.
#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Store>,
}

impl AppState {
    /// Opens `path` as the active workspace, closing any previous one first.
    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<&Store> {
        self.close_workspace();
        let store = Store::open(path)?;
        tracing::info!(workspace = %path.display(), "workspace selected");
        self.workspace = Some(path.to_path_buf());
        Ok(self.store.insert(store))
    }

    /// Returns whether a store was open.
    pub fn close_workspace(&mut self) -> bool {
        self.workspace = None;
        let Some(store) = self.store.take() else {
            return false;
        };
        let workspace = store.workspace().to_path_buf();
        if let Err(e) = store.close() {
            tracing::warn!(workspace = %workspace.display(), error = %e, "store close failed");
        }
        true
    }
}
