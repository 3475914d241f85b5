//! Record of generated asset files, persisted next to the output.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use storyforge_core::StoryResult;

/// File name of the cache inside the output directory.
pub const CACHE_FILE_NAME: &str = ".storyforge-assets.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Hex content hash of the descriptor the file was rendered from.
    pub hash: String,
    /// Output-relative path of the file, `/`-separated.
    pub path: String,
}

/// Asset name to the file last generated for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache, starting empty when the file is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Self::new();
        };
        match serde_json::from_str(&contents) {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable asset cache");
                Self::new()
            }
        }
    }

    pub fn save(&self, path: &Path) -> StoryResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CacheEntry> {
        self.entries.get(name)
    }

    /// True when `name` was last generated from `hash` at `path` and that
    /// file still exists under `root`.
    pub fn is_fresh(&self, name: &str, hash: &str, path: &str, root: &Path) -> bool {
        self.entries
            .get(name)
            .is_some_and(|e| e.hash == hash && e.path == path && root.join(path).is_file())
    }

    pub fn record(&mut self, name: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(name.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
