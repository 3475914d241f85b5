//! Generatable asset descriptors and the registry scripts record them in.
//!
//! A script calls `get_asset(name, descriptor)` and receives a path token
//! (`asset://name`) it can hand to `create_sprite`. The materialization
//! step later swaps every token for the relative path of a generated file.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use storyforge_core::hash::hash_json;
use storyforge_core::{CommandColor, ContentHash, StoryError, StoryResult};

/// Prefix marking an element path as a reference to a registered descriptor.
pub const ASSET_TOKEN_PREFIX: &str = "asset://";

/// Largest edge accepted for a generated image.
pub const MAX_ASSET_EDGE: u32 = 4096;

/// A procedurally generated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetDescriptor {
    SolidImage {
        width: u32,
        height: u32,
        color: CommandColor,
    },
    LinearGradient {
        width: u32,
        height: u32,
        from: CommandColor,
        to: CommandColor,
        /// Top-to-bottom when set, left-to-right otherwise.
        vertical: bool,
    },
}

impl AssetDescriptor {
    pub fn solid(width: u32, height: u32, color: CommandColor) -> Self {
        AssetDescriptor::SolidImage {
            width,
            height,
            color,
        }
    }

    pub fn gradient(width: u32, height: u32, from: CommandColor, to: CommandColor, vertical: bool) -> Self {
        AssetDescriptor::LinearGradient {
            width,
            height,
            from,
            to,
            vertical,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            AssetDescriptor::SolidImage { width, height, .. }
            | AssetDescriptor::LinearGradient { width, height, .. } => (*width, *height),
        }
    }

    pub fn validate(&self) -> StoryResult<()> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 || width > MAX_ASSET_EDGE || height > MAX_ASSET_EDGE {
            return Err(StoryError::InvalidArgument(format!(
                "asset size {width}x{height} is outside 1..={MAX_ASSET_EDGE}"
            )));
        }
        Ok(())
    }

    /// SHA-256 of the descriptor's canonical JSON.
    pub fn content_hash(&self) -> StoryResult<ContentHash> {
        hash_json(self)
    }

    /// File name of the generated asset, derived from its content hash.
    pub fn file_name(&self) -> StoryResult<String> {
        Ok(format!("{}.png", self.content_hash()?.short()))
    }
}

/// Turn an asset name into the token scripts place in element paths.
pub fn asset_token(name: &str) -> String {
    format!("{ASSET_TOKEN_PREFIX}{name}")
}

/// Name inside an asset token, or `None` for a literal file path.
pub fn token_name(path: &str) -> Option<&str> {
    path.strip_prefix(ASSET_TOKEN_PREFIX)
}

/// Registers descriptors on behalf of scripts.
pub trait AssetProvider: Send + Sync {
    /// Record `descriptor` under `name` and return the path token for it.
    fn register(&self, name: &str, descriptor: AssetDescriptor) -> StoryResult<String>;

    fn resolve(&self, name: &str) -> Option<AssetDescriptor>;
}

/// Concurrent descriptor registry shared by every script of a run.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    descriptors: DashMap<String, AssetDescriptor>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.descriptors.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl AssetProvider for AssetRegistry {
    fn register(&self, name: &str, descriptor: AssetDescriptor) -> StoryResult<String> {
        if name.trim().is_empty() {
            return Err(StoryError::InvalidArgument("asset name is empty".to_string()));
        }
        descriptor.validate()?;
        match self.descriptors.entry(name.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                if existing.get() != &descriptor {
                    return Err(StoryError::contract(format!(
                        "asset '{name}' is already registered with a different descriptor"
                    )));
                }
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(descriptor);
            }
        }
        Ok(asset_token(name))
    }

    fn resolve(&self, name: &str) -> Option<AssetDescriptor> {
        self.descriptors.get(name).map(|d| d.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_returns_token() {
        let registry = AssetRegistry::new();
        let token = registry
            .register("glow", AssetDescriptor::solid(8, 8, CommandColor::WHITE))
            .unwrap();
        assert_eq!(token, "asset://glow");
        assert_eq!(token_name(&token), Some("glow"));
        assert_eq!(token_name("sb/glow.png"), None);
        assert!(registry.resolve("glow").is_some());
    }

    #[test]
    fn test_conflicting_registration_rejected() {
        let registry = AssetRegistry::new();
        let white = AssetDescriptor::solid(8, 8, CommandColor::WHITE);
        registry.register("glow", white.clone()).unwrap();
        assert!(registry.register("glow", white).is_ok());
        let err = registry
            .register("glow", AssetDescriptor::solid(8, 8, CommandColor::BLACK))
            .unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        let registry = AssetRegistry::new();
        assert!(registry
            .register("zero", AssetDescriptor::solid(0, 8, CommandColor::WHITE))
            .is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_file_name_follows_content() {
        let a = AssetDescriptor::gradient(4, 4, CommandColor::BLACK, CommandColor::WHITE, true);
        let b = AssetDescriptor::gradient(4, 4, CommandColor::BLACK, CommandColor::WHITE, false);
        assert_eq!(a.file_name().unwrap(), a.clone().file_name().unwrap());
        assert_ne!(a.file_name().unwrap(), b.file_name().unwrap());
        assert!(a.file_name().unwrap().ends_with(".png"));
    }
}
