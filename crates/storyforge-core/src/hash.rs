//! SHA-256 digests identifying generated asset content.
//!
//! An unchanged descriptor hashes to the same digest on every run, which is
//! what lets the asset cache skip re-rendering.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

/// Hex characters kept in generated file names.
pub const SHORT_HASH_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn to_hex(&self) -> String {
        self.0.iter().fold(String::with_capacity(64), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
    }

    /// Leading [`SHORT_HASH_LEN`] hex characters, used for file names.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(SHORT_HASH_LEN);
        hex
    }

    pub fn digest(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Length-prefixed SHA-256 of `data`.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    let digest = Sha256::new()
        .chain_update((data.len() as u64).to_le_bytes())
        .chain_update(data)
        .finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    ContentHash(bytes)
}

/// Hash of a value's JSON encoding. Struct fields serialize in declaration
/// order, so equal values always produce equal digests.
pub fn hash_json<T: serde::Serialize>(value: &T) -> crate::StoryResult<ContentHash> {
    let data = serde_json::to_vec(value)?;
    Ok(hash_bytes(&data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_input_equal_digest() {
        assert_eq!(hash_bytes(b"glow"), hash_bytes(b"glow"));
        assert_ne!(hash_bytes(b"glow"), hash_bytes(b"flare"));
    }

    #[test]
    fn test_json_digest_tracks_fields() {
        let a = serde_json::json!({"kind": "solid", "width": 4});
        let b = serde_json::json!({"kind": "solid", "width": 8});
        assert_ne!(hash_json(&a).unwrap(), hash_json(&b).unwrap());
        assert_eq!(hash_json(&a).unwrap(), hash_json(&a).unwrap());
    }

    #[test]
    fn test_hex_and_short_forms() {
        let hash = hash_bytes(&[]);
        let hex = hash.to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash.short(), hex[..SHORT_HASH_LEN]);
        assert_eq!(hash.to_string(), hex);
    }
}
