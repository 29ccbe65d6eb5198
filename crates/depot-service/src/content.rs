//! Content addressing — hashing and deduplication lookup.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use depot_core::result::AppResult;
use depot_database::repositories::file::FileRepository;

/// Compute the SHA-256 content hash of a byte buffer, lowercase hex.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Deduplication lookup over the metadata store.
///
/// Hash equality is trusted as content equality; there is no secondary
/// byte comparison. The lookup is scoped to a tenant namespace because
/// blob keys are content-addressed within each group's bucket — a hit
/// means the bytes are already present where the caller will read them.
#[derive(Debug, Clone)]
pub struct ContentAddressor {
    file_repo: Arc<FileRepository>,
}

impl ContentAddressor {
    /// Creates a new content addressor.
    pub fn new(file_repo: Arc<FileRepository>) -> Self {
        Self { file_repo }
    }

    /// Whether the bytes behind `hash` are already stored in the group's
    /// bucket (referenced by any file or version there).
    pub async fn is_stored(&self, group_key: &str, hash: &str) -> AppResult<bool> {
        self.file_repo
            .hash_referenced_in_group(group_key, hash)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            content_hash(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn identical_content_hashes_identically() {
        assert_eq!(content_hash(b"same bytes"), content_hash(b"same bytes"));
        assert_ne!(content_hash(b"same bytes"), content_hash(b"other bytes"));
    }
}
