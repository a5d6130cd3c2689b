use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::{BlobResult, ByteStream};

/// Core blob storage operations - must be implemented by all storage backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob from a stream, replacing any existing object at `key`.
    ///
    /// `content_type` is a hint. A backend may keep it, or may derive the
    /// type on read from the key instead, so `get` and `head` can report a
    /// different value than the one passed here.
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> BlobResult<PutResult>;

    /// Get a blob as a stream. `content_type` is whatever the backend
    /// knows about the object, see [`BlobStore::put`].
    async fn get(&self, key: &str) -> BlobResult<GetResult>;

    /// Get blob metadata without content
    async fn head(&self, key: &str) -> BlobResult<ObjectHead>;

    /// Delete a blob. Missing keys fail with `BlobError::NotFound`.
    async fn delete(&self, key: &str) -> BlobResult<()>;
}

/// Result of a successful put operation
#[derive(Debug, Clone)]
pub struct PutResult {
    pub size_bytes: u64,
    /// sha256 hex of the stored bytes.
    pub checksum: Option<String>,
}

/// Result of a get operation
pub struct GetResult {
    pub stream: ByteStream,
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

impl std::fmt::Debug for GetResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetResult")
            .field("size_bytes", &self.size_bytes)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Metadata about a blob
#[derive(Debug, Clone)]
pub struct ObjectHead {
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<i64>,
}

/// Lowercase sha256 hex of `data`.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Strategy for naming blobs and mapping names to storage keys
pub trait BlobKeyStrategy: Send + Sync {
    /// Name a blob from its bytes and optional extension.
    fn blob_name(&self, data: &[u8], extension: Option<&str>) -> String;

    /// Storage key for `name` inside `namespace`.
    fn object_key(&self, namespace: &str, name: &str) -> String;
}

/// Default strategy: `<sha256>.<ext>` stored at `<namespace>/<name>`.
///
/// Identical uploads share one name, so re-uploading the same image is
/// an idempotent overwrite.
#[derive(Debug, Clone, Default)]
pub struct ContentHashKeys;

impl BlobKeyStrategy for ContentHashKeys {
    fn blob_name(&self, data: &[u8], extension: Option<&str>) -> String {
        let hash = content_hash(data);
        match extension.map(|e| e.trim_start_matches('.')).filter(|e| !e.is_empty()) {
            Some(ext) => format!("{hash}.{}", ext.to_ascii_lowercase()),
            None => hash,
        }
    }

    fn object_key(&self, namespace: &str, name: &str) -> String {
        let namespace = namespace.trim_matches('/');
        if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}/{name}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_matches_known_digest() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn names_are_content_derived() {
        let keys = ContentHashKeys;
        let a = keys.blob_name(b"same bytes", Some("JPG"));
        let b = keys.blob_name(b"same bytes", Some(".jpg"));
        assert_eq!(a, b);
        assert!(a.ends_with(".jpg"));
        assert_eq!(a.len(), 64 + 4);
        assert_ne!(a, keys.blob_name(b"other bytes", Some("jpg")));
        assert_eq!(keys.blob_name(b"x", None).len(), 64);
    }

    #[test]
    fn object_keys_are_namespaced() {
        let keys = ContentHashKeys;
        assert_eq!(keys.object_key("blogs", "a.png"), "blogs/a.png");
        assert_eq!(keys.object_key("/blogs/", "a.png"), "blogs/a.png");
        assert_eq!(keys.object_key("", "a.png"), "a.png");
    }
}
