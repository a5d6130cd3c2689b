use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::store::{content_hash, GetResult, ObjectHead, PutResult};
use crate::{collect_stream, stream_from_bytes, BlobError, BlobResult, BlobStore, ByteStream};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    last_modified: i64,
}

/// In-process store, mainly for tests and ephemeral deployments.
///
/// Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        key: &str,
        content_type: Option<&str>,
        stream: ByteStream,
    ) -> BlobResult<PutResult> {
        let data = collect_stream(stream, u64::MAX).await?;
        let checksum = content_hash(&data);
        let size_bytes = data.len() as u64;

        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.map(str::to_string),
                last_modified: chrono::Utc::now().timestamp(),
            },
        );

        Ok(PutResult {
            size_bytes,
            checksum: Some(checksum),
        })
    }

    async fn get(&self, key: &str) -> BlobResult<GetResult> {
        let objects = self.objects.read().await;
        let obj = objects.get(key).ok_or_else(|| BlobError::not_found(key))?;

        Ok(GetResult {
            stream: stream_from_bytes(obj.data.clone()),
            size_bytes: obj.data.len() as u64,
            content_type: obj.content_type.clone(),
        })
    }

    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        let objects = self.objects.read().await;
        let obj = objects.get(key).ok_or_else(|| BlobError::not_found(key))?;

        Ok(ObjectHead {
            size_bytes: obj.data.len() as u64,
            content_type: obj.content_type.clone(),
            last_modified: Some(obj.last_modified),
        })
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        match self.objects.write().await.remove(key) {
            Some(_) => Ok(()),
            None => Err(BlobError::not_found(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete() {
        let store = MemoryBlobStore::new();
        let put = store
            .put("blogs/a.png", Some("image/png"), stream_from_bytes(Bytes::from_static(b"png")))
            .await
            .unwrap();
        assert_eq!(put.size_bytes, 3);

        let got = store.get("blogs/a.png").await.unwrap();
        assert_eq!(got.content_type.as_deref(), Some("image/png"));
        assert_eq!(collect_stream(got.stream, 10).await.unwrap(), Bytes::from_static(b"png"));

        store.delete("blogs/a.png").await.unwrap();
        assert!(!store.contains("blogs/a.png").await);
        assert!(store.delete("blogs/a.png").await.unwrap_err().is_not_found());
    }
}
