use std::sync::Arc;

use bytes::Bytes;

use crate::{
    stream_from_bytes, BlobConfig, BlobError, BlobKeyStrategy, BlobPut, BlobReceipt, BlobResult,
    BlobStore, ContentHashKeys, OpenedBlob,
};

/// The main blob adapter - this is what Quill services embed
#[derive(Clone)]
pub struct BlobAdapter {
    store: Arc<dyn BlobStore>,
    keys: Arc<dyn BlobKeyStrategy>,
    config: BlobConfig,
}

impl BlobAdapter {
    pub fn new<S: BlobStore + 'static>(store: S, config: BlobConfig) -> Self {
        Self::from_arc(Arc::new(store), config)
    }

    /// Build over a store that is shared elsewhere (e.g. also read by a route).
    pub fn from_arc(store: Arc<dyn BlobStore>, config: BlobConfig) -> Self {
        Self {
            store,
            keys: Arc::new(ContentHashKeys),
            config,
        }
    }

    pub fn config(&self) -> &BlobConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn BlobStore> {
        Arc::clone(&self.store)
    }

    /// Store an in-memory blob under its content-derived name.
    pub async fn put_bytes(&self, put: BlobPut, data: Bytes) -> BlobResult<BlobReceipt> {
        let size = data.len() as u64;
        if size > self.config.max_blob_bytes {
            return Err(BlobError::invalid(format!(
                "Blob size {} exceeds maximum {}",
                size, self.config.max_blob_bytes
            )));
        }

        let name = self.keys.blob_name(&data, put.extension.as_deref());
        let key = self.keys.object_key(&self.config.namespace, &name);

        let result = self
            .store
            .put(&key, put.content_type.as_deref(), stream_from_bytes(data))
            .await?;

        tracing::debug!(%key, size_bytes = result.size_bytes, "blob stored");

        let mut receipt = BlobReceipt::new(name, key, result.size_bytes);
        if let Some(ct) = put.content_type {
            receipt = receipt.with_content_type(ct);
        }
        if let Some(filename) = put.filename {
            receipt = receipt.with_filename(filename);
        }
        if let Some(checksum) = result.checksum {
            receipt = receipt.with_checksum(checksum);
        }

        Ok(receipt)
    }

    /// Open a blob for reading
    pub async fn open(&self, name: &str) -> BlobResult<OpenedBlob> {
        let key = self.key_for(name)?;
        let got = self.store.get(&key).await?;

        Ok(OpenedBlob {
            name: name.to_string(),
            size_bytes: got.size_bytes,
            content_type: got.content_type,
            stream: got.stream,
        })
    }

    /// Delete a blob
    pub async fn delete(&self, name: &str) -> BlobResult<()> {
        let key = self.key_for(name)?;
        self.store.delete(&key).await
    }

    /// Storage key for a public blob name. Names are single path
    /// segments; anything that could walk out of the namespace is invalid.
    pub fn key_for(&self, name: &str) -> BlobResult<String> {
        if name.is_empty()
            || name == "."
            || name.contains("..")
            || name.contains('/')
            || name.contains('\\')
            || name.contains('\0')
        {
            return Err(BlobError::invalid(format!("Invalid blob name: {name:?}")));
        }
        Ok(self.keys.object_key(&self.config.namespace, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{content_hash, MemoryBlobStore};

    fn adapter(store: MemoryBlobStore) -> BlobAdapter {
        BlobAdapter::new(store, BlobConfig::default().with_namespace("blogs"))
    }

    #[tokio::test]
    async fn put_bytes_names_blob_after_content() {
        let store = MemoryBlobStore::new();
        let blobs = adapter(store.clone());

        let put = BlobPut::new()
            .with_content_type("image/jpeg")
            .with_extension("jpg")
            .with_filename("cat.jpg");
        let receipt = blobs.put_bytes(put, Bytes::from_static(b"\xFF\xD8\xFFcat")).await.unwrap();

        let hash = content_hash(b"\xFF\xD8\xFFcat");
        assert_eq!(receipt.name, format!("{hash}.jpg"));
        assert_eq!(receipt.key, format!("blogs/{hash}.jpg"));
        assert_eq!(receipt.checksum.as_deref(), Some(hash.as_str()));
        assert_eq!(receipt.filename.as_deref(), Some("cat.jpg"));
        assert!(store.contains(&receipt.key).await);

        let opened = blobs.open(&receipt.name).await.unwrap();
        assert_eq!(opened.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(opened.into_bytes().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn oversize_blobs_are_rejected_before_storage() {
        let store = MemoryBlobStore::new();
        let blobs = BlobAdapter::new(store.clone(), BlobConfig::default().with_max_blob_bytes(2));

        let err = blobs.put_bytes(BlobPut::new(), Bytes::from_static(b"abc")).await.unwrap_err();
        assert!(matches!(err, BlobError::Invalid { .. }));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn names_with_path_parts_are_invalid() {
        let blobs = adapter(MemoryBlobStore::new());
        for name in ["", "..", "a/b.png", "..%2f", "a\\b"] {
            assert!(matches!(blobs.key_for(name), Err(BlobError::Invalid { .. })), "{name}");
        }
        assert!(blobs.open("missing.png").await.unwrap_err().is_not_found());
        assert!(blobs.delete("missing.png").await.unwrap_err().is_not_found());
    }
}
