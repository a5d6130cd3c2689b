/// Configuration for blob operations
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Absolute max size allowed for a single blob (safety guard)
    pub max_blob_bytes: u64,

    /// Key prefix every blob is stored under (e.g. `blogs`).
    pub namespace: String,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            max_blob_bytes: 64 * 1024 * 1024, // 64MB
            namespace: "blobs".to_string(),
        }
    }
}

impl BlobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_blob_bytes(mut self, bytes: u64) -> Self {
        self.max_blob_bytes = bytes;
        self
    }

    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = namespace.into();
        self
    }
}
