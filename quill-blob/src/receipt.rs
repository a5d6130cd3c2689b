use serde::{Deserialize, Serialize};

use crate::{collect_stream, BlobResult, ByteStream};

/// Receipt returned after successfully storing a blob
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlobReceipt {
    /// Public name (`<sha256>.<ext>`), what entities reference.
    pub name: String,
    /// Full storage key (`<namespace>/<name>`).
    pub key: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub filename: Option<String>,
    pub checksum: Option<String>,
    /// Unix seconds.
    pub created_at: i64,
}

impl BlobReceipt {
    pub fn new(name: String, key: String, size_bytes: u64) -> Self {
        Self {
            name,
            key,
            size_bytes,
            content_type: None,
            filename: None,
            checksum: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_content_type(mut self, content_type: String) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_filename(mut self, filename: String) -> Self {
        self.filename = Some(filename);
        self
    }

    pub fn with_checksum(mut self, checksum: String) -> Self {
        self.checksum = Some(checksum);
        self
    }
}

/// A blob opened for reading.
pub struct OpenedBlob {
    pub name: String,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub stream: ByteStream,
}

impl OpenedBlob {
    /// Buffer the whole blob. Only for blobs known to be small.
    pub async fn into_bytes(self) -> BlobResult<bytes::Bytes> {
        collect_stream(self.stream, self.size_bytes.max(1)).await
    }
}

impl std::fmt::Debug for OpenedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenedBlob")
            .field("name", &self.name)
            .field("size_bytes", &self.size_bytes)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
