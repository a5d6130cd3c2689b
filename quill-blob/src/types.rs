use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_core::Stream;
use futures_util::StreamExt;

use crate::{BlobError, BlobResult};

/// Streaming body used for both writes and reads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Wrap an in-memory buffer as a one-chunk stream.
pub fn stream_from_bytes(bytes: Bytes) -> ByteStream {
    Box::pin(futures_util::stream::once(async move { Ok(bytes) }))
}

/// Drain a stream into one buffer, failing once `limit` bytes are exceeded.
pub async fn collect_stream(mut stream: ByteStream, limit: u64) -> BlobResult<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if (buf.len() + chunk.len()) as u64 > limit {
            return Err(BlobError::invalid(format!(
                "Blob exceeds maximum of {limit} bytes"
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

/// What the caller knows about a blob it is about to store.
#[derive(Debug, Clone, Default)]
pub struct BlobPut {
    pub content_type: Option<String>,
    /// Extension appended to the content-derived name (without the dot).
    pub extension: Option<String>,
    /// Original client filename, kept on the receipt only.
    pub filename: Option<String>,
}

impl BlobPut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.filename = Some(filename.into());
        self
    }
}
