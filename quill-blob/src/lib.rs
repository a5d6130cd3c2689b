//! # quill-blob: blob storage for Quill services
//!
//! Services hand bytes to a [`BlobAdapter`] and get a [`BlobReceipt`]
//! back. The adapter names each blob after its content (sha256 hex plus
//! an extension) and writes it through a [`BlobStore`] backend.
//!
//! ```rust
//! use quill_blob::prelude::*;
//! use bytes::Bytes;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let adapter = BlobAdapter::new(MemoryBlobStore::new(), BlobConfig::default());
//!
//! let put = BlobPut::new().with_content_type("image/png").with_extension("png");
//! let receipt = adapter.put_bytes(put, Bytes::from_static(b"\x89PNG\r\n\x1a\n")).await?;
//!
//! let stored = adapter.open(&receipt.name).await?.into_bytes().await?;
//! assert_eq!(stored.len(), 8);
//! adapter.delete(&receipt.name).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Your Service  │  ← Business logic only
//! ├─────────────────┤
//! │   BlobAdapter   │  ← Naming, size limits, receipts
//! ├─────────────────┤
//! │   BlobStore     │  ← Storage primitives (memory, fs)
//! └─────────────────┘
//! ```

mod adapter;
mod config;
mod error;
mod fs;
mod memory;
mod receipt;
mod store;
mod types;

pub use adapter::BlobAdapter;
pub use config::BlobConfig;
pub use error::{BlobError, BlobResult};
pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use receipt::{BlobReceipt, OpenedBlob};
pub use store::{
    content_hash, BlobKeyStrategy, BlobStore, ContentHashKeys, GetResult, ObjectHead, PutResult,
};
pub use types::{collect_stream, stream_from_bytes, BlobPut, ByteStream};

pub mod prelude {
    pub use crate::{
        BlobAdapter, BlobConfig, BlobError, BlobPut, BlobReceipt, BlobResult, BlobStore,
        ByteStream, FsBlobStore, MemoryBlobStore, OpenedBlob,
    };
}
