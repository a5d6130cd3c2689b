//! quill-blog: an authenticated blog resource with image uploads.
//!
//! `build()` wires configuration, blob storage, the repository and the
//! blogs service into an [`AxumApp`]; `build_with` lets tests supply
//! their own config and blob store.

pub mod app;
pub mod config;
pub mod routes;
pub mod services;

use std::sync::Arc;

use anyhow::Result;
use quill_auth::JwtStrategy;
use quill_axum::{axum, AxumApp};
use quill_blob::{BlobAdapter, BlobConfig, BlobStore, FsBlobStore, MemoryBlobStore};
use quill_core::QuillApp;

use crate::config::{BlobDriver, BlogSettings};
use crate::services::{BlogRepository, MemoryBlogRepository};

pub const BLOB_NAMESPACE: &str = "blogs";

pub fn build() -> Result<AxumApp> {
    let app = app::blog_app();
    let settings = BlogSettings::from_app(&app)?;

    let store: Arc<dyn BlobStore> = match settings.blobs_driver {
        BlobDriver::Memory => Arc::new(MemoryBlobStore::new()),
        BlobDriver::Fs => Arc::new(FsBlobStore::new(settings.blobs_root.clone())),
    };
    tracing::info!(driver = ?settings.blobs_driver, root = %settings.blobs_root.display(), "blob storage ready");

    build_with(app, store)
}

pub fn build_with(app: QuillApp, store: Arc<dyn BlobStore>) -> Result<AxumApp> {
    let settings = BlogSettings::from_app(&app)?;
    let strategy = Arc::new(JwtStrategy::new(settings.jwt.clone())?);

    let blobs = BlobAdapter::from_arc(
        store,
        BlobConfig::default()
            .with_namespace(BLOB_NAMESPACE)
            .with_max_blob_bytes(settings.max_image_bytes()),
    );
    let repo: Arc<dyn BlogRepository> = Arc::new(MemoryBlogRepository::new());
    let svcs = services::configure(&settings, repo, blobs.clone());

    let ax = axum(app)
        .use_authenticated_service("/blogs", svcs.blogs, strategy)
        .use_router("/storage/blogs", routes::storage::router(blobs))
        .service("/health", || async { "ok" });

    Ok(ax)
}
