//! Public read access to stored blog images: `GET /storage/blogs/{name}`.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use quill_axum::QuillAxumError;
use quill_blob::{BlobAdapter, BlobError};
use quill_core::QuillError;

use crate::services::blogs::blogs_shared::blob_error;

pub fn router(blobs: BlobAdapter) -> Router {
    Router::new()
        .route("/{name}", get(serve_image))
        .with_state(blobs)
}

async fn serve_image(
    State(blobs): State<BlobAdapter>,
    Path(name): Path<String>,
) -> Result<Response, QuillAxumError> {
    let opened = blobs.open(&name).await.map_err(|err| match err {
        BlobError::NotFound { .. } | BlobError::Invalid { .. } => {
            QuillError::not_found(format!("Image not found: {name}")).into_anyhow()
        }
        other => blob_error(other),
    })?;

    let content_type = opened
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_LENGTH, opened.size_bytes.to_string()),
            // names are content hashes, so a name never changes meaning
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        Body::from_stream(opened.stream),
    )
        .into_response())
}
