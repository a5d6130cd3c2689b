use anyhow::Error;
use quill_blob::BlobError;
use quill_core::{QuillError, ServiceCapabilities};

pub const LISTED: &str = "List Data Blogs";
pub const CREATED: &str = "Blog created successfully";
pub const DETAILS: &str = "Blog details";
pub const UPDATED: &str = "Blog updated successfully";
pub const DELETED: &str = "Blog deleted successfully";

pub fn capabilities() -> ServiceCapabilities {
    ServiceCapabilities::standard_crud()
}

pub fn not_found(id: &str) -> Error {
    QuillError::not_found(format!("Blog not found: {id}")).into_anyhow()
}

/// Ids are positive integers; anything else cannot name a row.
pub fn parse_id(id: &str) -> Result<u64, Error> {
    id.trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| not_found(id))
}

pub fn blob_error(err: BlobError) -> Error {
    match err {
        BlobError::NotFound { key } => {
            QuillError::not_found(format!("Image not found: {key}")).into_anyhow()
        }
        BlobError::Invalid { message } => QuillError::bad_request(message).into_anyhow(),
        other => QuillError::general_error("Image storage failed")
            .with_source(other.into())
            .into_anyhow(),
    }
}
