use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quill_core::errors::{ErrorKind, QuillError};

/// Wraps any service error so handlers can `?` into an HTTP response.
#[derive(Debug)]
pub struct QuillAxumError(pub anyhow::Error);

impl From<anyhow::Error> for QuillAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<QuillError> for QuillAxumError {
    fn from(e: QuillError) -> Self {
        Self(e.into_anyhow())
    }
}

impl IntoResponse for QuillAxumError {
    fn into_response(self) -> Response {
        // A QuillError anywhere in the chain keeps its kind and fields.
        if let Some(quill) = self.0.chain().find_map(|e| e.downcast_ref::<QuillError>()) {
            let safe = quill.sanitize_for_client();
            let status =
                StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

            if status.is_server_error() {
                tracing::error!(error = ?self.0, "request failed");
            }

            // Field errors go out as the bare `field -> [messages]` map.
            if safe.kind == ErrorKind::Unprocessable {
                if let Some(errors) = safe.errors {
                    return (status, Json(errors)).into_response();
                }
            }

            return (status, Json(safe.to_json())).into_response();
        }

        tracing::error!(error = ?self.0, "unhandled error");

        let safe = QuillError::general_error("Internal server error");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(safe.to_json())).into_response()
    }
}
