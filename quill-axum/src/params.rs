use std::collections::HashMap;
use std::convert::Infallible;

use axum::extract::{FromRequestParts, OriginalUri, Query};
use axum::http::request::Parts;
use quill_core::{Principal, RequestContext};

/// Extracts a [`RequestContext`] from the request head.
///
/// - `query`: decoded query string (bad encodings give an empty map)
/// - `path`: the path the client used, before any nesting was stripped
/// - `principal`: set by the auth layer, if it ran
/// - `request_id`: the `x-request-id` header
#[derive(Debug, Clone)]
pub struct RestContext(pub RequestContext);

impl<S> FromRequestParts<S> for RestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .unwrap_or_default();

        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|OriginalUri(uri)| uri.path().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let mut ctx = RequestContext::new(path).with_query(query);

        if let Some(principal) = parts.extensions.get::<Principal>() {
            ctx = ctx.with_principal(principal.clone());
        }

        if let Some(id) = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
        {
            ctx = ctx.with_request_id(id);
        }

        tracing::debug!(path = %ctx.path, request_id = ?ctx.request_id, "request context");

        Ok(Self(ctx))
    }
}
