use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::Request,
    response::{IntoResponse, Response},
};
use quill_auth::JwtStrategy;
use tower::{Layer, Service};

use crate::QuillAxumError;

/// Rejects requests without a valid bearer token before they reach the
/// wrapped routes. On success the verified `Principal` is stored in the
/// request extensions.
#[derive(Clone)]
pub struct RequireAuth {
    strategy: Arc<JwtStrategy>,
}

impl RequireAuth {
    pub fn new(strategy: Arc<JwtStrategy>) -> Self {
        Self { strategy }
    }
}

impl<S> Layer<S> for RequireAuth {
    type Service = RequireAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireAuthService {
            inner,
            strategy: Arc::clone(&self.strategy),
        }
    }
}

#[derive(Clone)]
pub struct RequireAuthService<S> {
    inner: S,
    strategy: Arc<JwtStrategy>,
}

impl<S> Service<Request<Body>> for RequireAuthService<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        match self.strategy.authenticate(req.headers()) {
            Ok(result) => {
                req.extensions_mut().insert(result.principal());
                Box::pin(async move { inner.call(req).await })
            }
            Err(err) => {
                tracing::debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    reason = %err,
                    "rejected unauthenticated request"
                );
                Box::pin(async move { Ok(QuillAxumError(err).into_response()) })
            }
        }
    }
}
