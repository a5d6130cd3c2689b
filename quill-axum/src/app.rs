use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request};
use axum::handler::Handler;
use axum::routing::get;
use axum::{Extension, Router};
use quill_core::{QuillApp, QuillService};
use serde::Serialize;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::rest;
use crate::MultipartConfig;

const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Builder that turns a [`QuillApp`] plus services into an axum `Router`.
pub struct AxumApp {
    pub app: Arc<QuillApp>,
    pub router: Router<()>,
    form: MultipartConfig,
}

impl Clone for AxumApp {
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
            router: self.router.clone(),
            form: self.form.clone(),
        }
    }
}

impl AxumApp {
    /// Body limits come from `http.maxBodyBytes`.
    pub fn new(app: QuillApp) -> Self {
        let max_total = app
            .config_snapshot()
            .get_usize("http.maxBodyBytes")
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        Self {
            app: Arc::new(app),
            router: Router::new(),
            form: MultipartConfig::default().max_total_size(max_total),
        }
    }

    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.router = self.router.nest(path, router);
        self
    }

    /// Plain `GET` route outside the service contract, e.g. `/health`.
    pub fn service<H, T>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()> + Clone + Send + Sync + 'static,
        T: 'static,
    {
        self.router = self.router.route(path, get(handler));
        self
    }

    pub fn use_service<R>(mut self, path: &str, service: Arc<dyn QuillService<R>>) -> Self
    where
        R: Serialize + Send + Sync + 'static,
    {
        let router = rest::service_router(service);
        self.router = self.router.nest(path, router);
        self
    }

    /// Same as [`AxumApp::use_service`], with every route behind a bearer token.
    #[cfg(feature = "auth")]
    pub fn use_authenticated_service<R>(
        mut self,
        path: &str,
        service: Arc<dyn QuillService<R>>,
        strategy: Arc<quill_auth::JwtStrategy>,
    ) -> Self
    where
        R: Serialize + Send + Sync + 'static,
    {
        let router =
            rest::service_router(service).layer(crate::middlewares::auth::RequireAuth::new(strategy));
        self.router = self.router.nest(path, router);
        self
    }

    /// Finish building: attach body limits, request ids and tracing to
    /// every route registered so far.
    pub fn into_router(self) -> Router<()> {
        let max_total = self.form.max_total_size;

        self.router
            .layer(Extension(self.form))
            .layer(DefaultBodyLimit::max(max_total))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
                        let request_id = req
                            .headers()
                            .get("x-request-id")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("-");
                        tracing::info_span!(
                            "http",
                            method = %req.method(),
                            uri = %req.uri(),
                            request_id = %request_id,
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}

pub fn axum(app: QuillApp) -> AxumApp {
    AxumApp::new(app)
}
