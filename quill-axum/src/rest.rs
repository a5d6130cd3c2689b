use std::sync::Arc;

use axum::{extract::Path, routing::MethodRouter, Json, Router};
use quill_core::errors::QuillError;
use quill_core::{QuillService, ServiceMethodKind};
use serde::Serialize;

use crate::{QuillAxumError, RestContext, ServiceForm};

async fn method_not_allowed() -> QuillAxumError {
    QuillError::method_not_allowed("Method not allowed").into()
}

/// REST routes for one service, mounted according to its capabilities:
///
/// | method | path    | service call |
/// |--------|---------|--------------|
/// | GET    | `/`     | `find`       |
/// | POST   | `/`     | `create`     |
/// | GET    | `/{id}` | `get`        |
/// | PUT    | `/{id}` | `update`     |
/// | PATCH  | `/{id}` | `patch`      |
/// | DELETE | `/{id}` | `remove`     |
///
/// Methods the service does not expose answer `405 MethodNotAllowed`.
pub fn service_router<R>(service: Arc<dyn QuillService<R>>) -> Router<()>
where
    R: Serialize + Send + Sync + 'static,
{
    let caps = service.capabilities();

    let mut collection: MethodRouter<()> = MethodRouter::new().fallback(method_not_allowed);
    let mut member: MethodRouter<()> = MethodRouter::new().fallback(method_not_allowed);

    if caps.allows(ServiceMethodKind::Find) {
        let svc = Arc::clone(&service);
        collection = collection.get(move |RestContext(ctx): RestContext| async move {
            let res = svc.find(&ctx).await?;
            Ok::<_, QuillAxumError>(Json(res))
        });
    }

    if caps.allows(ServiceMethodKind::Create) {
        let svc = Arc::clone(&service);
        collection = collection.post(
            move |RestContext(ctx): RestContext, ServiceForm(data): ServiceForm| async move {
                let res = svc.create(&ctx, data).await?;
                Ok::<_, QuillAxumError>(Json(res))
            },
        );
    }

    if caps.allows(ServiceMethodKind::Get) {
        let svc = Arc::clone(&service);
        member = member.get(
            move |RestContext(ctx): RestContext, Path(id): Path<String>| async move {
                let res = svc.get(&ctx, &id).await?;
                Ok::<_, QuillAxumError>(Json(res))
            },
        );
    }

    if caps.allows(ServiceMethodKind::Update) {
        let svc = Arc::clone(&service);
        member = member.put(
            move |RestContext(ctx): RestContext,
                  Path(id): Path<String>,
                  ServiceForm(data): ServiceForm| async move {
                let res = svc.update(&ctx, &id, data).await?;
                Ok::<_, QuillAxumError>(Json(res))
            },
        );
    }

    if caps.allows(ServiceMethodKind::Patch) {
        let svc = Arc::clone(&service);
        member = member.patch(
            move |RestContext(ctx): RestContext,
                  Path(id): Path<String>,
                  ServiceForm(data): ServiceForm| async move {
                let res = svc.patch(&ctx, &id, data).await?;
                Ok::<_, QuillAxumError>(Json(res))
            },
        );
    }

    if caps.allows(ServiceMethodKind::Remove) {
        let svc = Arc::clone(&service);
        member = member.delete(
            move |RestContext(ctx): RestContext, Path(id): Path<String>| async move {
                let res = svc.remove(&ctx, &id).await?;
                Ok::<_, QuillAxumError>(Json(res))
            },
        );
    }

    Router::new().route("/", collection).route("/{id}", member)
}
