use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use quill_auth::{JwtOptions, JwtStrategy};
use quill_axum::axum;
use quill_core::errors::QuillError;
use quill_core::{
    Envelope, FormData, Page, PageRequest, QuillApp, QuillService, RequestContext,
    ServiceCapabilities, ServiceMethodKind,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

struct UnprocessableOnCreate;

#[async_trait::async_trait]
impl QuillService<Value> for UnprocessableOnCreate {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create])
    }

    async fn create(&self, _ctx: &RequestContext, _data: FormData) -> anyhow::Result<Envelope<Value>> {
        Err(QuillError::unprocessable("Invalid")
            .with_errors(json!({"title": ["The title field is required."]}))
            .into_anyhow())
    }
}

struct BoomOnCreate;

#[async_trait::async_trait]
impl QuillService<Value> for BoomOnCreate {
    fn capabilities(&self) -> ServiceCapabilities {
        ServiceCapabilities::from_methods(vec![ServiceMethodKind::Create])
    }

    async fn create(&self, _ctx: &RequestContext, _data: FormData) -> anyhow::Result<Envelope<Value>> {
        Err(anyhow::anyhow!("boom: secret connection string"))
    }
}

/// Echoes what the transport decoded.
struct Echo;

#[async_trait::async_trait]
impl QuillService<Value> for Echo {
    fn capabilities(&self) -> ServiceCapabilities {
        use ServiceMethodKind::*;
        ServiceCapabilities::from_methods(vec![Find, Create, Update])
    }

    async fn find(&self, ctx: &RequestContext) -> anyhow::Result<Envelope<Page<Value>>> {
        let req = PageRequest::from_query(&ctx.query, 5).with_path(ctx.path.clone());
        let subject = ctx.principal.as_ref().and_then(|p| p.subject.clone());
        Ok(Envelope::ok("listed", Page::new(vec![json!({"subject": subject})], 1, &req)))
    }

    async fn create(&self, _ctx: &RequestContext, data: FormData) -> anyhow::Result<Envelope<Value>> {
        Ok(Envelope::ok(
            "created",
            json!({
                "title": data.field("title"),
                "image_size": data.file("image").map(|f| f.size()),
                "image_name": data.file("image").and_then(|f| f.filename.clone()),
            }),
        ))
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        id: &str,
        data: FormData,
    ) -> anyhow::Result<Envelope<Value>> {
        Ok(Envelope::ok("updated", json!({"id": id, "title": data.field("title")})))
    }
}

async fn json_body(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn malformed_json_returns_bad_request() {
    let router = axum(QuillApp::new())
        .use_service("/posts", Arc::new(BoomOnCreate))
        .into_router();

    let res = router.oneshot(post_json("/posts", "{\"title\":\"x\"")).await.unwrap();

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.headers().get("x-request-id").is_some());
    let body = json_body(res).await;
    assert_eq!(body["name"], "BadRequest");
    assert_eq!(body["code"], 400);
    assert_eq!(body["className"], "bad-request");
    assert!(body.get("errors").is_some());
}

#[tokio::test]
async fn request_id_is_preserved_when_provided() {
    let router = axum(QuillApp::new())
        .use_service("/posts", Arc::new(BoomOnCreate))
        .into_router();

    let provided = HeaderValue::from_static("req-test-123");
    let mut req = post_json("/posts", "{\"title\":\"ok\"}");
    req.headers_mut().insert("x-request-id", provided.clone());

    let res = router.oneshot(req).await.unwrap();
    assert_eq!(res.headers().get("x-request-id").unwrap(), &provided);
}

#[tokio::test]
async fn unprocessable_returns_bare_field_map() {
    let router = axum(QuillApp::new())
        .use_service("/posts", Arc::new(UnprocessableOnCreate))
        .into_router();

    let res = router.oneshot(post_json("/posts", "{\"content\":\"x\"}")).await.unwrap();

    assert_eq!(res.status().as_u16(), 422);
    let body = json_body(res).await;
    assert_eq!(body, json!({"title": ["The title field is required."]}));
}

#[tokio::test]
async fn foreign_errors_become_opaque_general_errors() {
    let router = axum(QuillApp::new())
        .use_service("/posts", Arc::new(BoomOnCreate))
        .into_router();

    let res = router.oneshot(post_json("/posts", "{\"title\":\"ok\"}")).await.unwrap();

    assert_eq!(res.status().as_u16(), 500);
    let body = json_body(res).await;
    assert_eq!(body["name"], "GeneralError");
    assert_eq!(body["code"], 500);
    assert_eq!(body["className"], "general-error");
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn methods_outside_capabilities_are_405() {
    let router = axum(QuillApp::new())
        .use_service("/posts", Arc::new(BoomOnCreate))
        .into_router();

    let res = router
        .oneshot(Request::builder().uri("/posts").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 405);
    assert_eq!(json_body(res).await["name"], "MethodNotAllowed");
}

#[tokio::test]
async fn oversize_bodies_are_413() {
    let app = QuillApp::new();
    app.set("http.maxBodyBytes", "64");
    let router = axum(app).use_service("/posts", Arc::new(Echo)).into_router();

    let big = format!("{{\"title\":\"{}\"}}", "x".repeat(200));
    let res = router.oneshot(post_json("/posts", &big)).await.unwrap();

    assert_eq!(res.status().as_u16(), 413);
    assert_eq!(json_body(res).await["name"], "PayloadTooLarge");
}

#[tokio::test]
async fn multipart_and_urlencoded_bodies_reach_the_service() {
    let router = axum(QuillApp::new()).use_service("/posts", Arc::new(Echo)).into_router();

    let boundary = "quillboundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nHello\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"cat.png\"\r\n\
         Content-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(b"\x89PNG\r\n\x1a\n");
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let res = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/posts")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "Hello");
    assert_eq!(body["data"]["image_size"], 8);
    assert_eq!(body["data"]["image_name"], "cat.png");

    let res = router
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/posts/7")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("title=Hi+there&content=x"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body["data"], json!({"id": "7", "title": "Hi there"}));
}

#[tokio::test]
async fn authenticated_services_require_a_token() {
    let strategy =
        Arc::new(JwtStrategy::new(JwtOptions::default().with_secret("test-secret")).unwrap());
    let router = axum(QuillApp::new())
        .use_authenticated_service("/posts", Arc::new(Echo), Arc::clone(&strategy))
        .into_router();

    let res = router
        .clone()
        .oneshot(Request::builder().uri("/posts").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
    assert!(res.headers().get("x-request-id").is_some());
    assert_eq!(json_body(res).await["name"], "NotAuthenticated");

    let token = strategy.create_access_token(json!({"sub": "editor-9"})).unwrap();
    let res = router
        .oneshot(
            Request::builder()
                .uri("/posts?page=2")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let body = json_body(res).await;
    assert_eq!(body["data"]["data"][0]["subject"], "editor-9");
    assert_eq!(body["data"]["current_page"], 2);
    assert_eq!(body["data"]["path"], "/posts");
}
