use axum::{
    body::Body,
    extract::{FromRequest, Request},
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    Form,
};
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use quill_core::errors::QuillError;
use quill_core::form::{FormData, UploadedFile};
use serde_json::{json, Value};

use crate::QuillAxumError;

/// Body limits for request decoding.
///
/// Installed on the router as an `Extension`; handlers without one get
/// the defaults. Parts that carry a filename are files, everything else
/// is a text field.
#[derive(Clone, Debug)]
pub struct MultipartConfig {
    /// Maximum total request body size in bytes
    pub max_total_size: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_total_size: 8 * 1024 * 1024, // 8MB
        }
    }
}

impl MultipartConfig {
    /// Set maximum total request size in bytes
    pub fn max_total_size(mut self, size: usize) -> Self {
        self.max_total_size = size;
        self
    }
}

fn too_large(limit: usize) -> QuillError {
    QuillError::payload_too_large(format!("Request body exceeds {limit} bytes"))
}

async fn read_body(body: Body, limit: usize) -> Result<Bytes, QuillError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => Err(too_large(limit)),
        Err(err) => Err(QuillError::bad_request(format!("Failed to read request body: {err}"))),
    }
}

fn map_multer_error(err: multer::Error, config: &MultipartConfig) -> QuillError {
    match err {
        multer::Error::StreamSizeExceeded { .. } => too_large(config.max_total_size),
        other => QuillError::bad_request("Failed to parse multipart data")
            .with_errors(json!({"_schema": [other.to_string()]})),
    }
}

async fn parse_multipart(
    body: Bytes,
    boundary: String,
    config: &MultipartConfig,
) -> Result<FormData, QuillError> {
    let limits = multer::SizeLimit::new().whole_stream(config.max_total_size as u64);

    let stream = futures::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::with_constraints(
        stream,
        boundary,
        multer::Constraints::new().size_limit(limits),
    );

    let mut form = FormData::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multer_error(e, config))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name.is_empty() {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(|m| m.to_string());

        if filename.is_some() {
            let data = field.bytes().await.map_err(|e| map_multer_error(e, config))?;

            // Browsers submit an empty part for an untouched file input.
            if data.is_empty() && filename.as_deref().map_or(true, str::is_empty) {
                continue;
            }

            let mut file = UploadedFile::new(name, data);
            if let Some(filename) = filename {
                file = file.with_filename(filename);
            }
            if let Some(ct) = content_type {
                file = file.with_content_type(ct);
            }
            form.insert_file(file);
        } else {
            let value = field.text().await.map_err(|e| map_multer_error(e, config))?;
            form.insert_field(name, value);
        }
    }

    Ok(form)
}

fn parse_json(body: &[u8]) -> Result<FormData, QuillError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(FormData::new());
    }

    let value: Value = serde_json::from_slice(body).map_err(|e| {
        QuillError::bad_request("Failed to parse the request body as JSON")
            .with_errors(json!({"_schema": [e.to_string()]}))
    })?;

    match value {
        Value::Object(map) => Ok(FormData::from_json_object(&map)),
        _ => Err(QuillError::bad_request("Request body must be a JSON object")),
    }
}

/// Request body decoded into [`FormData`].
///
/// Accepts `multipart/form-data`, `application/x-www-form-urlencoded`
/// and JSON objects. Bodies over the configured limit are rejected with
/// `PayloadTooLarge` before any parsing.
#[derive(Debug, Clone, Default)]
pub struct ServiceForm(pub FormData);

impl<S> FromRequest<S> for ServiceForm
where
    S: Send + Sync,
{
    type Rejection = QuillAxumError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let config = req
            .extensions()
            .get::<MultipartConfig>()
            .cloned()
            .unwrap_or_default();

        let declared = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > config.max_total_size) {
            return Err(too_large(config.max_total_size).into());
        }

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        let (parts, body) = req.into_parts();
        let bytes = read_body(body, config.max_total_size).await?;

        let form = match essence.as_str() {
            "multipart/form-data" => {
                let boundary = multer::parse_boundary(&content_type).map_err(|e| {
                    QuillError::bad_request("Failed to parse multipart data")
                        .with_errors(json!({"_schema": [e.to_string()]}))
                })?;
                parse_multipart(bytes, boundary, &config).await?
            }
            "application/x-www-form-urlencoded" => {
                let req = Request::from_parts(parts, Body::from(bytes));
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| QuillError::bad_request(e.body_text()))?;

                let mut form = FormData::new();
                for (k, v) in pairs {
                    form.insert_field(k, v);
                }
                form
            }
            "" if bytes.is_empty() => FormData::new(),
            ct if ct == "application/json" || ct.ends_with("+json") || ct.is_empty() => {
                parse_json(&bytes)?
            }
            other => {
                return Err(
                    QuillError::bad_request(format!("Unsupported content type: {other}")).into(),
                )
            }
        };

        Ok(Self(form))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multipart_body(boundary: &str) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nHello\r\n\
                 --{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"cat.jpg\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0]);
        body.extend_from_slice(
            format!(
                "\r\n--{boundary}\r\nContent-Disposition: form-data; name=\"cover\"; filename=\"\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n\r\n--{boundary}--\r\n"
            )
            .as_bytes(),
        );
        body
    }

    #[tokio::test]
    async fn multipart_splits_fields_and_files() {
        let body = Bytes::from(multipart_body("XBOUND"));
        let form = parse_multipart(body, "XBOUND".into(), &MultipartConfig::default())
            .await
            .unwrap();

        assert_eq!(form.field("title"), Some("Hello"));
        let image = form.file("image").unwrap();
        assert_eq!(image.filename.as_deref(), Some("cat.jpg"));
        assert_eq!(image.size(), 4);
        assert!(!form.has_file("cover"));
    }

    #[tokio::test]
    async fn stream_over_the_limit_is_payload_too_large() {
        let body = Bytes::from(multipart_body("XBOUND"));
        let config = MultipartConfig::default().max_total_size(16);
        let err = parse_multipart(body, "XBOUND".into(), &config).await.unwrap_err();
        assert_eq!(err.code(), 413);
    }

    #[test]
    fn json_must_be_an_object() {
        assert!(parse_json(b"  ").unwrap().is_empty());
        assert_eq!(parse_json(b"[1]").unwrap_err().code(), 400);
        assert_eq!(parse_json(b"{\"title\":").unwrap_err().code(), 400);
        assert_eq!(
            parse_json(b"{\"title\":\"x\"}").unwrap().field("title"),
            Some("x")
        );
    }
}
