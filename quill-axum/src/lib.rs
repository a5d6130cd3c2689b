//! quill-axum: Axum adapter for Quill.
//!
//! Mounts `QuillService` implementations as REST routes, decodes request
//! bodies into `FormData`, maps `QuillError` to HTTP responses and
//! (with the `auth` feature) gates routes behind a bearer token.

pub mod app;
mod error;
pub mod middlewares;
pub mod params;
pub mod rest;

pub use app::{axum, AxumApp};
pub use error::QuillAxumError;
pub use middlewares::multipart::{MultipartConfig, ServiceForm};
pub use params::RestContext;

#[cfg(feature = "auth")]
pub use middlewares::auth::RequireAuth;
