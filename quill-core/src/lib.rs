//! quill-core: transport-agnostic core for Quill.
//!
//! Holds the pieces every other Quill crate speaks in terms of:
//! structured errors, the key/value configuration store, the
//! `QuillService` resource contract, response envelopes, pagination
//! and submitted form data.

pub mod app;
pub mod config;
pub mod context;
pub mod envelope;
pub mod errors;
pub mod form;
pub mod pagination;
pub mod service;

pub use app::QuillApp;
pub use config::{QuillConfig, QuillConfigSnapshot};
pub use context::{Principal, RequestContext};
pub use envelope::Envelope;
pub use errors::{ErrorKind, QuillError};
pub use form::{FormData, UploadedFile};
pub use pagination::{Page, PageRequest};
pub use service::{QuillService, ServiceCapabilities, ServiceMethodKind};
