//! quill-schema: turns bad input into `Unprocessable` errors.
//!
//! - [`SchemaErrors`] collects `field -> [messages]`
//! - [`collect_validation_errors`] bridges the `validator` crate
//! - [`images`] checks uploaded images by their bytes, not their names

mod errors;
pub mod images;
mod validate;

pub use errors::{unprocessable, SchemaErrors};
pub use images::{ImageKind, ImageRules};
pub use validate::collect_validation_errors;
