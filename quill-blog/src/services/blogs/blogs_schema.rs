//! Input rules for the blogs service.
//!
//! Text fields go through `validator`; the image goes through
//! [`ImageRules`]. Every failure lands in one `SchemaErrors` map so the
//! client sees all bad fields at once.

use anyhow::Result;
use quill_core::{FormData, UploadedFile};
use quill_schema::{collect_validation_errors, ImageKind, ImageRules, SchemaErrors};
use validator::Validate;

pub const VALIDATION_FAILED: &str = "Blog validation failed";

#[derive(Debug, Validate)]
pub struct BlogText {
    #[validate(required(message = "The title field is required."))]
    pub title: Option<String>,
    #[validate(required(message = "The content field is required."))]
    pub content: Option<String>,
}

fn trimmed(form: &FormData, name: &str) -> Option<String> {
    form.field(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl BlogText {
    /// Blank values count as missing.
    pub fn from_form(form: &FormData) -> Self {
        Self {
            title: trimmed(form, "title"),
            content: trimmed(form, "content"),
        }
    }
}

#[derive(Debug)]
pub struct ValidImage {
    pub file: UploadedFile,
    pub kind: ImageKind,
}

#[derive(Debug)]
pub struct ValidBlog {
    pub title: String,
    pub content: String,
    pub image: Option<ValidImage>,
}

pub fn validate_create(form: FormData, rules: &ImageRules) -> Result<ValidBlog> {
    validate_form(form, rules, true)
}

pub fn validate_update(form: FormData, rules: &ImageRules) -> Result<ValidBlog> {
    validate_form(form, rules, false)
}

fn validate_form(mut form: FormData, rules: &ImageRules, image_required: bool) -> Result<ValidBlog> {
    let mut errors = SchemaErrors::default();

    let kind = rules.check("image", form.file("image"), image_required, &mut errors);
    let text = BlogText::from_form(&form);
    collect_validation_errors(&text, &mut errors);

    errors.check(VALIDATION_FAILED)?;

    let image = match (kind, form.take_file("image")) {
        (Some(kind), Some(file)) => Some(ValidImage { file, kind }),
        _ => None,
    };

    Ok(ValidBlog {
        title: text.title.unwrap_or_default(),
        content: text.content.unwrap_or_default(),
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{ErrorKind, QuillError};
    use serde_json::Value;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn form(title: &str, content: &str, image: Option<&[u8]>) -> FormData {
        let mut form = FormData::new();
        form.insert_field("title", title);
        form.insert_field("content", content);
        if let Some(bytes) = image {
            form.insert_file(UploadedFile::new("image", bytes.to_vec()).with_filename("pic.png"));
        }
        form
    }

    fn field_errors(err: anyhow::Error) -> Value {
        let quill = QuillError::from_anyhow(&err).expect("QuillError");
        assert_eq!(quill.kind, ErrorKind::Unprocessable);
        quill.errors.clone().expect("errors map")
    }

    #[test]
    fn complete_create_passes_and_trims() {
        let valid = validate_create(form("  Hello ", "World", Some(PNG)), &ImageRules::default())
            .unwrap();

        assert_eq!(valid.title, "Hello");
        assert_eq!(valid.content, "World");
        let image = valid.image.unwrap();
        assert_eq!(image.kind, ImageKind::Png);
        assert_eq!(image.file.filename.as_deref(), Some("pic.png"));
    }

    #[test]
    fn every_failing_field_is_reported() {
        let err = validate_create(form("", "   ", None), &ImageRules::default()).unwrap_err();
        let errors = field_errors(err);

        assert_eq!(errors["title"][0], "The title field is required.");
        assert_eq!(errors["content"][0], "The content field is required.");
        assert_eq!(errors["image"][0], "The image field is required.");
    }

    #[test]
    fn update_image_is_optional_but_checked() {
        let valid = validate_update(form("t", "c", None), &ImageRules::default()).unwrap();
        assert!(valid.image.is_none());

        let err = validate_update(form("t", "c", Some(b"plain text")), &ImageRules::default())
            .unwrap_err();
        let errors = field_errors(err);
        assert_eq!(errors["image"][0], "The image field must be an image.");
        assert!(errors.get("title").is_none());
    }
}
