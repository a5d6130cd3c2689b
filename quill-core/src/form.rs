//! Submitted form data: text fields plus uploaded files.
//!
//! Transports decode multipart, urlencoded or JSON bodies into a
//! `FormData` so services never care which encoding the client used.

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;

/// One uploaded file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub filename: Option<String>,
    /// Content type the client claimed. Never trusted for validation.
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(field: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            field: field.into(),
            filename: None,
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later values for the same field win.
    pub fn insert_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn insert_file(&mut self, file: UploadedFile) {
        self.files.insert(file.field.clone(), file);
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    /// Flatten a JSON object into text fields. Strings are kept as-is,
    /// numbers and booleans are stringified, null is skipped and nested
    /// values are stored as compact JSON.
    pub fn from_json_object(obj: &serde_json::Map<String, Value>) -> Self {
        let mut form = Self::new();
        for (key, value) in obj {
            match value {
                Value::Null => {}
                Value::String(s) => form.insert_field(key, s.clone()),
                other => form.insert_field(key, other.to_string()),
            }
        }
        form
    }
}
