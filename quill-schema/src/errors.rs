use quill_core::errors::QuillError;
use serde_json::{Map, Value};

/// Field-keyed validation messages, in insertion order per field.
#[derive(Debug, Default, Clone)]
pub struct SchemaErrors {
    map: Map<String, Value>,
}

impl SchemaErrors {
    pub fn push_field(&mut self, field: &str, msg: impl Into<String>) {
        Self::push_to(&mut self.map, field, msg);
    }

    fn push_to(map: &mut Map<String, Value>, key: &str, msg: impl Into<String>) {
        let msg = Value::String(msg.into());
        match map.get_mut(key) {
            Some(Value::Array(arr)) => arr.push(msg),
            _ => {
                map.insert(key.to_string(), Value::Array(vec![msg]));
            }
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.map.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.map)
    }

    pub fn into_unprocessable_anyhow(self, message: &str) -> anyhow::Error {
        unprocessable(message, self.into_value())
    }

    /// `Ok(())` when nothing was collected, otherwise the `Unprocessable` error.
    pub fn check(self, message: &str) -> anyhow::Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_unprocessable_anyhow(message))
        }
    }
}

pub fn unprocessable(message: &str, errors: Value) -> anyhow::Error {
    QuillError::unprocessable(message).with_errors(errors).into_anyhow()
}
