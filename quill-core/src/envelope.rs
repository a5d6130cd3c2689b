use serde::Serialize;

/// Uniform success body: `{ "success": true, "message": ..., "data": ... }`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            message: self.message,
            data: f(self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_data_serializes_as_null() {
        let env: Envelope<Option<u32>> = Envelope::ok("Blog deleted successfully", None);
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(
            value,
            json!({"success": true, "message": "Blog deleted successfully", "data": null})
        );
    }
}
