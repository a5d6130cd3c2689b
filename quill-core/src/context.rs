//! Per-request context handed to every service call.

use std::collections::HashMap;

use serde_json::Value;

/// The authenticated caller, as established by the auth layer.
#[derive(Debug, Clone, Default)]
pub struct Principal {
    /// The `sub` claim, if the token carried one.
    pub subject: Option<String>,
    /// Full verified claim set.
    pub claims: Value,
}

impl Principal {
    pub fn new(subject: Option<String>, claims: Value) -> Self {
        Self { subject, claims }
    }
}

/// Context carried with every Quill service operation.
///
/// Transports fill it in; services read from it. It never holds the
/// request body, which is passed separately as `FormData`.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: Option<String>,
    pub principal: Option<Principal>,
    pub query: HashMap<String, String>,
    /// Request path as seen by the client, used for page links.
    pub path: String,
}

impl RequestContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}
