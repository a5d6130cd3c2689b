// JWT strategy.

use anyhow::Result;
use chrono::Utc;
use http::HeaderMap;
use quill_core::errors::QuillError;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::core::{default_provider, AuthenticationResult, JwtOverrides, JwtProvider};
use crate::options::JwtOptions;

/// Extracts, verifies and issues bearer access tokens.
pub struct JwtStrategy {
    options: JwtOptions,
    provider: Box<dyn JwtProvider>,
}

impl std::fmt::Debug for JwtStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtStrategy")
            .field("issuer", &self.options.issuer)
            .field("audience", &self.options.audience)
            .finish_non_exhaustive()
    }
}

impl JwtStrategy {
    /// Fails if the options are incomplete (e.g. no secret).
    pub fn new(options: JwtOptions) -> Result<Self> {
        options
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid JWT options: {e}"))?;

        Ok(Self {
            options,
            provider: default_provider(),
        })
    }

    /// Token from `<scheme> <token>` in the configured header. Unknown
    /// schemes and bare tokens yield `None`.
    pub fn parse_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        let hv = headers.get(self.options.header.as_str())?.to_str().ok()?.trim();
        if hv.is_empty() {
            return None;
        }

        let (scheme, token) = hv.split_once(' ')?;
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        self.options
            .schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme.trim()))
            .then(|| token.to_string())
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthenticationResult> {
        let access_token = self
            .parse_from_headers(headers)
            .ok_or_else(|| QuillError::not_authenticated("No access token").into_anyhow())?;

        let payload = self.verify_access_token(&access_token)?;

        Ok(AuthenticationResult {
            access_token,
            payload,
        })
    }

    /// Verify signature, issuer, audience and expiry.
    pub fn verify_access_token(&self, token: &str) -> Result<Value> {
        self.provider.verify(&self.options, token).map_err(|e| {
            match QuillError::from_anyhow(&e) {
                Some(_) => e,
                None => QuillError::not_authenticated(e.to_string()).into_anyhow(),
            }
        })
    }

    pub fn create_access_token(&self, payload: Value) -> Result<String> {
        self.create_token_with(payload, &JwtOverrides::default())
    }

    pub fn create_token_with(&self, payload: Value, overrides: &JwtOverrides) -> Result<String> {
        let issuer = overrides
            .issuer
            .clone()
            .unwrap_or_else(|| self.options.issuer.clone());
        let audience = overrides
            .audience
            .clone()
            .unwrap_or_else(|| self.options.audience.clone());
        let expires_in_seconds = overrides
            .expires_in_seconds
            .unwrap_or(self.options.access_token_expires_in.as_secs() as i64);

        let now = Utc::now().timestamp();

        let mut claims = match payload {
            Value::Object(m) => m,
            other => {
                let mut m = Map::new();
                m.insert("payload".to_string(), other);
                m
            }
        };

        claims.insert("iss".to_string(), Value::String(issuer));
        claims.insert("aud".to_string(), json!(audience));
        claims.insert("iat".to_string(), Value::Number(now.into()));
        claims.insert("exp".to_string(), Value::Number((now + expires_in_seconds).into()));
        claims.insert("jti".to_string(), Value::String(Uuid::new_v4().to_string()));

        self.provider.sign(&self.options, claims)
    }
}
