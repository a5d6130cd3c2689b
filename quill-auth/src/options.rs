// JWT options.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// JWT signing algorithms (HMAC only; the secret is shared).
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    #[default]
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
}

/// JWT-specific configuration options
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JwtOptions {
    /// JWT signing algorithm
    pub algorithm: JwtAlgorithm,
    /// Token issuer (iss claim)
    pub issuer: String,
    /// Token audience (aud claim)
    pub audience: Vec<String>,
    /// Access token expiration duration
    #[serde(with = "humantime_serde")]
    pub access_token_expires_in: Duration,
    /// JWT signing secret
    pub secret: Option<String>,
    /// Request header carrying the token
    pub header: String,
    /// Accepted schemes in `<scheme> <token>`, compared case-insensitively
    pub schemes: Vec<String>,
}

impl Default for JwtOptions {
    fn default() -> Self {
        Self {
            algorithm: JwtAlgorithm::default(),
            issuer: "quill".to_string(),
            audience: vec!["quill-api".to_string()],
            access_token_expires_in: Duration::from_secs(3600), // 1 hour
            secret: None,
            header: "authorization".to_string(),
            schemes: vec!["Bearer".to_string(), "JWT".to_string()],
        }
    }
}

impl JwtOptions {
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Validate JWT configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.issuer.is_empty() {
            return Err("JWT issuer cannot be empty".to_string());
        }

        if self.audience.is_empty() {
            return Err("JWT audience cannot be empty".to_string());
        }

        match self.secret.as_deref() {
            None | Some("") => return Err("JWT secret must be configured".to_string()),
            Some(_) => {}
        }

        if self.access_token_expires_in.is_zero() {
            return Err("Access token expiration must be greater than zero".to_string());
        }

        if self.header.trim().is_empty() || self.schemes.is_empty() {
            return Err("JWT header and at least one scheme are required".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_humantime_durations_with_defaults() {
        let opts: JwtOptions = serde_json::from_value(json!({
            "secret": "s",
            "access_token_expires_in": "15m"
        }))
        .unwrap();

        assert_eq!(opts.access_token_expires_in, Duration::from_secs(900));
        assert_eq!(opts.issuer, "quill");
        assert_eq!(opts.algorithm, JwtAlgorithm::HS256);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn secret_is_required() {
        assert!(JwtOptions::default().validate().is_err());
        assert!(JwtOptions::default().with_secret("").validate().is_err());
        assert!(JwtOptions::default().with_secret("x").validate().is_ok());
    }
}
