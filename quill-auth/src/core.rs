// Token signing and verification core.

use anyhow::Result;
use quill_core::context::Principal;
use quill_core::errors::QuillError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::options::JwtOptions;

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
use crate::options::JwtAlgorithm;

/// Outcome of a successful authentication.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResult {
    pub access_token: String,
    pub payload: Value,
}

impl AuthenticationResult {
    pub fn subject(&self) -> Option<String> {
        match self.payload.get("sub") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn principal(&self) -> Principal {
        Principal::new(self.subject(), self.payload.clone())
    }
}

/// Per-token overrides of the configured claims.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtOverrides {
    pub issuer: Option<String>,
    pub audience: Option<Vec<String>>,
    /// May be negative to mint an already-expired token.
    pub expires_in_seconds: Option<i64>,
}

pub trait JwtProvider: Send + Sync {
    fn sign(&self, jwt: &JwtOptions, claims: Map<String, Value>) -> Result<String>;

    fn verify(&self, jwt: &JwtOptions, token: &str) -> Result<Value>;
}

pub(crate) fn default_provider() -> Box<dyn JwtProvider> {
    #[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
    {
        Box::new(JsonwebtokenProvider)
    }
    #[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
    {
        Box::new(NoJwtProvider)
    }
}

fn secret(jwt: &JwtOptions) -> Result<&str> {
    jwt.secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| QuillError::general_error("JWT secret is not configured").into_anyhow())
}

#[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
struct NoJwtProvider;

#[cfg(not(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto")))]
impl JwtProvider for NoJwtProvider {
    fn sign(&self, _jwt: &JwtOptions, _claims: Map<String, Value>) -> Result<String> {
        Err(anyhow::anyhow!(
            "JWT support is disabled (enable one of: jwt-aws-lc-rs, jwt-rust-crypto)"
        ))
    }

    fn verify(&self, _jwt: &JwtOptions, _token: &str) -> Result<Value> {
        Err(anyhow::anyhow!(
            "JWT support is disabled (enable one of: jwt-aws-lc-rs, jwt-rust-crypto)"
        ))
    }
}

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
struct JsonwebtokenProvider;

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
impl JsonwebtokenProvider {
    fn algorithm(alg: JwtAlgorithm) -> jsonwebtoken::Algorithm {
        match alg {
            JwtAlgorithm::HS256 => jsonwebtoken::Algorithm::HS256,
            JwtAlgorithm::HS384 => jsonwebtoken::Algorithm::HS384,
            JwtAlgorithm::HS512 => jsonwebtoken::Algorithm::HS512,
        }
    }
}

#[cfg(any(feature = "jwt-aws-lc-rs", feature = "jwt-rust-crypto"))]
impl JwtProvider for JsonwebtokenProvider {
    fn sign(&self, jwt: &JwtOptions, claims: Map<String, Value>) -> Result<String> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let header = Header::new(Self::algorithm(jwt.algorithm));
        encode(&header, &claims, &EncodingKey::from_secret(secret(jwt)?.as_bytes()))
            .map_err(|e| QuillError::general_error(format!("Could not sign token: {e}")).into_anyhow())
    }

    fn verify(&self, jwt: &JwtOptions, token: &str) -> Result<Value> {
        use jsonwebtoken::{decode, DecodingKey, Validation};

        let mut validation = Validation::new(Self::algorithm(jwt.algorithm));
        validation.leeway = 0;
        validation.set_issuer(&[jwt.issuer.as_str()]);
        validation.set_audience(&jwt.audience.iter().map(|s| s.as_str()).collect::<Vec<_>>());

        let decoded = decode::<Value>(
            token,
            &DecodingKey::from_secret(secret(jwt)?.as_bytes()),
            &validation,
        )
        .map_err(|e| QuillError::not_authenticated(format!("Invalid access token: {e}")).into_anyhow())?;

        Ok(decoded.claims)
    }
}
