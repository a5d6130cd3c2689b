//! Configuration keys, defaults and the typed view the app runs on.
//!
//! Every value lives in the `QuillApp` key/value store, so any of them
//! can be overridden from the environment, e.g.
//! `QUILL__HTTP__PORT=8080` or `QUILL__AUTH__SECRET=...`.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use quill_auth::JwtOptions;
use quill_core::{QuillApp, QuillConfigSnapshot};
use serde_json::json;

pub const ENV_PREFIX: &str = "QUILL";

const DEFAULTS: &[(&str, &str)] = &[
    ("http.host", "127.0.0.1"),
    ("http.port", "3030"),
    ("http.maxBodyBytes", "8388608"),
    ("auth.issuer", "quill"),
    ("auth.audience", "quill-api"),
    ("auth.accessTokenTtl", "1h"),
    ("blobs.driver", "fs"),
    ("blobs.root", "./storage/app/public"),
    ("blogs.perPage", "5"),
    ("blogs.maxImageKilobytes", "2048"),
];

/// Fill in every key that is not set yet.
pub fn apply_defaults(app: &QuillApp) {
    for (key, value) in DEFAULTS {
        app.set_default(*key, *value);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobDriver {
    Memory,
    Fs,
}

impl FromStr for BlobDriver {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(BlobDriver::Memory),
            "fs" | "local" => Ok(BlobDriver::Fs),
            other => Err(anyhow!("unknown blobs.driver '{other}' (expected memory or fs)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BlogSettings {
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
    pub per_page: u64,
    pub max_image_kilobytes: u64,
    pub blobs_driver: BlobDriver,
    pub blobs_root: PathBuf,
    pub jwt: JwtOptions,
}

fn required<'a>(snap: &'a QuillConfigSnapshot, key: &str) -> Result<&'a str> {
    snap.get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("{key} must be configured"))
}

fn parsed<T>(snap: &QuillConfigSnapshot, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = required(snap, key)?;
    raw.parse::<T>()
        .map_err(|e| anyhow!("invalid value '{raw}' for {key}: {e}"))
}

impl BlogSettings {
    /// Read settings from the app config. Defaults are applied first.
    pub fn from_app(app: &QuillApp) -> Result<Self> {
        apply_defaults(app);
        let snap = app.config_snapshot();

        let per_page: u64 = parsed(&snap, "blogs.perPage")?;
        if per_page == 0 {
            bail!("blogs.perPage must be at least 1");
        }

        let secret = required(&snap, "auth.secret")
            .with_context(|| format!("set {ENV_PREFIX}__AUTH__SECRET"))?;
        let audience: Vec<&str> = required(&snap, "auth.audience")?
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect();

        let jwt: JwtOptions = serde_json::from_value(json!({
            "issuer": required(&snap, "auth.issuer")?,
            "audience": audience,
            "access_token_expires_in": required(&snap, "auth.accessTokenTtl")?,
            "secret": secret,
        }))
        .context("invalid auth configuration")?;
        jwt.validate().map_err(|e| anyhow!(e))?;

        Ok(Self {
            host: required(&snap, "http.host")?.to_string(),
            port: parsed(&snap, "http.port")?,
            max_body_bytes: parsed(&snap, "http.maxBodyBytes")?,
            per_page,
            max_image_kilobytes: parsed(&snap, "blogs.maxImageKilobytes")?,
            blobs_driver: parsed(&snap, "blobs.driver")?,
            blobs_root: PathBuf::from(required(&snap, "blobs.root")?),
            jwt,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_image_bytes(&self) -> u64 {
        self.max_image_kilobytes.saturating_mul(1024)
    }
}
