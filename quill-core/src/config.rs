//! # Quill configuration
//!
//! Configuration is a flat string key/value store in the spirit of
//! Feathers' `app.set()` / `app.get()`. Keys are dotted
//! (`http.port`, `blogs.perPage`) and applications layer values by
//! calling `set` in order: defaults first, environment last.
//!
//! ```rust
//! use quill_core::QuillApp;
//! let app = QuillApp::new();
//!
//! app.set("blogs.perPage", "5");
//! assert_eq!(app.get("blogs.perPage"), Some("5".to_string()));
//! ```
//!
//! ## Environment overrides
//!
//! `QuillConfig::load_env("QUILL")` reads variables shaped like
//! `QUILL__HTTP__MAX_BODY_BYTES=1024`. Segments split on `__` become
//! dotted path parts, and a single `_` inside a segment camel-cases the
//! next word, so the example lands on `http.maxBodyBytes`.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct QuillConfig {
    values: HashMap<String, String>,
}

impl QuillConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set a key only if nothing is stored under it yet.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> QuillConfigSnapshot {
        QuillConfigSnapshot::new(self.values.clone())
    }

    /// Overlay process environment variables that start with `{prefix}__`.
    ///
    /// Returns the number of keys applied.
    pub fn load_env(&mut self, prefix: &str) -> usize {
        self.merge_env(prefix, std::env::vars())
    }

    /// Same as [`QuillConfig::load_env`] but over an explicit variable list.
    pub fn merge_env<I, K, V>(&mut self, prefix: &str, vars: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let marker = format!("{prefix}__");
        let mut applied = 0;

        for (key, value) in vars {
            let Some(stripped) = key.as_ref().strip_prefix(&marker) else {
                continue;
            };
            if let Some(normalized) = env_key_to_path(stripped) {
                self.set(normalized, value);
                applied += 1;
            }
        }

        applied
    }
}

/// `HTTP__MAX_BODY_BYTES` -> `http.maxBodyBytes`
fn env_key_to_path(raw: &str) -> Option<String> {
    let mut parts = Vec::new();

    for segment in raw.split("__") {
        if segment.is_empty() {
            return None;
        }

        let mut out = String::with_capacity(segment.len());
        for (i, word) in segment.split('_').filter(|w| !w.is_empty()).enumerate() {
            let lower = word.to_ascii_lowercase();
            if i == 0 {
                out.push_str(&lower);
            } else {
                let mut chars = lower.chars();
                if let Some(first) = chars.next() {
                    out.push(first.to_ascii_uppercase());
                    out.push_str(chars.as_str());
                }
            }
        }
        parts.push(out);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuillConfigSnapshot {
    map: HashMap<String, String>,
}

impl QuillConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_become_dotted_camel_case() {
        assert_eq!(
            env_key_to_path("HTTP__MAX_BODY_BYTES").as_deref(),
            Some("http.maxBodyBytes")
        );
        assert_eq!(env_key_to_path("AUTH__SECRET").as_deref(), Some("auth.secret"));
        assert_eq!(env_key_to_path("BLOGS__PER_PAGE").as_deref(), Some("blogs.perPage"));
        assert_eq!(env_key_to_path("HTTP____PORT"), None);
    }

    #[test]
    fn merge_env_only_applies_prefixed_vars() {
        let mut cfg = QuillConfig::new();
        cfg.set("http.port", "3030");

        let applied = cfg.merge_env(
            "QUILL",
            vec![
                ("QUILL__HTTP__PORT", "8080"),
                ("QUILLX__HTTP__HOST", "0.0.0.0"),
                ("PATH", "/usr/bin"),
            ],
        );

        assert_eq!(applied, 1);
        assert_eq!(cfg.get("http.port"), Some("8080"));
        assert!(!cfg.has("http.host"));
    }

    #[test]
    fn set_default_keeps_existing_values() {
        let mut cfg = QuillConfig::new();
        cfg.set("blogs.perPage", "10");
        cfg.set_default("blogs.perPage", "5");
        cfg.set_default("blobs.driver", "fs");

        let snap = cfg.snapshot();
        assert_eq!(snap.get_usize("blogs.perPage"), Some(10));
        assert_eq!(snap.get("blobs.driver"), Some("fs"));
        assert_eq!(snap.get_usize("blobs.driver"), None);
    }
}
