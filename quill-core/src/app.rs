use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::{QuillConfig, QuillConfigSnapshot};

struct QuillAppInner {
    config: RwLock<QuillConfig>,
}

/// QuillApp is the transport-agnostic application container.
///
/// It owns configuration. Cloning is cheap and every clone sees the
/// same values.
#[derive(Clone)]
pub struct QuillApp {
    inner: Arc<QuillAppInner>,
}

impl Default for QuillApp {
    fn default() -> Self {
        Self::new()
    }
}

impl QuillApp {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(QuillAppInner {
                config: RwLock::new(QuillConfig::new()),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, QuillConfig> {
        self.inner
            .config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, QuillConfig> {
        self.inner
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Feathers: `app.set(key, value)`
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.write().set(key, value);
    }

    pub fn set_default<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.write().set_default(key, value);
    }

    /// Feathers: `app.get(key)`
    pub fn get(&self, key: &str) -> Option<String> {
        self.read().get(key).map(|v| v.to_string())
    }

    pub fn has(&self, key: &str) -> bool {
        self.read().has(key)
    }

    pub fn config_snapshot(&self) -> QuillConfigSnapshot {
        self.read().snapshot()
    }

    /// Overlay `{prefix}__*` environment variables. See [`QuillConfig::load_env`].
    pub fn load_env(&self, prefix: &str) -> usize {
        self.write().load_env(prefix)
    }

    pub fn merge_env<I, K, V>(&self, prefix: &str, vars: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.write().merge_env(prefix, vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_configuration() {
        let app = QuillApp::new();
        let other = app.clone();

        app.set("auth.secret", "s3cret");
        assert_eq!(other.get("auth.secret").as_deref(), Some("s3cret"));

        other.merge_env("QUILL", [("QUILL__HTTP__PORT", "9000")]);
        assert_eq!(app.config_snapshot().get("http.port"), Some("9000"));
    }
}
