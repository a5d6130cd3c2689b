use quill_core::QuillApp;

use crate::config::{self, ENV_PREFIX};

/// Defaults first, then `QUILL__*` environment overrides.
pub fn blog_app() -> QuillApp {
    let app = QuillApp::new();
    config::apply_defaults(&app);
    let loaded = app.load_env(ENV_PREFIX);
    tracing::debug!(loaded, "configuration loaded from environment");
    app
}
