use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: u64,
    pub title: String,
    pub content: String,
    /// Content-derived blob name, e.g. `<sha256>.jpg`.
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated blog ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub content: String,
    pub image: String,
}

/// Fields replaced by an update. `image: None` keeps the stored image.
#[derive(Debug, Clone)]
pub struct BlogChanges {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
}
