//! Persistence for blogs.
//!
//! `BlogRepository` is the seam the service talks to; the in-memory
//! implementation is what the binary and the tests run on.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use quill_core::PageRequest;
use tokio::sync::RwLock;

use crate::services::blogs::{Blog, BlogChanges, NewBlog};

#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn find_by_id(&self, id: u64) -> Result<Option<Blog>>;

    async fn create(&self, blog: NewBlog) -> Result<Blog>;

    /// `Ok(None)` when the row does not exist.
    async fn update(&self, id: u64, changes: BlogChanges) -> Result<Option<Blog>>;

    /// Returns the removed row, `Ok(None)` when it did not exist.
    async fn delete(&self, id: u64) -> Result<Option<Blog>>;

    /// One page ordered newest first, plus the total row count.
    async fn paginate(&self, page: &PageRequest) -> Result<(Vec<Blog>, u64)>;

    /// Whether any row still points at `image`.
    async fn image_in_use(&self, image: &str) -> Result<bool>;
}

#[derive(Debug)]
pub struct MemoryBlogRepository {
    rows: RwLock<BTreeMap<u64, Blog>>,
    next_id: AtomicU64,
}

impl Default for MemoryBlogRepository {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl MemoryBlogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlogRepository for MemoryBlogRepository {
    async fn find_by_id(&self, id: u64) -> Result<Option<Blog>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn create(&self, blog: NewBlog) -> Result<Blog> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let row = Blog {
            id,
            title: blog.title,
            content: blog.content,
            image: blog.image,
            created_at: now,
            updated_at: now,
        };

        self.rows.write().await.insert(id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: u64, changes: BlogChanges) -> Result<Option<Blog>> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };

        row.title = changes.title;
        row.content = changes.content;
        if let Some(image) = changes.image {
            row.image = image;
        }
        row.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: u64) -> Result<Option<Blog>> {
        Ok(self.rows.write().await.remove(&id))
    }

    async fn paginate(&self, page: &PageRequest) -> Result<(Vec<Blog>, u64)> {
        let rows = self.rows.read().await;

        let mut all: Vec<&Blog> = rows.values().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = all.len() as u64;
        let data = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .cloned()
            .collect();

        Ok((data, total))
    }

    async fn image_in_use(&self, image: &str) -> Result<bool> {
        Ok(self.rows.read().await.values().any(|b| b.image == image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_blog(title: &str, image: &str) -> NewBlog {
        NewBlog {
            title: title.to_string(),
            content: "body".to_string(),
            image: image.to_string(),
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_from_one() {
        let repo = MemoryBlogRepository::new();
        let a = repo.create(new_blog("a", "a.jpg")).await.unwrap();
        let b = repo.create(new_blog("b", "b.jpg")).await.unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.created_at, a.updated_at);
        assert_eq!(repo.find_by_id(2).await.unwrap().unwrap().title, "b");
        assert!(repo.find_by_id(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn paginate_is_newest_first() {
        let repo = MemoryBlogRepository::new();
        for i in 1..=7 {
            repo.create(new_blog(&format!("blog {i}"), "x.png")).await.unwrap();
        }

        let (first, total) = repo.paginate(&PageRequest::new(1, 5)).await.unwrap();
        assert_eq!(total, 7);
        assert_eq!(first.iter().map(|b| b.id).collect::<Vec<_>>(), vec![7, 6, 5, 4, 3]);

        let (second, _) = repo.paginate(&PageRequest::new(2, 5)).await.unwrap();
        assert_eq!(second.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2, 1]);

        let (past, _) = repo.paginate(&PageRequest::new(9, 5)).await.unwrap();
        assert!(past.is_empty());
    }

    #[tokio::test]
    async fn update_keeps_image_unless_replaced() {
        let repo = MemoryBlogRepository::new();
        let created = repo.create(new_blog("old", "old.gif")).await.unwrap();

        let kept = repo
            .update(
                created.id,
                BlogChanges {
                    title: "new".into(),
                    content: "new body".into(),
                    image: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(kept.image, "old.gif");
        assert_eq!(kept.title, "new");
        assert!(kept.updated_at >= created.updated_at);

        let replaced = repo
            .update(
                created.id,
                BlogChanges {
                    title: "new".into(),
                    content: "new body".into(),
                    image: Some("new.gif".into()),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.image, "new.gif");
        assert!(!repo.image_in_use("old.gif").await.unwrap());

        let missing = repo
            .update(
                99,
                BlogChanges {
                    title: "t".into(),
                    content: "c".into(),
                    image: None,
                },
            )
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_returns_the_removed_row() {
        let repo = MemoryBlogRepository::new();
        let created = repo.create(new_blog("a", "a.svg")).await.unwrap();

        assert_eq!(repo.delete(created.id).await.unwrap().unwrap().image, "a.svg");
        assert!(repo.delete(created.id).await.unwrap().is_none());
        assert!(!repo.image_in_use("a.svg").await.unwrap());
    }
}
