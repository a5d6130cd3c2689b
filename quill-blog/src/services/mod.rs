use std::sync::Arc;

use quill_blob::BlobAdapter;
use quill_core::QuillService;
use quill_schema::ImageRules;

use crate::config::BlogSettings;

pub mod adapters;
pub mod blogs;

pub use adapters::{BlogRepository, MemoryBlogRepository};
pub use blogs::{Blog, BlogsService};

pub struct BlogServices {
    pub blogs: Arc<dyn QuillService<Blog>>,
}

pub fn configure(
    settings: &BlogSettings,
    repo: Arc<dyn BlogRepository>,
    blobs: BlobAdapter,
) -> BlogServices {
    let rules = ImageRules::default().with_max_kilobytes(settings.max_image_kilobytes);
    let blogs = BlogsService::new(repo, blobs)
        .with_image_rules(rules)
        .with_per_page(settings.per_page);

    BlogServices {
        blogs: Arc::new(blogs),
    }
}
