use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use quill_blob::{BlobAdapter, BlobPut, BlobReceipt};
use quill_core::{
    Envelope, FormData, Page, PageRequest, QuillService, RequestContext, ServiceCapabilities,
};
use quill_schema::{unprocessable, ImageRules};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::blogs_schema::{validate_create, validate_update, ValidImage, VALIDATION_FAILED};
use super::blogs_shared::{self, blob_error, not_found, parse_id};
use super::{Blog, BlogChanges, NewBlog};
use crate::services::adapters::BlogRepository;

pub struct BlogsService {
    repo: Arc<dyn BlogRepository>,
    blobs: BlobAdapter,
    rules: ImageRules,
    per_page: u64,
    /// Held by every write from the blob put or row delete until the row
    /// change and any blob release are done, so a release never races a
    /// write that is about to reference the same content-named blob.
    image_lock: Mutex<()>,
}

impl BlogsService {
    pub fn new(repo: Arc<dyn BlogRepository>, blobs: BlobAdapter) -> Self {
        Self {
            repo,
            blobs,
            rules: ImageRules::default(),
            per_page: 5,
            image_lock: Mutex::new(()),
        }
    }

    pub fn with_image_rules(mut self, rules: ImageRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_per_page(mut self, per_page: u64) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    async fn store_image(&self, image: ValidImage) -> Result<BlobReceipt> {
        let ValidImage { file, kind } = image;

        let mut put = BlobPut::new()
            .with_content_type(kind.mime())
            .with_extension(kind.extension());
        if let Some(filename) = file.filename {
            put = put.with_filename(filename);
        }

        self.blobs.put_bytes(put, file.data).await.map_err(blob_error)
    }

    /// Delete an image blob nobody references any more. Failures are
    /// logged and swallowed; an orphaned blob is acceptable.
    ///
    /// Callers hold `image_lock`.
    async fn release_image(&self, image: &str) {
        match self.repo.image_in_use(image).await {
            Ok(false) => {}
            Ok(true) => {
                debug!(%image, "image still referenced, keeping blob");
                return;
            }
            Err(err) => {
                warn!(%image, error = %err, "could not check image references, keeping blob");
                return;
            }
        }

        if let Err(err) = self.blobs.delete(image).await {
            if !err.is_not_found() {
                warn!(%image, error = %err, "failed to delete image blob");
            }
        }
    }
}

fn caller(ctx: &RequestContext) -> &str {
    ctx.principal
        .as_ref()
        .and_then(|p| p.subject.as_deref())
        .unwrap_or("-")
}

#[async_trait]
impl QuillService<Blog> for BlogsService {
    fn capabilities(&self) -> ServiceCapabilities {
        blogs_shared::capabilities()
    }

    async fn find(&self, ctx: &RequestContext) -> Result<Envelope<Page<Blog>>> {
        let request = PageRequest::from_query(&ctx.query, self.per_page).with_path(&ctx.path);
        let (rows, total) = self.repo.paginate(&request).await?;
        debug!(page = request.page, total, "listing blogs");

        Ok(Envelope::ok(blogs_shared::LISTED, Page::new(rows, total, &request)))
    }

    async fn get(&self, _ctx: &RequestContext, id: &str) -> Result<Envelope<Blog>> {
        let blog_id = parse_id(id)?;
        let blog = self
            .repo
            .find_by_id(blog_id)
            .await?
            .ok_or_else(|| not_found(id))?;

        Ok(Envelope::ok(blogs_shared::DETAILS, blog))
    }

    async fn create(&self, ctx: &RequestContext, data: FormData) -> Result<Envelope<Blog>> {
        let valid = validate_create(data, &self.rules)?;
        let image = valid.image.ok_or_else(|| {
            unprocessable(VALIDATION_FAILED, json!({"image": ["The image field is required."]}))
        })?;

        let _guard = self.image_lock.lock().await;
        let receipt = self.store_image(image).await?;

        let created = self
            .repo
            .create(NewBlog {
                title: valid.title,
                content: valid.content,
                image: receipt.name.clone(),
            })
            .await;

        match created {
            Ok(blog) => {
                info!(id = blog.id, image = %blog.image, by = caller(ctx), "blog created");
                Ok(Envelope::ok(blogs_shared::CREATED, blog))
            }
            Err(err) => {
                self.release_image(&receipt.name).await;
                Err(err)
            }
        }
    }

    async fn update(&self, ctx: &RequestContext, id: &str, data: FormData) -> Result<Envelope<Blog>> {
        let valid = validate_update(data, &self.rules)?;
        let blog_id = parse_id(id)?;

        let _guard = self.image_lock.lock().await;
        let existing = self
            .repo
            .find_by_id(blog_id)
            .await?
            .ok_or_else(|| not_found(id))?;

        let receipt = match valid.image {
            Some(image) => Some(self.store_image(image).await?),
            None => None,
        };
        let new_image = receipt.as_ref().map(|r| r.name.clone());

        let updated = self
            .repo
            .update(
                blog_id,
                BlogChanges {
                    title: valid.title,
                    content: valid.content,
                    image: new_image.clone(),
                },
            )
            .await;

        let blog = match updated {
            Ok(Some(blog)) => blog,
            Ok(None) => {
                if let Some(name) = &new_image {
                    self.release_image(name).await;
                }
                return Err(not_found(id));
            }
            Err(err) => {
                if let Some(name) = &new_image {
                    self.release_image(name).await;
                }
                return Err(err);
            }
        };

        if let Some(name) = &new_image {
            if *name != existing.image {
                self.release_image(&existing.image).await;
            }
        }

        info!(id = blog.id, image = %blog.image, by = caller(ctx), "blog updated");
        Ok(Envelope::ok(blogs_shared::UPDATED, blog))
    }

    async fn remove(&self, ctx: &RequestContext, id: &str) -> Result<Envelope<Option<Blog>>> {
        let blog_id = parse_id(id)?;

        let _guard = self.image_lock.lock().await;
        let removed = self
            .repo
            .delete(blog_id)
            .await?
            .ok_or_else(|| not_found(id))?;

        self.release_image(&removed.image).await;

        info!(id = removed.id, image = %removed.image, by = caller(ctx), "blog deleted");
        Ok(Envelope::ok(blogs_shared::DELETED, None))
    }
}
