use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::store::{GetResult, ObjectHead, PutResult};
use crate::{BlobError, BlobResult, BlobStore, ByteStream};

const READ_CHUNK: usize = 64 * 1024;

/// Stores each blob as a file under `root`, keyed by its relative path.
///
/// Writes go to a temporary sibling first and are renamed into place,
/// so readers never observe a half-written file.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> BlobResult<PathBuf> {
        if key.is_empty() || key.contains('\\') || key.contains('\0') {
            return Err(BlobError::invalid(format!("Invalid blob key: {key:?}")));
        }

        let rel = Path::new(key);
        let mut path = self.root.clone();
        for component in rel.components() {
            match component {
                Component::Normal(part) => path.push(part),
                _ => return Err(BlobError::invalid(format!("Invalid blob key: {key:?}"))),
            }
        }
        Ok(path)
    }
}

/// Files carry no metadata, so the type served back is read off the key's
/// extension and the hint given to `put` is dropped.
fn guess_content_type(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => return None,
    };
    Some(mime.to_string())
}

fn map_not_found(err: std::io::Error, key: &str) -> BlobError {
    if err.kind() == std::io::ErrorKind::NotFound {
        BlobError::not_found(key)
    } else {
        BlobError::from(err)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(
        &self,
        key: &str,
        _content_type: Option<&str>,
        mut stream: ByteStream,
    ) -> BlobResult<PutResult> {
        let path = self.path_for(key)?;
        let parent = path
            .parent()
            .ok_or_else(|| BlobError::invalid(format!("Invalid blob key: {key:?}")))?;
        tokio::fs::create_dir_all(parent).await?;

        let tmp = parent.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let mut file = tokio::fs::File::create(&tmp).await?;
        let mut hasher = Sha256::new();
        let mut size_bytes = 0u64;

        let written: BlobResult<()> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                hasher.update(&chunk);
                size_bytes += chunk.len() as u64;
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            file.sync_all().await?;
            Ok(())
        }
        .await;

        if let Err(err) = written {
            drop(file);
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err);
        }
        drop(file);

        if let Err(err) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }

        tracing::debug!(key, size_bytes, "blob written");

        Ok(PutResult {
            size_bytes,
            checksum: Some(format!("{:x}", hasher.finalize())),
        })
    }

    async fn get(&self, key: &str) -> BlobResult<GetResult> {
        let path = self.path_for(key)?;
        let mut file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| map_not_found(e, key))?;
        let size_bytes = file.metadata().await?.len();

        let stream = async_stream::stream! {
            let mut buf = vec![0u8; READ_CHUNK];
            loop {
                match file.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => yield Ok::<_, std::io::Error>(bytes::Bytes::copy_from_slice(&buf[..n])),
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        };

        Ok(GetResult {
            stream: Box::pin(stream),
            size_bytes,
            content_type: guess_content_type(&path),
        })
    }

    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        let path = self.path_for(key)?;
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| map_not_found(e, key))?;
        if !meta.is_file() {
            return Err(BlobError::not_found(key));
        }

        let last_modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64);

        Ok(ObjectHead {
            size_bytes: meta.len(),
            content_type: guess_content_type(&path),
            last_modified,
        })
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| map_not_found(e, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{collect_stream, stream_from_bytes};
    use bytes::Bytes;

    #[tokio::test]
    async fn round_trips_through_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        let put = store
            .put("blogs/abc.gif", None, stream_from_bytes(Bytes::from_static(b"GIF89a")))
            .await
            .unwrap();
        assert_eq!(put.size_bytes, 6);
        assert!(dir.path().join("blogs").join("abc.gif").is_file());

        let head = store.head("blogs/abc.gif").await.unwrap();
        assert_eq!(head.content_type.as_deref(), Some("image/gif"));

        let got = store.get("blogs/abc.gif").await.unwrap();
        assert_eq!(collect_stream(got.stream, 100).await.unwrap(), Bytes::from_static(b"GIF89a"));

        store.delete("blogs/abc.gif").await.unwrap();
        assert!(store.get("blogs/abc.gif").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn content_type_comes_from_the_key_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        store
            .put(
                "blogs/abc.png",
                Some("text/plain"),
                stream_from_bytes(Bytes::from_static(b"\x89PNG\r\n\x1a\n")),
            )
            .await
            .unwrap();
        store
            .put("blogs/abc.bin", Some("image/png"), stream_from_bytes(Bytes::from_static(b"x")))
            .await
            .unwrap();

        let got = store.get("blogs/abc.png").await.unwrap();
        assert_eq!(got.content_type.as_deref(), Some("image/png"));
        assert_eq!(store.head("blogs/abc.bin").await.unwrap().content_type, None);
    }

    #[tokio::test]
    async fn rejects_keys_escaping_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        for key in ["../etc/passwd", "/abs.png", "blogs/../../x", "a\\b.png", ""] {
            let err = store.head(key).await.unwrap_err();
            assert!(matches!(err, BlobError::Invalid { .. }), "{key}");
        }
    }

    #[tokio::test]
    async fn missing_files_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(store.delete("blogs/none.png").await.unwrap_err().is_not_found());
        assert!(store.head("blogs/none.png").await.unwrap_err().is_not_found());
    }
}
