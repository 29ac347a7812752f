//! Batch uploader: the Rust counterpart of the browser upload widget.
//!
//! Files are processed strictly one at a time. Sequential processing is a
//! deliberate simplicity choice that keeps progress reporting trivial, not a
//! correctness requirement. Per-file failures are logged and skipped so the
//! rest of the batch still completes.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::{ImageUpload, ProcessedImage, TransformRequest, Transformer};
use crate::http_client::HTTP_CLIENT;

/// Progress of a running batch, emitted once per file before it is sent.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Zero-based index of the file in flight
    pub index: usize,
    /// Total number of files in the batch
    pub total: usize,
    /// (index + 1) / total * 100
    pub percent: f64,
    /// Name of the file in flight
    pub file_name: String,
}

/// Processes a list of files against a [`Transformer`], aggregating the
/// successes in submission order.
pub struct BatchUploader<'a> {
    transformer: &'a Transformer,
    location: String,
    dealership_name: Option<String>,
}

impl<'a> BatchUploader<'a> {
    pub fn new(
        transformer: &'a Transformer,
        location: impl Into<String>,
        dealership_name: Option<String>,
    ) -> Self {
        Self {
            transformer,
            location: location.into(),
            dealership_name,
        }
    }

    /// Transform every file in order. Returns only the successes; failed
    /// files are logged and silently dropped from the result set.
    pub async fn process(
        &self,
        files: &[PathBuf],
        mut on_progress: impl FnMut(Progress),
    ) -> Vec<ProcessedImage> {
        let total = files.len();
        let mut processed = Vec::new();

        for (index, path) in files.iter().enumerate() {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.to_string_lossy().to_string());

            on_progress(Progress {
                index,
                total,
                percent: (index + 1) as f64 / total as f64 * 100.0,
                file_name: file_name.clone(),
            });

            let request = match self.load_request(path, &file_name).await {
                Ok(request) => request,
                Err(err) => {
                    tracing::error!("Failed to read {}: {}", path.display(), err);
                    continue;
                }
            };

            match self.transformer.transform(&request).await {
                Ok(url) => {
                    processed.push(ProcessedImage::new(path.clone(), url, file_name));
                }
                Err(err) => {
                    tracing::error!("Failed to process {}: {}", file_name, err);
                }
            }
        }

        processed
    }

    async fn load_request(&self, path: &Path, file_name: &str) -> Result<TransformRequest> {
        let bytes = fs::read(path)
            .await
            .with_context(|| format!("Failed to read image file {}", path.display()))?;

        let upload = ImageUpload::new(bytes, mime_for_path(path), file_name);
        let mut request = TransformRequest::new(upload, self.location.clone());
        if let Some(name) = &self.dealership_name {
            request = request.with_dealership(name.clone());
        }
        Ok(request)
    }
}

/// Guess a media type from the file extension
pub fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

/// Save transformed images to disk. Hosted URLs are fetched; base64 data
/// URLs are decoded in place. A failed download is logged and skipped, like
/// every other per-item failure in the batch path; the returned slots stay
/// aligned with the input so callers can pair paths with their images.
pub async fn download_all(
    images: &[ProcessedImage],
    output_dir: &Path,
) -> Result<Vec<Option<PathBuf>>> {
    fs::create_dir_all(output_dir).await?;

    let mut paths = Vec::with_capacity(images.len());

    for image in images {
        match save_image(image, output_dir).await {
            Ok(path) => {
                tracing::info!("Saved image to: {}", path.display());
                paths.push(Some(path));
            }
            Err(err) => {
                tracing::error!("Failed to download {}: {}", image.original_name, err);
                paths.push(None);
            }
        }
    }

    Ok(paths)
}

async fn save_image(image: &ProcessedImage, output_dir: &Path) -> Result<PathBuf> {
    let bytes = fetch_image(&image.processed_url).await?;

    let filename = format!("transformed_{}_{}", image.id, image.original_name);
    let path = output_dir.join(filename);
    fs::write(&path, &bytes).await?;

    Ok(path)
}

async fn fetch_image(url: &str) -> Result<Vec<u8>> {
    if let Some(encoded) = url.strip_prefix("data:image/png;base64,") {
        return BASE64
            .decode(encoded)
            .context("Failed to decode base64 image");
    }

    let bytes = HTTP_CLIENT
        .get(url)
        .send()
        .await
        .context("Failed to download image")?
        .error_for_status()
        .context("Image download was rejected")?
        .bytes()
        .await
        .context("Failed to read downloaded image")?;

    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GeneratedImage, ImageService, TransformError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fails every call for one file index, succeeds for the rest.
    struct FlakyService {
        edit_calls: AtomicUsize,
        failing_index: usize,
    }

    #[async_trait]
    impl ImageService for FlakyService {
        async fn edit(
            &self,
            image: &crate::core::ImageUpload,
            _prompt: &str,
        ) -> Result<Vec<GeneratedImage>, TransformError> {
            let index = self.edit_calls.fetch_add(1, Ordering::SeqCst);
            if index == self.failing_index {
                Err(TransformError::upstream("edit refused"))
            } else {
                Ok(vec![GeneratedImage::with_url(format!(
                    "https://img.test/{}.png",
                    image.file_name
                ))])
            }
        }

        async fn generate(&self, _prompt: &str) -> Result<Vec<GeneratedImage>, TransformError> {
            Err(TransformError::upstream("generate refused"))
        }
    }

    fn write_fixtures(dir: &tempfile::TempDir, names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| {
                let path = dir.path().join(name);
                std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn batch_keeps_order_and_drops_the_failed_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_fixtures(&dir, &["one.jpg", "two.jpg", "three.jpg"]);

        let service = Arc::new(FlakyService {
            edit_calls: AtomicUsize::new(0),
            failing_index: 1,
        });
        let transformer = Transformer::new(service);
        let uploader = BatchUploader::new(&transformer, "Miami Marina", None);

        let mut seen = Vec::new();
        let processed = uploader
            .process(&files, |progress| seen.push(progress))
            .await;

        // file two fails both modes and is silently absent
        assert_eq!(processed.len(), 2);
        assert_eq!(processed[0].original_name, "one.jpg");
        assert_eq!(processed[1].original_name, "three.jpg");
        assert_eq!(
            processed[0].processed_url,
            "https://img.test/one.jpg.png"
        );
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_ends_at_hundred() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_fixtures(&dir, &["a.png", "b.png", "c.png", "d.png"]);

        let service = Arc::new(FlakyService {
            edit_calls: AtomicUsize::new(0),
            failing_index: usize::MAX,
        });
        let transformer = Transformer::new(service);
        let uploader = BatchUploader::new(&transformer, "Lake Tahoe", None);

        let mut percents = Vec::new();
        let mut names = Vec::new();
        uploader
            .process(&files, |progress| {
                percents.push(progress.percent);
                names.push(progress.file_name);
            })
            .await;

        assert_eq!(percents.len(), 4);
        assert!(percents.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(percents[0], 25.0);
        assert_eq!(*percents.last().unwrap(), 100.0);
        assert_eq!(names, vec!["a.png", "b.png", "c.png", "d.png"]);
    }

    #[tokio::test]
    async fn unreadable_file_is_skipped_without_aborting_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = write_fixtures(&dir, &["real.jpg"]);
        files.insert(0, dir.path().join("missing.jpg"));

        let service = Arc::new(FlakyService {
            edit_calls: AtomicUsize::new(0),
            failing_index: usize::MAX,
        });
        let transformer = Transformer::new(service);
        let uploader = BatchUploader::new(&transformer, "Miami Marina", None);

        let processed = uploader.process(&files, |_| {}).await;
        assert_eq!(processed.len(), 1);
        assert_eq!(processed[0].original_name, "real.jpg");
    }

    #[tokio::test]
    async fn failed_download_does_not_abort_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let images = vec![
            ProcessedImage::new(
                PathBuf::from("one.jpg"),
                // not valid base64, so saving this one fails
                "data:image/png;base64,%%%",
                "one.jpg",
            ),
            ProcessedImage::new(
                PathBuf::from("two.jpg"),
                "data:image/png;base64,aGVsbG8=",
                "two.jpg",
            ),
        ];

        let paths = download_all(&images, dir.path()).await.unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].is_none());
        let saved = paths[1].as_ref().unwrap();
        assert_eq!(std::fs::read(saved).unwrap(), b"hello");
    }

    #[test]
    fn mime_guess_covers_the_common_extensions() {
        assert_eq!(mime_for_path(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_for_path(Path::new("no-extension")), "image/png");
    }
}
