use async_trait::async_trait;
use std::sync::Arc;

use super::error::TransformError;
use super::prompt::{edit_prompt, generate_prompt};
use super::types::{GeneratedImage, ImageUpload, TransformRequest};

/// The external image service boundary: two operations, consumed as-is.
///
/// Implemented for real by [`crate::api::OpenAiClient`]; tests script it.
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Edit an existing image with a text prompt. n=1, 1024x1024.
    async fn edit(
        &self,
        image: &ImageUpload,
        prompt: &str,
    ) -> Result<Vec<GeneratedImage>, TransformError>;

    /// Synthesize an image from a prompt alone. n=1, 1024x1024, quality hd.
    async fn generate(&self, prompt: &str) -> Result<Vec<GeneratedImage>, TransformError>;
}

/// Orchestrates one transform: validate, edit first, generation fallback
/// second. Stateless; every call is independent.
#[derive(Clone)]
pub struct Transformer {
    service: Arc<dyn ImageService>,
}

impl Transformer {
    pub fn new(service: Arc<dyn ImageService>) -> Self {
        Self { service }
    }

    /// Turn one uploaded boat photo into one result image URL.
    ///
    /// Edit mode is tried first. When it yields no usable URL, or fails
    /// outright, the generation fallback runs exactly once. If both fail the
    /// error carries the edit-mode message, not the fallback's.
    pub async fn transform(&self, request: &TransformRequest) -> Result<String, TransformError> {
        let image = request.image.as_ref().ok_or(TransformError::MissingImage)?;

        let location = request.location.trim();
        if location.is_empty() {
            return Err(TransformError::MissingLocation);
        }

        let dealership = request.dealership_name.as_deref();

        let prompt = edit_prompt(location, dealership);
        tracing::debug!(file = %image.file_name, "edit prompt: {}", prompt);

        let primary_error = match self.service.edit(image, &prompt).await {
            Ok(images) => match first_url(&images) {
                Some(url) => return Ok(url),
                None => {
                    tracing::warn!(file = %image.file_name, "edit returned no usable image URL");
                    TransformError::upstream("Failed to generate image")
                }
            },
            Err(err) => {
                tracing::error!(file = %image.file_name, "edit request failed: {}", err);
                err
            }
        };

        let fallback_prompt = generate_prompt(location, dealership);
        tracing::debug!(file = %image.file_name, "fallback prompt: {}", fallback_prompt);

        match self.service.generate(&fallback_prompt).await {
            Ok(images) => {
                if let Some(url) = first_url(&images) {
                    return Ok(url);
                }
                tracing::error!(file = %image.file_name, "fallback returned no usable image URL");
            }
            Err(err) => {
                tracing::error!(file = %image.file_name, "fallback generation failed: {}", err);
            }
        }

        // Both modes failed; the edit-mode error takes precedence.
        Err(primary_error)
    }
}

fn first_url(images: &[GeneratedImage]) -> Option<String> {
    images
        .iter()
        .filter_map(|image| image.url.as_deref())
        .find(|url| !url.is_empty())
        .map(str::to_string)
}
