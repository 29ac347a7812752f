mod types;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

pub use types::*;

use crate::config::Config;
use crate::core::{GeneratedImage, ImageService, ImageUpload, TransformError};
use crate::http_client::HTTP_CLIENT;

/// OpenAI Images API client
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    edit_model: String,
    generate_model: String,
    size: String,
    quality: String,
}

impl OpenAiClient {
    /// Create a new client from config
    pub fn from_config(config: &Config) -> Result<Self, TransformError> {
        let api_key = config
            .api_key()
            .ok_or(TransformError::MissingApiKey)?
            .to_string();

        Ok(Self {
            api_key,
            base_url: config.api.base_url.clone(),
            edit_model: config.api.edit_model.clone(),
            generate_model: config.api.generate_model.clone(),
            size: config.defaults.size.clone(),
            quality: config.defaults.quality.clone(),
        })
    }

    async fn post_edit(
        &self,
        image: &ImageUpload,
        prompt: &str,
    ) -> Result<ImagesResponse, TransformError> {
        let url = format!("{}/images/edits", self.base_url);

        let image_part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| TransformError::InvalidResponse(format!("bad image mime type: {e}")))?;

        let form = Form::new()
            .text("model", self.edit_model.clone())
            .text("prompt", prompt.to_string())
            .text("n", "1")
            .text("size", self.size.clone())
            .part("image", image_part);

        tracing::debug!("Sending edit request to: {}", url);

        let response = HTTP_CLIENT
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn post_generate(&self, prompt: &str) -> Result<ImagesResponse, TransformError> {
        let url = format!("{}/images/generations", self.base_url);

        let request = GenerationsRequest {
            model: &self.generate_model,
            prompt,
            n: 1,
            size: &self.size,
            quality: Some(self.quality.as_str()),
        };

        tracing::debug!("Sending generate request to: {}", url);
        tracing::debug!("Request body: {}", serde_json::to_string(&request).unwrap_or_default());

        let response = HTTP_CLIENT
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn parse_response(response: reqwest::Response) -> Result<ImagesResponse, TransformError> {
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("Response status: {}", status);
        tracing::debug!("Response body: {}", body);

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("Images API error {status}: {body}"));
            return Err(TransformError::upstream(message));
        }

        serde_json::from_str(&body)
            .map_err(|e| TransformError::InvalidResponse(format!("unparseable images response: {e}")))
    }
}

/// Turn the API payload into the pipeline's view of it. GPT image models
/// answer with inline base64 instead of a hosted URL; those become data URLs
/// so the rest of the app only ever deals in URLs.
fn into_generated(response: ImagesResponse) -> Vec<GeneratedImage> {
    response
        .data
        .into_iter()
        .map(|image| {
            if let Some(rp) = &image.revised_prompt {
                tracing::debug!("Revised prompt from model: {}", rp);
            }
            let url = image
                .url
                .or_else(|| image.b64_json.map(|b64| format!("data:image/png;base64,{b64}")));
            GeneratedImage { url }
        })
        .collect()
}

#[async_trait]
impl ImageService for OpenAiClient {
    async fn edit(
        &self,
        image: &ImageUpload,
        prompt: &str,
    ) -> Result<Vec<GeneratedImage>, TransformError> {
        let response = self.post_edit(image, prompt).await?;
        Ok(into_generated(response))
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<GeneratedImage>, TransformError> {
        let response = self.post_generate(prompt).await?;
        Ok(into_generated(response))
    }
}
