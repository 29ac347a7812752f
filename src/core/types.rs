use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// An uploaded source photo, held in memory for the duration of one transform.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Raw image bytes
    pub bytes: Vec<u8>,
    /// Media type, e.g. "image/jpeg"
    pub mime_type: String,
    /// Original file name as submitted
    pub file_name: String,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            file_name: file_name.into(),
        }
    }
}

/// One transform request: a boat photo plus the waterway it should end up in.
#[derive(Debug, Clone, Default)]
pub struct TransformRequest {
    /// Source photo; validation rejects requests without one
    pub image: Option<ImageUpload>,
    /// Target waterway, e.g. "Miami Marina"
    pub location: String,
    /// Optional dealership to name in the prompt
    pub dealership_name: Option<String>,
}

impl TransformRequest {
    pub fn new(image: ImageUpload, location: impl Into<String>) -> Self {
        Self {
            image: Some(image),
            location: location.into(),
            dealership_name: None,
        }
    }

    pub fn with_dealership(mut self, name: impl Into<String>) -> Self {
        self.dealership_name = Some(name.into());
        self
    }
}

/// A single output from the image service.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// URL of the generated image, when the service returned one
    pub url: Option<String>,
}

impl GeneratedImage {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

/// A successfully processed upload, as aggregated by the batch uploader.
/// Never mutated after creation and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedImage {
    /// Unique id (e.g. "wl_ab12cd34")
    pub id: String,
    /// Path of the source file on disk
    pub original_path: PathBuf,
    /// URL of the transformed image
    pub processed_url: String,
    /// Original file name
    pub original_name: String,
    /// When the transform completed
    pub timestamp: DateTime<Utc>,
}

impl ProcessedImage {
    pub fn new(
        original_path: PathBuf,
        processed_url: impl Into<String>,
        original_name: impl Into<String>,
    ) -> Self {
        let uuid = Uuid::new_v4();
        Self {
            id: format!("wl_{}", &uuid.to_string()[..8]),
            original_path,
            processed_url: processed_url.into(),
            original_name: original_name.into(),
            timestamp: Utc::now(),
        }
    }
}
