use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("API key not configured. Set OPENAI_API_KEY environment variable or run: wavelift config set api.key <your-key>")]
    MissingApiKey,

    #[error("No image provided")]
    MissingImage,

    #[error("Location is required")]
    MissingLocation,

    #[error("{message}")]
    Upstream {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl TransformError {
    /// Whether the caller sent a bad request, as opposed to the upstream
    /// service failing. Decides the HTTP status the server answers with.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TransformError::MissingImage | TransformError::MissingLocation
        )
    }

    /// Upstream failure carrying just a message, no transport cause.
    pub fn upstream(message: impl Into<String>) -> Self {
        TransformError::Upstream {
            message: message.into(),
            source: None,
        }
    }
}

impl From<reqwest::Error> for TransformError {
    fn from(err: reqwest::Error) -> Self {
        TransformError::Upstream {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
