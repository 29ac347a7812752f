use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::core::{ImageUpload, TransformError, TransformRequest};

/// Wire envelope for `POST /transform`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn success(url: String) -> Response {
    (
        StatusCode::OK,
        Json(TransformResponse {
            success: true,
            processed_image_url: Some(url),
            error: None,
        }),
    )
        .into_response()
}

fn failure(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(TransformResponse {
            success: false,
            processed_image_url: None,
            error: Some(message),
        }),
    )
        .into_response()
}

impl IntoResponse for TransformError {
    fn into_response(self) -> Response {
        let status = if self.is_validation() {
            tracing::debug!("Rejected transform request: {}", self);
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("Transform failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        failure(status, self.to_string())
    }
}

/// `POST /transform` — multipart fields `image` (file), `location` (text),
/// `dealershipName` (optional text).
pub async fn transform(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut request = TransformRequest::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return failure(
                    StatusCode::BAD_REQUEST,
                    format!("Malformed multipart body: {err}"),
                );
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field.content_type().unwrap_or("image/png").to_string();
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        return failure(
                            StatusCode::BAD_REQUEST,
                            format!("Failed to read image upload: {err}"),
                        );
                    }
                };
                if !bytes.is_empty() {
                    request.image = Some(ImageUpload::new(bytes.to_vec(), mime_type, file_name));
                }
            }
            "location" => {
                request.location = field.text().await.unwrap_or_default();
            }
            "dealershipName" => {
                let text = field.text().await.unwrap_or_default();
                if !text.trim().is_empty() {
                    request.dealership_name = Some(text);
                }
            }
            _ => {}
        }
    }

    match state.transformer.transform(&request).await {
        Ok(url) => success(url),
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GeneratedImage, ImageService, Transformer};
    use crate::server::router;
    use async_trait::async_trait;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubService {
        edit_result: Result<Vec<GeneratedImage>, String>,
        generate_result: Result<Vec<GeneratedImage>, String>,
        edit_calls: AtomicUsize,
        generate_calls: AtomicUsize,
    }

    impl StubService {
        fn new(
            edit_result: Result<Vec<GeneratedImage>, String>,
            generate_result: Result<Vec<GeneratedImage>, String>,
        ) -> Arc<Self> {
            Arc::new(Self {
                edit_result,
                generate_result,
                edit_calls: AtomicUsize::new(0),
                generate_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ImageService for StubService {
        async fn edit(
            &self,
            _image: &ImageUpload,
            _prompt: &str,
        ) -> Result<Vec<GeneratedImage>, TransformError> {
            self.edit_calls.fetch_add(1, Ordering::SeqCst);
            self.edit_result
                .clone()
                .map_err(TransformError::upstream)
        }

        async fn generate(&self, _prompt: &str) -> Result<Vec<GeneratedImage>, TransformError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            self.generate_result
                .clone()
                .map_err(TransformError::upstream)
        }
    }

    fn test_server(service: Arc<StubService>) -> TestServer {
        let state = AppState {
            transformer: Transformer::new(service),
        };
        TestServer::new(router(state, "static")).unwrap()
    }

    fn form_with_image() -> MultipartForm {
        MultipartForm::new().add_part(
            "image",
            Part::bytes(vec![0xFF, 0xD8, 0xFF])
                .file_name("boat.jpg")
                .mime_type("image/jpeg"),
        )
    }

    #[tokio::test]
    async fn missing_image_returns_400_envelope() {
        let service = StubService::new(Ok(vec![]), Ok(vec![]));
        let server = test_server(service.clone());

        let form = MultipartForm::new().add_text("location", "Miami Marina");
        let response = server.post("/transform").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "No image provided");
        assert_eq!(service.edit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_location_returns_400_envelope() {
        let service = StubService::new(Ok(vec![]), Ok(vec![]));
        let server = test_server(service.clone());

        let form = form_with_image().add_text("location", "   ");
        let response = server.post("/transform").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Location is required");
        assert_eq!(service.edit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_edit_returns_the_processed_url() {
        let service = StubService::new(
            Ok(vec![GeneratedImage::with_url("https://img.test/out.png")]),
            Ok(vec![]),
        );
        let server = test_server(service.clone());

        let form = form_with_image()
            .add_text("location", "Miami Marina")
            .add_text("dealershipName", "Sunset Yacht Sales");
        let response = server.post("/transform").multipart(form).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["processedImageUrl"], "https://img.test/out.png");
        assert_eq!(service.generate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn double_failure_returns_500_with_the_edit_error() {
        let service = StubService::new(
            Err("content policy violation".to_string()),
            Err("fallback refused".to_string()),
        );
        let server = test_server(service.clone());

        let form = form_with_image().add_text("location", "Miami Marina");
        let response = server.post("/transform").multipart(form).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "content policy violation");
        assert_eq!(service.generate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_upload_counts_as_missing_image() {
        let service = StubService::new(Ok(vec![]), Ok(vec![]));
        let server = test_server(service.clone());

        let form = MultipartForm::new()
            .add_text("location", "Miami Marina")
            .add_part(
                "image",
                Part::bytes(Vec::new())
                    .file_name("empty.jpg")
                    .mime_type("image/jpeg"),
            );
        let response = server.post("/transform").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "No image provided");
    }
}
