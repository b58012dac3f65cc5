//! Request handlers for the classification service.

use super::AppState;
use crate::classifier::Prediction;
use crate::core::ClassifyError;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

/// JSON body returned by `POST /predict`.
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    /// Italian label (training dataset order)
    pub class_it: &'static str,
    /// English label
    pub class_en: &'static str,
    /// Maximum softmax probability, in [0, 1]
    pub confidence: f32,
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            class_it: prediction.class_it,
            class_en: prediction.class_en,
            confidence: prediction.confidence,
        }
    }
}

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    /// The request itself was malformed (bad multipart, missing field).
    BadRequest(String),
    /// The inference path failed.
    Classify(ClassifyError),
}

impl From<ClassifyError> for ApiError {
    fn from(err: ClassifyError) -> Self {
        Self::Classify(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Classify(err) => match err {
                // Client sent bytes we cannot work with
                ClassifyError::ImageDecode(_) => (
                    StatusCode::BAD_REQUEST,
                    "uploaded bytes are not a decodable image".to_string(),
                ),
                ClassifyError::InvalidInput { message } => (StatusCode::BAD_REQUEST, message),
                // Everything else is a server-side fault
                other => {
                    error!(error = %other, "prediction failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "inference failed".to_string(),
                    )
                }
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// `POST /predict` — classify an uploaded image.
///
/// Expects a multipart/form-data body with a single `file` field holding
/// the encoded image bytes.
pub async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut image_bytes: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
            image_bytes = Some(data);
            break;
        }
    }

    let image_bytes = image_bytes.filter(|bytes| !bytes.is_empty()).ok_or_else(|| {
        ApiError::BadRequest("multipart field 'file' with image bytes is required".to_string())
    })?;

    let prediction = state.classifier.classify_bytes(&image_bytes)?;
    debug!(
        class = prediction.class_en,
        confidence = prediction.confidence,
        "prediction served"
    );

    Ok(Json(prediction.into()))
}

/// `GET /health` — liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classify;
    use crate::server::{ServerConfig, build_app};
    use crate::utils::decode_image;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    /// Decodes like the real classifier, then returns a canned cat.
    struct FixedClassifier;

    impl Classify for FixedClassifier {
        fn classify_bytes(&self, bytes: &[u8]) -> Result<Prediction, ClassifyError> {
            decode_image(bytes)?;
            Ok(Prediction {
                class_id: 5,
                class_it: "gatto",
                class_en: "cat",
                confidence: 0.93,
            })
        }
    }

    fn test_app() -> axum::Router {
        build_app(Arc::new(FixedClassifier), &ServerConfig::default())
    }

    fn png_bytes() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(16, 16)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    const BOUNDARY: &str = "test-boundary";

    fn multipart_body(field_name: &str, payload: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
                 filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn predict_request(field_name: &str, payload: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(field_name, payload)))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_predict_returns_aligned_pair() {
        let response = test_app()
            .oneshot(predict_request("file", &png_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["class_it"], "gatto");
        assert_eq!(body["class_en"], "cat");
        let confidence = body["confidence"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&confidence));
    }

    #[tokio::test]
    async fn test_predict_rejects_undecodable_bytes() {
        let response = test_app()
            .oneshot(predict_request("file", b"not an image"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("decodable"));
    }

    #[tokio::test]
    async fn test_predict_rejects_empty_upload() {
        let response = test_app()
            .oneshot(predict_request("file", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_predict_rejects_missing_file_field() {
        let response = test_app()
            .oneshot(predict_request("attachment", &png_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("file"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_allows_listed_origin() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let allow_origin = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("allow-origin header for listed origin");
        assert_eq!(allow_origin, "http://localhost:5173");
    }

    #[tokio::test]
    async fn test_cors_ignores_unlisted_origin() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
