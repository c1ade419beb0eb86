//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that converts into
//! `AppError` converts into `HttpAppError` and renders with the same status, body and
//! log level.
//!
//! The rendered body never carries details. For non-sensitive errors the detailed body
//! rides along in the response extensions, and [`expose_error_details`] swaps it in on
//! routers built for non-production environments.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use vidloft_core::{AppError, ErrorMetadata, LogLevel};
use vidloft_storage::StorageError;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            error_type: None,
            code: code.into(),
            recoverable: false,
            suggested_action: None,
        }
    }

    fn from_app_error(app_error: &AppError, include_details: bool) -> Self {
        Self {
            error: app_error.client_message(),
            details: include_details.then(|| app_error.detailed_message()),
            error_type: include_details.then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: IntoResponse and AppError both live in other crates)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

/// A request that is not `multipart/form-data` at all.
impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Expected a multipart/form-data body: {}",
            rejection.body_text()
        )))
    }
}

/// Malformed multipart framing (before the video part starts streaming).
impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        let app = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Request body exceeds the upload limit".to_string())
        } else {
            AppError::InvalidInput(format!("Couldn't parse multipart form: {}", err.body_text()))
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error,
                error_type = error_type,
                details = %error.detailed_message(),
                "Error occurred"
            );
        }
    }
}

/// Detailed error body for a response, never serialized unless exposed.
#[derive(Debug, Clone)]
struct ErrorDetails(ErrorResponse);

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let body = ErrorResponse::from_app_error(app_error, false);
        let mut response = (status, Json(body)).into_response();
        if !app_error.is_sensitive() {
            response
                .extensions_mut()
                .insert(ErrorDetails(ErrorResponse::from_app_error(app_error, true)));
        }
        response
    }
}

/// Response mapper that re-renders error bodies with their details.
///
/// Only installed when the configured environment is not production; see
/// [`crate::setup::routes::setup_routes`].
pub async fn expose_error_details(mut response: Response) -> Response {
    match response.extensions_mut().remove::<ErrorDetails>() {
        Some(ErrorDetails(detailed)) => {
            let (parts, _) = response.into_parts();
            (parts, Json(detailed)).into_response()
        }
        None => response,
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::UploadFailed(msg) => AppError::StorageUploadFailed(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_upload_failed() {
        let storage_err = StorageError::UploadFailed("bucket unavailable".to_string());
        let HttpAppError(app_err) = storage_err.into();
        match app_err {
            AppError::StorageUploadFailed(msg) => assert_eq!(msg, "bucket unavailable"),
            _ => panic!("Expected StorageUploadFailed variant"),
        }
    }

    #[test]
    fn test_from_storage_error_invalid_key() {
        let storage_err = StorageError::InvalidKey("../etc/passwd".to_string());
        let HttpAppError(app_err) = storage_err.into();
        assert!(matches!(app_err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_from_storage_error_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "IO error");
        let HttpAppError(app_err) = StorageError::IoError(io_err).into();
        match app_err {
            AppError::Internal(msg) => assert!(msg.contains("IO error")),
            _ => panic!("Expected Internal variant"),
        }
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::PayloadTooLarge("x".into()), StatusCode::PAYLOAD_TOO_LARGE),
            (
                AppError::UnsupportedMediaType("x".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (AppError::RemuxFailed("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(HttpAppError(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_sensitive_error_hides_details() {
        let err = AppError::RemuxFailed("ffmpeg exited with 1: moov atom not found".to_string());
        let body = ErrorResponse::from_app_error(&err, !err.is_sensitive());
        assert_eq!(body.error, "Couldn't process video");
        assert!(body.details.is_none());
        assert_eq!(body.code, "REMUX_FAILED");
    }

    /// The serialized envelope always has "error", "code" and "recoverable".
    #[test]
    fn test_error_response_shape() {
        let err = AppError::UnsupportedMediaType("Video must be an mp4".to_string());
        let response = ErrorResponse::from_app_error(&err, true);
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(
            json.get("error").and_then(|v| v.as_str()),
            Some("Video must be an mp4")
        );
        assert_eq!(
            json.get("code").and_then(|v| v.as_str()),
            Some("UNSUPPORTED_MEDIA_TYPE")
        );
        assert!(json.get("recoverable").and_then(|v| v.as_bool()).is_some());
        assert_eq!(
            json.get("error_type").and_then(|v| v.as_str()),
            Some("UnsupportedMediaType")
        );
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rendered_body_never_has_details() {
        let response = HttpAppError(AppError::InvalidInput("Invalid ID".into())).into_response();
        assert!(response.extensions().get::<ErrorDetails>().is_some());

        let json = body_json(response).await;
        assert_eq!(json["code"], "INVALID_INPUT");
        assert!(json.get("details").is_none());
        assert!(json.get("error_type").is_none());
    }

    #[tokio::test]
    async fn test_expose_error_details_adds_details() {
        let response = HttpAppError(AppError::InvalidInput("Invalid ID".into())).into_response();
        let response = expose_error_details(response).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error_type"], "InvalidInput");
        assert!(json.get("details").is_some());
    }

    #[tokio::test]
    async fn test_expose_error_details_keeps_sensitive_errors_bare() {
        let response =
            HttpAppError(AppError::RemuxFailed("moov atom not found".into())).into_response();
        assert!(response.extensions().get::<ErrorDetails>().is_none());

        let json = body_json(expose_error_details(response).await).await;
        assert_eq!(json["code"], "REMUX_FAILED");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_minimal_response_omits_optional_fields() {
        let json = serde_json::to_value(ErrorResponse::new("nope", "UNAUTHORIZED")).unwrap();
        assert!(json.get("details").is_none());
        assert!(json.get("suggested_action").is_none());
    }
}
