use crate::auth::CallerIdentity;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use futures::TryStreamExt;
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use uuid::Uuid;
use vidloft_core::constants::VIDEO_FIELD_NAME;
use vidloft_core::{AppError, VideoResponse};
use vidloft_processing::UploadBodyError;

#[utoipa::path(
    post,
    path = "/api/videos/{video_id}/upload",
    tag = "videos",
    params(
        ("video_id" = String, Path, description = "ID of the video record to attach the upload to")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "One `video` part with Content-Type video/mp4"),
    responses(
        (status = 200, description = "Video ingested; record updated", body = VideoResponse),
        (status = 400, description = "Invalid ID, form or content type", body = ErrorResponse),
        (status = 401, description = "Missing/invalid token or not the video owner", body = ErrorResponse),
        (status = 404, description = "Video record not found", body = ErrorResponse),
        (status = 413, description = "Video exceeds the upload limit", body = ErrorResponse),
        (status = 415, description = "Video must be an mp4", body = ErrorResponse),
        (status = 500, description = "Processing, storage or record update failed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    caller: CallerIdentity,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = Uuid::parse_str(&video_id)
        .map_err(|_| AppError::InvalidInput("Invalid ID".to_string()))?;

    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;

    if !video.is_owned_by(caller.user_id) {
        return Err(AppError::Unauthorized("You are not the video owner".to_string()).into());
    }

    tracing::info!(
        video_id = %video_id,
        user_id = %caller.user_id,
        "Uploading video"
    );

    let mut multipart = multipart?;
    // Skip to the `video` part; other parts are ignored.
    let field = loop {
        match multipart.next_field().await? {
            Some(field) if field.name() == Some(VIDEO_FIELD_NAME) => break field,
            Some(_) => continue,
            None => {
                return Err(AppError::InvalidInput(format!(
                    "Unable to parse form file: missing '{}' field",
                    VIDEO_FIELD_NAME
                ))
                .into())
            }
        }
    };

    // The raw header, so an unparseable type is reported as sent.
    let declared = field
        .headers()
        .get(CONTENT_TYPE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default();
    let media = state.media_types.classify(&declared)?;

    let body = StreamReader::new(Box::pin(field.map_err(map_multipart_error)));
    let updated = state.ingestion.ingest(&video, &media, body).await?;

    Ok(Json(VideoResponse::from(updated)))
}

/// Mid-stream transport failures, tagged so the stager can tell 413 from a broken body.
fn map_multipart_error(err: MultipartError) -> io::Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadBodyError::LimitExceeded.into()
    } else {
        UploadBodyError::Interrupted(err.body_text()).into()
    }
}
