use axum_test::multipart::{MultipartForm, Part};
use chrono::Utc;
use uuid::Uuid;
use vidloft_core::Video;

/// Bytes standing in for an mp4; the fake remuxer copies them through unchanged.
pub fn fake_mp4(len: usize) -> Vec<u8> {
    let mut data = b"\x00\x00\x00\x18ftypmp42".to_vec();
    data.resize(len.max(data.len()), 0x2a);
    data
}

pub fn video_owned_by(user_id: Uuid) -> Video {
    let now = Utc::now();
    Video {
        id: Uuid::new_v4(),
        created_at: now,
        updated_at: now,
        title: "Boot dev demo".to_string(),
        description: Some("Ingestion test".to_string()),
        thumbnail_url: None,
        video_url: None,
        user_id,
    }
}

pub fn video_form(data: Vec<u8>, mime_type: &str) -> MultipartForm {
    MultipartForm::new().add_part(
        "video",
        Part::bytes(data).file_name("clip.mp4").mime_type(mime_type),
    )
}

pub const RAW_BOUNDARY: &str = "vidloft-test-boundary";

/// `Content-Type` header value matching bodies built by [`raw_multipart`].
pub fn raw_multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", RAW_BOUNDARY)
}

/// Hand-built multipart body: `(field name, part Content-Type, data)` per part.
///
/// Unlike `MultipartForm`, part content types are written verbatim, malformed or not.
pub fn raw_multipart(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", RAW_BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}.bin\"\r\n",
                name, name
            )
            .as_bytes(),
        );
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", RAW_BOUNDARY).as_bytes());
    body
}
