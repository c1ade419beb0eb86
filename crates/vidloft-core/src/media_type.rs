//! Declared content type validation and extension derivation.

use crate::constants::{THUMBNAIL_CONTENT_TYPES, VIDEO_CONTENT_TYPES};
use crate::AppError;

/// A content type that passed the allow-list, with the extension derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedMediaType {
    /// Base `type/subtype`, lowercased, parameters stripped.
    pub media_type: String,
    pub extension: String,
}

#[derive(Debug, Clone)]
pub struct MediaTypeClassifier {
    allowed: Vec<String>,
}

impl MediaTypeClassifier {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn for_video() -> Self {
        Self::new(VIDEO_CONTENT_TYPES)
    }

    pub fn for_thumbnail() -> Self {
        Self::new(THUMBNAIL_CONTENT_TYPES)
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Validate a declared `Content-Type` value against the allow-list.
    ///
    /// Malformed values fail with `InvalidInput`; well-formed values outside the
    /// allow-list fail with `UnsupportedMediaType`.
    pub fn classify(&self, declared: &str) -> Result<ClassifiedMediaType, AppError> {
        let media_type = parse_media_type(declared)?;

        if !self.allowed.iter().any(|allowed| *allowed == media_type) {
            return Err(AppError::UnsupportedMediaType(format!(
                "Unsupported content type '{}', allowed: {}",
                media_type,
                self.allowed.join(", ")
            )));
        }

        let extension = Self::extension_for(&media_type);
        Ok(ClassifiedMediaType {
            media_type,
            extension,
        })
    }

    /// Subtype of a `type/subtype` string; `bin` when it has no single `/`.
    pub fn extension_for(media_type: &str) -> String {
        let parts: Vec<&str> = media_type.split('/').collect();
        if parts.len() != 2 || parts[1].is_empty() {
            return "bin".to_string();
        }
        parts[1].to_string()
    }
}

/// Parse the base `type/subtype` of a MIME value, ignoring any parameters.
pub fn parse_media_type(declared: &str) -> Result<String, AppError> {
    let base = declared.split(';').next().unwrap_or_default().trim();

    let (kind, subtype) = base.split_once('/').ok_or_else(|| {
        AppError::InvalidInput(format!("Malformed content type '{}'", declared))
    })?;

    if kind.is_empty()
        || subtype.is_empty()
        || !kind.chars().all(is_token_char)
        || !subtype.chars().all(is_token_char)
    {
        return Err(AppError::InvalidInput(format!(
            "Malformed content type '{}'",
            declared
        )));
    }

    Ok(format!("{}/{}", kind, subtype).to_lowercase())
}

// RFC 2045 token: printable ASCII without spaces or tspecials.
fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?=".contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_accepts_mp4() {
        let classified = MediaTypeClassifier::for_video().classify("video/mp4").unwrap();
        assert_eq!(classified.media_type, "video/mp4");
        assert_eq!(classified.extension, "mp4");
    }

    #[test]
    fn test_classify_ignores_parameters_and_case() {
        let classified = MediaTypeClassifier::for_video()
            .classify("Video/MP4; codecs=\"avc1.42E01E\"; charset=binary")
            .unwrap();
        assert_eq!(classified.media_type, "video/mp4");
        assert_eq!(classified.extension, "mp4");
    }

    #[test]
    fn test_classify_rejects_unlisted_type() {
        let err = MediaTypeClassifier::for_video()
            .classify("video/avi")
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));
    }

    #[test]
    fn test_classify_rejects_malformed_type() {
        let classifier = MediaTypeClassifier::for_video();
        for declared in ["", "mp4", "video/", "/mp4", "video/mp4/extra", "vid eo/mp4"] {
            let err = classifier.classify(declared).unwrap_err();
            assert!(
                matches!(err, AppError::InvalidInput(_)),
                "expected InvalidInput for {:?}, got {:?}",
                declared,
                err
            );
        }
    }

    #[test]
    fn test_extension_is_subtype_for_every_accepted_type() {
        let classifier = MediaTypeClassifier::for_thumbnail();
        for allowed in classifier.allowed().to_vec() {
            let classified = classifier.classify(&allowed).unwrap();
            let subtype = allowed.split('/').nth(1).unwrap();
            assert_eq!(classified.extension, subtype);
        }
    }

    #[test]
    fn test_thumbnail_classifier_rejects_video() {
        let err = MediaTypeClassifier::for_thumbnail()
            .classify("video/mp4")
            .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMediaType(_)));
    }

    #[test]
    fn test_extension_for_falls_back_to_bin() {
        assert_eq!(MediaTypeClassifier::extension_for("video/mp4"), "mp4");
        assert_eq!(MediaTypeClassifier::extension_for("garbage"), "bin");
        assert_eq!(MediaTypeClassifier::extension_for("a/b/c"), "bin");
    }
}
