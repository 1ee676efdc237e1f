//! Image upload validation and naming.

use crate::error::{EditorError, ValidationError};
use crate::store::ImageStore;
use chrono::Utc;
use uuid::Uuid;

/// Filename used when sanitizing leaves nothing.
const FALLBACK_FILENAME: &str = "upload";

/// An image received from the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original filename as supplied by the client.
    pub filename: String,
    /// Declared MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Checks the MIME type against `allowed` and rejects empty payloads.
    pub fn validate(&self, allowed: &[String]) -> Result<(), ValidationError> {
        if !allowed.iter().any(|mime| mime == &self.content_type) {
            return Err(ValidationError::UnsupportedImageType {
                mime: self.content_type.clone(),
                allowed: allowed.join(", "),
            });
        }
        if self.bytes.is_empty() {
            return Err(ValidationError::EmptyUpload);
        }
        Ok(())
    }
}

/// Keeps only `[A-Za-z0-9._-]` and strips leading dots.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<millis>-<random id>-<sanitized name>`.
pub fn stored_filename(original: &str) -> String {
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitize_filename(original)
    )
}

/// Validates `upload`, stores it under a unique name and returns its URL.
pub async fn upload_image(
    store: &dyn ImageStore,
    upload: &ImageUpload,
    allowed: &[String],
) -> Result<String, EditorError> {
    upload.validate(allowed)?;
    let filename = stored_filename(&upload.filename);
    let url = store.put(&filename, &upload.bytes).await.map_err(|err| {
        log::error!("Failed to store image {filename}: {err}");
        EditorError::from(err)
    })?;
    log::info!("Uploaded image {} as {url}", upload.filename);
    Ok(url)
}
