//! Uploaded media storage
//!
//! Recipe images are written below the media root as
//! `uploads/recipe/<uuid>.<ext>` and served back under [`MEDIA_URL`].

use std::path::Path;

use crate::error::ApiError;

/// URL prefix the media root is served under
pub const MEDIA_URL: &str = "/media";

/// Directory, relative to the media root, holding recipe images
const RECIPE_UPLOAD_DIR: &str = "uploads/recipe";

/// Media-relative path for a new recipe image with the given extension
pub fn recipe_image_path(extension: &str) -> String {
    format!("{}/{}.{}", RECIPE_UPLOAD_DIR, uuid::Uuid::new_v4(), extension)
}

/// Public URL for a media-relative path
pub fn media_url(relative: &str) -> String {
    format!("{}/{}", MEDIA_URL, relative)
}

/// Write `data` to `relative` below `media_root`, creating directories as needed
pub async fn save_upload(media_root: &Path, relative: &str, data: &[u8]) -> Result<(), ApiError> {
    let target = media_root.join(relative);

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            tracing::error!(error = %e, dir = %parent.display(), "Failed to create media directory");
            ApiError::internal("Failed to store uploaded file")
        })?;
    }

    tokio::fs::write(&target, data).await.map_err(|e| {
        tracing::error!(error = %e, path = %target.display(), "Failed to write uploaded file");
        ApiError::internal("Failed to store uploaded file")
    })?;

    tracing::info!(path = %relative, bytes = data.len(), "Stored uploaded file");
    Ok(())
}

/// Best-effort removal of a previously stored file
pub async fn remove_upload(media_root: &Path, relative: &str) {
    if let Err(e) = tokio::fs::remove_file(media_root.join(relative)).await {
        tracing::warn!(error = %e, path = %relative, "Failed to remove replaced upload");
    }
}
