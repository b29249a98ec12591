//! Upload validation module
//!
//! Checks applied to recipe image uploads. Failures are reported as field
//! errors against the upload field so clients get the same error shape as
//! for JSON payloads.

use image::ImageFormat;

use crate::error::ApiError;

/// Multipart field carrying the recipe image
pub const IMAGE_FIELD: &str = "image";

/// Message for bytes that do not decode as a supported image
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Allowed MIME type prefixes for image uploads
const ALLOWED_MIME_PREFIXES: &[&str] = &["image/", "application/octet-stream"];

/// Image formats accepted for recipe photos
const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Validates the Content-Type of an uploaded file
///
/// A missing Content-Type is accepted; the bytes are sniffed afterwards anyway.
pub fn validate_content_type(content_type: Option<&str>) -> Result<(), ApiError> {
    match content_type {
        Some(ct) => {
            let ct_lower = ct.to_lowercase();
            if ALLOWED_MIME_PREFIXES
                .iter()
                .any(|prefix| ct_lower.starts_with(prefix))
            {
                Ok(())
            } else {
                Err(ApiError::field(IMAGE_FIELD, INVALID_IMAGE))
            }
        }
        None => Ok(()),
    }
}

/// Validates the size of an uploaded file
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ApiError> {
    if size == 0 {
        return Err(ApiError::field(IMAGE_FIELD, "The submitted file is empty."));
    }
    if size > max_size {
        return Err(file_too_large(max_size));
    }
    Ok(())
}

/// Field error for an upload exceeding `max_size` bytes
pub fn file_too_large(max_size: usize) -> ApiError {
    let max_mb = max_size / (1024 * 1024);
    ApiError::field(
        IMAGE_FIELD,
        format!("Ensure this file is no larger than {} MB.", max_mb),
    )
}

/// Sniff and fully decode the image, returning its format
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, ApiError> {
    let format = image::guess_format(data)
        .ok()
        .filter(|format| ALLOWED_FORMATS.contains(format))
        .ok_or_else(|| ApiError::field(IMAGE_FIELD, INVALID_IMAGE))?;

    image::load_from_memory_with_format(data, format).map_err(|e| {
        tracing::debug!(error = %e, ?format, "Uploaded image failed to decode");
        ApiError::field(IMAGE_FIELD, INVALID_IMAGE)
    })?;

    Ok(format)
}

/// File extension used when storing an image of `format`
pub fn extension_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpg",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        _ => "png",
    }
}
