//! Multipart form parsing helpers
//!
//! Collects the single file field of an upload request, validating its
//! Content-Type and size as it is read.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::error::ApiError;
use crate::validation::{file_too_large, validate_content_type, validate_file_size};

/// Represents a file uploaded via multipart form
#[derive(Debug, Clone)]
pub struct FileField {
    /// File data bytes
    pub data: Vec<u8>,
    /// Content-Type from the multipart field (if provided)
    pub content_type: Option<String>,
    /// Original filename from the multipart field (if provided)
    pub file_name: Option<String>,
}

/// Parsed multipart form fields
#[derive(Debug)]
pub struct MultipartFields {
    /// Name of the field holding the file
    file_field: &'static str,
    file: Option<FileField>,
}

impl MultipartFields {
    /// Parse all fields from a multipart request
    ///
    /// Only `file_field` is read; any other field is drained and ignored.
    /// Reading stops as soon as the file grows past `max_file_size`.
    pub async fn parse(
        multipart: &mut Multipart,
        file_field: &'static str,
        max_file_size: usize,
    ) -> Result<Self, ApiError> {
        let mut file: Option<FileField> = None;
        let mut ignored = Vec::new();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, max_file_size))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name != file_field {
                ignored.push(name);
                continue;
            }

            let content_type = field.content_type().map(|s| s.to_string());
            let file_name = field.file_name().map(|s| s.to_string());

            validate_content_type(content_type.as_deref())?;

            let mut data = Vec::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| multipart_error(e, max_file_size))?
            {
                if data.len() + chunk.len() > max_file_size {
                    return Err(file_too_large(max_file_size));
                }
                data.extend_from_slice(&chunk);
            }

            validate_file_size(data.len(), max_file_size)?;

            file = Some(FileField {
                data,
                content_type,
                file_name,
            });
        }

        if !ignored.is_empty() {
            tracing::debug!(fields = ?ignored, "Ignoring extra multipart fields");
        }

        Ok(Self { file_field, file })
    }

    /// Take the uploaded file
    ///
    /// A missing file is reported as a field error on the file field.
    pub fn require_file(self) -> Result<FileField, ApiError> {
        self.file
            .ok_or_else(|| ApiError::field(self.file_field, "No file was submitted."))
    }
}

/// A body cut off by a length limit is reported against the file field;
/// anything else is a malformed request.
fn multipart_error(e: MultipartError, max_file_size: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return file_too_large(max_file_size);
    }
    tracing::debug!(error = %e, "Malformed multipart body");
    ApiError::bad_request("Malformed multipart/form-data body")
}
