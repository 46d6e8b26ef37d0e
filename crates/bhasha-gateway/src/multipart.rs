//! Multipart form parsing for file uploads.

use std::collections::HashMap;

use axum::extract::Multipart;

use bhasha_core::types::MediaBlob;

use crate::error::{ApiError, ApiResult};

/// A parsed upload: one file field plus any plain text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<MediaBlob>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Drain `multipart`, keeping the file found under `file_field`.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> ApiResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == file_field {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .map(String::from)
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&file_name)
                            .first_or_octet_stream()
                            .to_string()
                    });
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;
                form.file = Some(MediaBlob::new(data.to_vec(), file_name, content_type));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid form field '{name}': {e}")))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn take_file(&mut self, file_field: &str) -> ApiResult<MediaBlob> {
        self.file
            .take()
            .ok_or_else(|| ApiError::bad_request(format!("Missing file field '{file_field}'")))
    }

    pub fn required(&self, name: &str) -> ApiResult<&str> {
        self.optional(name)
            .ok_or_else(|| ApiError::bad_request(format!("Missing form field '{name}'")))
    }

    /// A text field, treating blank values as absent.
    pub fn optional(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}
