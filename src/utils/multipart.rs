//! Collects a `multipart/form-data` body into text fields and files.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::anyhow;
use axum::body::Bytes;
use axum::extract::Multipart;
use campusdesk_core::{AppError, FileStorage};
use tracing::error;

use crate::metrics::track_upload;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    /// Parts with a file name are files; everything else is text. Empty
    /// files and blank text fields are dropped.
    pub async fn collect(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::bad_request(anyhow!("Invalid multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::bad_request(anyhow!("Failed to read uploaded file: {}", e))
                    })?;
                    if !bytes.is_empty() {
                        form.files.insert(
                            name,
                            UploadedFile {
                                file_name,
                                content_type,
                                bytes,
                            },
                        );
                    }
                }
                None => {
                    let value = field.text().await.map_err(|e| {
                        AppError::bad_request(anyhow!("Invalid form field {}: {}", name, e))
                    })?;
                    form.insert_text(name, value);
                }
            }
        }

        Ok(form)
    }

    fn insert_text(&mut self, name: String, value: String) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            self.fields.insert(name, trimmed.to_string());
        }
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Parses an optional field, answering 400 `message` when it is present but invalid.
    pub fn parse<T: FromStr>(&self, name: &str, message: &str) -> Result<Option<T>, AppError> {
        self.fields
            .get(name)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| AppError::bad_request(anyhow!("{}", message)))
            })
            .transpose()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    #[cfg(test)]
    pub(crate) fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut form = Self::default();
        for (name, value) in pairs {
            form.insert_text(name.to_string(), value.to_string());
        }
        form
    }
}

/// Stores an uploaded image under `folder` and returns its public URL.
pub async fn upload_image(
    storage: &dyn FileStorage,
    folder: &str,
    file: &UploadedFile,
) -> Result<String, AppError> {
    match storage
        .store(
            folder,
            &file.file_name,
            file.content_type.as_deref(),
            &file.bytes,
        )
        .await
    {
        Ok(stored) => {
            track_upload(folder, true);
            Ok(stored.url)
        }
        Err(e) if e.is_client_error() => {
            track_upload(folder, false);
            Err(AppError::bad_request(anyhow!("{}", e)))
        }
        Err(e) => {
            track_upload(folder, false);
            error!(folder = %folder, error = %e, "Image upload failed");
            Err(AppError::internal_error("Failed to upload image"))
        }
    }
}

/// An image given either as an uploaded file or as a URL text field.
pub async fn image_from_form(
    storage: &dyn FileStorage,
    folder: &str,
    form: &mut MultipartForm,
) -> Result<Option<String>, AppError> {
    if let Some(file) = form.take_file("image") {
        return upload_image(storage, folder, &file).await.map(Some);
    }
    Ok(form.text("image"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_are_dropped() {
        let form = MultipartForm::from_pairs(&[("title", "  Lost wallet "), ("location", "   ")]);
        assert_eq!(form.text("title").as_deref(), Some("Lost wallet"));
        assert!(form.text("location").is_none());
    }

    #[test]
    fn test_parse_reports_invalid_values() {
        let form = MultipartForm::from_pairs(&[("price", "12.5"), ("max_participants", "lots")]);
        assert_eq!(form.parse::<f64>("price", "Invalid price").unwrap(), Some(12.5));
        assert!(form.parse::<f64>("missing", "Invalid").unwrap().is_none());

        let err = form
            .parse::<i32>("max_participants", "Invalid max participants")
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
