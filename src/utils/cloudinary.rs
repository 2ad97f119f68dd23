//! Cloudinary image storage using signed uploads.

use std::time::Duration;

use campusdesk_config::CloudinaryCredentials;
use campusdesk_core::file_storage::{StorageFuture, validate_upload};
use campusdesk_core::{FileStorage, StorageError, StoredFile};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Clone)]
pub struct CloudinaryStorage {
    client: reqwest::Client,
    credentials: CloudinaryCredentials,
    max_file_size: usize,
}

impl std::fmt::Debug for CloudinaryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryStorage")
            .field("cloud_name", &self.credentials.cloud_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryStorage {
    pub fn new(credentials: CloudinaryCredentials, max_file_size: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            credentials,
            max_file_size,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            API_BASE, self.credentials.cloud_name, action
        )
    }

    fn signed_params(&self, params: &[(&str, String)]) -> Vec<(String, String)> {
        let signature = sign(params, &self.credentials.api_secret);
        let mut fields: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        fields.push(("api_key".to_string(), self.credentials.api_key.clone()));
        fields.push(("signature".to_string(), signature));
        fields.push(("signature_algorithm".to_string(), "sha256".to_string()));
        fields
    }

    async fn read_error(response: reqwest::Response) -> StorageError {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) => StorageError::Upstream(format!("{}: {}", status, body.error.message)),
            Err(_) => StorageError::Upstream(format!("unexpected status {}", status)),
        }
    }
}

/// Cloudinary request signature: the parameters sorted by name, joined as
/// `k=v&k=v`, followed by the API secret, hashed with SHA-256.
pub fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

impl FileStorage for CloudinaryStorage {
    fn store<'a>(
        &'a self,
        folder: &'a str,
        file_name: &'a str,
        content_type: Option<&'a str>,
        content: &'a [u8],
    ) -> StorageFuture<'a, StoredFile> {
        Box::pin(async move {
            validate_upload(content_type, content, self.max_file_size)?;

            let params = [
                ("folder", folder.to_string()),
                ("timestamp", timestamp()),
            ];

            let mut part = Part::bytes(content.to_vec()).file_name(file_name.to_string());
            if let Some(mime) = content_type {
                part = part
                    .mime_str(mime)
                    .map_err(|e| StorageError::Upstream(e.to_string()))?;
            }

            let form = self
                .signed_params(&params)
                .into_iter()
                .fold(Form::new().part("file", part), |form, (k, v)| {
                    form.text(k, v)
                });

            let response = self
                .client
                .post(self.endpoint("upload"))
                .multipart(form)
                .send()
                .await
                .map_err(|e| StorageError::Upstream(e.to_string()))?;

            if !response.status().is_success() {
                return Err(Self::read_error(response).await);
            }

            let uploaded: UploadResponse = response
                .json()
                .await
                .map_err(|e| StorageError::Upstream(e.to_string()))?;

            debug!(public_id = %uploaded.public_id, "Image uploaded");

            Ok(StoredFile {
                key: uploaded.public_id,
                url: uploaded.secure_url,
            })
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            let params = [("public_id", key.to_string()), ("timestamp", timestamp())];

            let response = self
                .client
                .post(self.endpoint("destroy"))
                .form(&self.signed_params(&params))
                .send()
                .await
                .map_err(|e| StorageError::Upstream(e.to_string()))?;

            if !response.status().is_success() {
                return Err(Self::read_error(response).await);
            }

            Ok(())
        })
    }
}
