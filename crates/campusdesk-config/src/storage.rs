//! Upload backend configuration.
//!
//! When all three `CLOUDINARY_*` variables are present, images are pushed to
//! Cloudinary. Otherwise they are written under `UPLOAD_DIR` and served from
//! `PUBLIC_UPLOAD_URL`.

use std::env;

#[derive(Clone, Debug)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub cloudinary: Option<CloudinaryCredentials>,
    pub upload_dir: String,
    pub public_upload_url: String,
    pub max_upload_bytes: usize,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        let non_empty = |key: &str| env::var(key).ok().filter(|v| !v.trim().is_empty());

        let cloudinary = match (
            non_empty("CLOUDINARY_CLOUD_NAME"),
            non_empty("CLOUDINARY_API_KEY"),
            non_empty("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryCredentials {
                cloud_name,
                api_key,
                api_secret,
            }),
            _ => None,
        };

        Self {
            cloudinary,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "storage/uploads".to_string()),
            public_upload_url: env::var("PUBLIC_UPLOAD_URL")
                .unwrap_or_else(|_| "http://localhost:8000/uploads".to_string()),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5 * 1024 * 1024), // 5 MiB
        }
    }
}
