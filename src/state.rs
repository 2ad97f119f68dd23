use std::path::PathBuf;
use std::sync::Arc;

use campusdesk_config::{CorsConfig, EmailConfig, JwtConfig, ServerConfig, StorageConfig};
use campusdesk_core::{FileStorage, LocalFileStorage};
use campusdesk_db::{PgPool, init_db_pool};
use tracing::info;

use crate::utils::cloudinary::CloudinaryStorage;
use crate::utils::email::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub cors_config: CorsConfig,
    pub storage_config: StorageConfig,
    pub server_config: ServerConfig,
    pub storage: Arc<dyn FileStorage>,
    pub mailer: Mailer,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("jwt_config", &"<redacted>")
            .field("cors_config", &self.cors_config)
            .field("storage_config", &self.storage_config.upload_dir)
            .field("server_config", &self.server_config.port)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Assembles state around an existing pool. Used by `init_app_state` and
    /// by the integration tests, which get their pool from `#[sqlx::test]`.
    pub fn from_pool(db: PgPool) -> Self {
        let email_config = EmailConfig::from_env();
        let storage_config = StorageConfig::from_env();
        let storage = build_storage(&storage_config);

        Self {
            db,
            jwt_config: JwtConfig::from_env(),
            mailer: Mailer::new(email_config.clone()),
            email_config,
            cors_config: CorsConfig::from_env(),
            server_config: ServerConfig::from_env(),
            storage,
            storage_config,
        }
    }
}

fn build_storage(config: &StorageConfig) -> Arc<dyn FileStorage> {
    match &config.cloudinary {
        Some(credentials) => {
            info!(cloud = %credentials.cloud_name, "Using Cloudinary for uploads");
            Arc::new(CloudinaryStorage::new(
                credentials.clone(),
                config.max_upload_bytes,
            ))
        }
        None => {
            info!(dir = %config.upload_dir, "Using local disk for uploads");
            Arc::new(LocalFileStorage::with_max_size(
                PathBuf::from(&config.upload_dir),
                config.public_upload_url.clone(),
                config.max_upload_bytes,
            ))
        }
    }
}

pub async fn init_app_state() -> AppState {
    AppState::from_pool(init_db_pool().await)
}
