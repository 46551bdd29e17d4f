//! Application state and configuration for the admin CLI.
//!
//! Wires the token store, HTTP transport, resource store and upload
//! coordinator together. Everything is constructed here from the
//! environment; no ambient singletons, so tests build their own instances
//! with mock transports.

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::auth::TokenStore;
use crate::api::client::HttpTransport;
use crate::store::ResourceStore;
use crate::upload::{CloudinaryHost, UploadCoordinator};

/// Folder at the image host that room images are stored under.
pub const UPLOAD_FOLDER: &str = "guesthouse-rooms";

/// Image host credentials, present only when configured.
#[derive(Debug, Clone)]
pub struct ImageHostConfig {
    pub cloud_name: String,
    pub api_key: String,
}

/// Runtime configuration resolved from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub image_host: Option<ImageHostConfig>,
    pub vault_path: PathBuf,
}

impl Config {
    /// Resolve configuration from the environment.
    ///
    /// `GUESTHOUSE_API_URL` falls back to a localhost default. The image
    /// host is optional: without `CLOUDINARY_CLOUD_NAME` and
    /// `CLOUDINARY_API_KEY`, image flags on room commands are rejected.
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("GUESTHOUSE_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let image_host = match (
            std::env::var("CLOUDINARY_CLOUD_NAME"),
            std::env::var("CLOUDINARY_API_KEY"),
        ) {
            (Ok(cloud_name), Ok(api_key)) => Some(ImageHostConfig {
                cloud_name,
                api_key,
            }),
            _ => None,
        };

        let vault_path = std::env::var("GUESTHOUSE_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| TokenStore::default_vault_path());

        Self {
            api_base_url,
            image_host,
            vault_path,
        }
    }
}

/// Shared state for CLI command handlers.
pub struct AppState {
    /// Session token, memory plus vault.
    pub tokens: Arc<TokenStore>,

    /// Query/mutation façade over the live API.
    pub store: ResourceStore<HttpTransport>,

    /// Upload coordinator, present when the image host is configured.
    pub uploads: Option<UploadCoordinator<CloudinaryHost>>,
}

impl AppState {
    /// Build the full stack from resolved configuration.
    pub fn new(config: &Config) -> Self {
        let tokens = Arc::new(TokenStore::new(config.vault_path.clone()));
        let transport = HttpTransport::new(&config.api_base_url, Arc::clone(&tokens));
        let store = ResourceStore::new(transport, Arc::clone(&tokens));

        let uploads = config.image_host.as_ref().map(|host| {
            UploadCoordinator::new(CloudinaryHost::new(
                host.cloud_name.clone(),
                host.api_key.clone(),
                UPLOAD_FOLDER.to_string(),
            ))
        });

        Self {
            tokens,
            store,
            uploads,
        }
    }
}
