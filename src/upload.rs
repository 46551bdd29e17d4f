//! Two-phase image upload flow.
//!
//! Phase 1 is fetching a signed credential from the API (the façade's
//! `upload_signature`, never cached). Phase 2 uploads every selected file
//! directly to the image host in parallel and folds the results into the
//! image list of a room payload. The batch is all-or-nothing: one failed
//! file aborts everything and the prior image set stays as it was. Nothing
//! retries; the caller resubmits.

use futures_util::future::try_join_all;

use crate::api::error::ApiError;
use crate::api::types::{RoomImage, UploadCredential};

/// A file selected for upload, already read into memory.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// What the image host returns for one successfully stored file.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct HostedImage {
    pub secure_url: String,
    pub public_id: String,
}

/// Trait abstracting the external image host for testability.
///
/// In production, [`CloudinaryHost`] uploads over HTTPS. In tests, a mock
/// implementation controls success/failure behavior per file.
#[allow(async_fn_in_trait)]
pub trait ImageHost {
    /// Upload one file under the given signed credential.
    ///
    /// Returns `Ok(HostedImage)` on success, `Err(message)` on failure.
    async fn upload(
        &self,
        file: &UploadFile,
        credential: &UploadCredential,
    ) -> Result<HostedImage, String>;
}

/// Direct-to-host upload client (Cloudinary-style signed upload API).
pub struct CloudinaryHost {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    folder: String,
}

impl CloudinaryHost {
    pub fn new(cloud_name: String, api_key: String, folder: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name,
            api_key,
            folder,
        }
    }
}

impl ImageHost for CloudinaryHost {
    async fn upload(
        &self,
        file: &UploadFile,
        credential: &UploadCredential,
    ) -> Result<HostedImage, String> {
        use reqwest::multipart;

        let url = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            self.cloud_name
        );

        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(|e| format!("Failed to create multipart part: {}", e))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", credential.timestamp.to_string())
            .text("signature", credential.signature.clone())
            .text("folder", self.folder.clone());

        let resp = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| format!("Upload request failed: {}", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("Upload failed ({}): {}", status, body));
        }

        resp.json::<HostedImage>()
            .await
            .map_err(|e| format!("Failed to parse upload response: {}", e))
    }
}

/// Fans an upload batch out to the image host and folds the results into
/// room images, first file primary.
pub struct UploadCoordinator<H: ImageHost> {
    host: H,
}

impl<H: ImageHost> UploadCoordinator<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    /// Upload all files in parallel under one credential.
    ///
    /// Fails the whole batch on the first error; already-finished uploads
    /// are discarded and nothing is folded into the payload. On success the
    /// results keep the caller's file order and the first image is marked
    /// primary (ordering is caller-supplied and not re-validated).
    pub async fn upload_batch(
        &self,
        credential: &UploadCredential,
        files: &[UploadFile],
    ) -> Result<Vec<RoomImage>, ApiError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        log::info!("Uploading {} image(s)", files.len());
        let uploads = files.iter().map(|file| async move {
            self.host
                .upload(file, credential)
                .await
                .map_err(|e| ApiError::Upload(format!("{}: {}", file.file_name, e)))
        });

        let hosted = try_join_all(uploads).await?;
        Ok(hosted
            .into_iter()
            .enumerate()
            .map(|(index, image)| RoomImage {
                url: image.secure_url,
                public_id: image.public_id,
                is_primary: index == 0,
            })
            .collect())
    }
}
