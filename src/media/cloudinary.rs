use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::{public_id_from_url, ImageUpload, MediaError, MediaStore};
use crate::config::MediaConfig;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Signed-upload client for a Cloudinary-compatible image host.
pub struct CloudinaryStore {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: String,
    /// Per-process upload counter; keeps ids distinct within one timestamp tick.
    sequence: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            folder: config.folder.clone(),
            sequence: AtomicU64::new(0),
        })
    }

    fn ensure_configured(&self) -> Result<(), MediaError> {
        if self.cloud_name.is_empty() {
            return Err(MediaError::NotConfigured("CLOUDINARY_CLOUD_NAME"));
        }
        if self.api_key.is_empty() {
            return Err(MediaError::NotConfigured("CLOUDINARY_API_KEY"));
        }
        if self.api_secret.is_empty() {
            return Err(MediaError::NotConfigured("CLOUDINARY_API_SECRET"));
        }
        Ok(())
    }

    /// Media id for one upload attempt. Ids are never reused across files or attempts, so no
    /// upload overwrites an existing remote image.
    fn public_id(&self, product_id: i32, image: &ImageUpload) -> String {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "product_{}_{:x}{:x}_{}_{}",
            product_id,
            nanos,
            std::process::id(),
            seq,
            image.stem()
        )
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", API_BASE, self.cloud_name, action)
    }

    /// Signed parameters plus `api_key`, `signature` and `signature_algorithm`.
    fn signed_params(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        let signature = sign(&params, &self.api_secret);
        params.push(("api_key", self.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }

    async fn rejection(response: reqwest::Response) -> MediaError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => "unexpected response body".to_string(),
        };
        MediaError::Rejected { status, message }
    }
}

/// Hex SHA-256 over `k=v` pairs sorted by key and joined with `&`, followed by the secret.
pub(crate) fn sign(params: &[(&str, String)], api_secret: &str) -> String {
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
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, image: &ImageUpload, product_id: i32) -> Result<String, MediaError> {
        self.ensure_configured()?;

        let public_id = self.public_id(product_id, image);
        let params = self.signed_params(vec![
            ("folder", self.folder.clone()),
            ("public_id", public_id.clone()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ]);

        let mut part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            part = part.mime_str(content_type)?;
        }

        let mut form = Form::new().part("file", part);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: UploadResponse = response.json().await?;
        debug!(product_id, public_id = %public_id, url = %body.secure_url, "Image uploaded");
        Ok(body.secure_url)
    }

    async fn delete(&self, url: &str) -> Result<(), MediaError> {
        self.ensure_configured()?;

        let public_id = public_id_from_url(url)?;
        let params = self.signed_params(vec![
            ("public_id", public_id.clone()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ]);

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" => {
                debug!(public_id = %public_id, "Image deleted");
                Ok(())
            }
            "not found" => {
                warn!(public_id = %public_id, "Image already absent from media store");
                Ok(())
            }
            other => Err(MediaError::Rejected {
                status: 200,
                message: format!("destroy returned '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn signature_is_order_independent() {
        let a = sign(
            &[("timestamp", "1700000000".into()), ("public_id", "products/p_1".into())],
            "secret",
        );
        let b = sign(
            &[("public_id", "products/p_1".into()), ("timestamp", "1700000000".into())],
            "secret",
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn signature_depends_on_secret() {
        let params = [("public_id", "products/p_1".to_string())];
        assert_ne!(sign(&params, "one"), sign(&params, "two"));
    }

    #[test]
    fn signature_matches_known_digest() {
        // sha256("public_id=abc&timestamp=1secret")
        let digest = sign(&[("timestamp", "1".into()), ("public_id", "abc".into())], "secret");
        let mut hasher = Sha256::new();
        hasher.update(b"public_id=abc&timestamp=1secret");
        assert_eq!(digest, format!("{:x}", hasher.finalize()));
    }

    #[test]
    fn files_sharing_a_name_get_distinct_ids() {
        let store = CloudinaryStore::new(&AppConfig::for_tests().media).unwrap();
        let first = ImageUpload { file_name: "front view.jpg".into(), content_type: None, bytes: vec![0] };
        let second = ImageUpload { file_name: "front_view.png".into(), content_type: None, bytes: vec![1] };
        assert_eq!(first.stem(), second.stem());

        let a = store.public_id(7, &first);
        let b = store.public_id(7, &second);
        let c = store.public_id(7, &first);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("product_7_"));
        assert!(a.ends_with("_front_view"));
    }

    #[tokio::test]
    async fn unconfigured_store_refuses_uploads() {
        let store = CloudinaryStore::new(&AppConfig::for_tests().media).unwrap();
        let image = ImageUpload { file_name: "a.jpg".into(), content_type: None, bytes: vec![0] };
        let err = store.upload(&image, 1).await.unwrap_err();
        assert!(matches!(err, MediaError::NotConfigured("CLOUDINARY_CLOUD_NAME")));
    }
}
