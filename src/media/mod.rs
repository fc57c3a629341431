//! Media store seam: uploads product images to an external host and deletes them again.
//!
//! The workflow only ever sees `dyn MediaStore`; `CloudinaryStore` is the production
//! implementation.

pub mod cloudinary;

use async_trait::async_trait;
use thiserror::Error;

pub use cloudinary::CloudinaryStore;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media store is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("Media store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Media store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Cannot derive a media id from url: {0}")]
    InvalidUrl(String),
}

/// One image file received from a multipart request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// File name without its extension, restricted to characters safe in a media id.
    pub fn stem(&self) -> String {
        let stem = self.file_name.split('.').next().unwrap_or_default();
        let cleaned: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        if cleaned.is_empty() {
            "image".to_string()
        } else {
            cleaned
        }
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store the image and return its stable public URL.
    async fn upload(&self, image: &ImageUpload, product_id: i32) -> Result<String, MediaError>;

    /// Remove the image addressed by a URL previously returned from `upload`.
    /// Deleting an image that no longer exists succeeds.
    async fn delete(&self, url: &str) -> Result<(), MediaError>;
}

/// Media id for a hosted URL: the path after the `upload` segment, minus the version
/// segment and the file extension (`.../upload/v17/products/p_1_a.jpg` -> `products/p_1_a`).
pub fn public_id_from_url(raw: &str) -> Result<String, MediaError> {
    let url = url::Url::parse(raw).map_err(|_| MediaError::InvalidUrl(raw.to_string()))?;
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let mut tail: Vec<&str> = match segments.iter().position(|seg| *seg == "upload") {
        Some(idx) => segments[idx + 1..].to_vec(),
        None => segments.iter().rev().take(2).rev().copied().collect(),
    };

    if let Some(first) = tail.first() {
        if is_version_segment(first) {
            tail.remove(0);
        }
    }

    let last = tail.pop().ok_or_else(|| MediaError::InvalidUrl(raw.to_string()))?;
    let last = match last.rsplit_once('.') {
        Some((name, _ext)) if !name.is_empty() => name,
        _ => last,
    };
    tail.push(last);
    Ok(tail.join("/"))
}

fn is_version_segment(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_version_and_extension() {
        let id = public_id_from_url(
            "https://res.cloudinary.com/demo/image/upload/v1712345678/products/product_7_front.jpg",
        )
        .unwrap();
        assert_eq!(id, "products/product_7_front");
    }

    #[test]
    fn keeps_nested_folders_without_version() {
        let id = public_id_from_url("https://res.cloudinary.com/demo/image/upload/shop/products/p_1.png").unwrap();
        assert_eq!(id, "shop/products/p_1");
    }

    #[test]
    fn falls_back_to_last_two_segments() {
        let id = public_id_from_url("https://cdn.example.com/a/b/products/p_2_side.webp").unwrap();
        assert_eq!(id, "products/p_2_side");
    }

    #[test]
    fn rejects_non_urls() {
        assert!(matches!(public_id_from_url("not a url"), Err(MediaError::InvalidUrl(_))));
        assert!(public_id_from_url("https://cdn.example.com/").is_err());
    }

    #[test]
    fn stem_is_sanitized() {
        let upload = ImageUpload {
            file_name: "front view.v2.jpg".into(),
            content_type: Some("image/jpeg".into()),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(upload.stem(), "front_view");

        let unnamed = ImageUpload { file_name: ".jpg".into(), content_type: None, bytes: vec![] };
        assert_eq!(unnamed.stem(), "image");
    }
}
