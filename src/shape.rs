//! Response payloads: raw asset bytes and the JSON metadata shapes.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use image::{ImageError, ImageReader};
use serde::{Deserialize, Serialize};

use crate::kind::AssetKind;

/// Metadata for an image or transparent image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub url: String,
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub alt: String,
}

/// Metadata for a video. Dimensions are never decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub url: String,
    pub index: u32,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetMetadata {
    Image(ImageMetadata),
    Video(VideoMetadata),
}

impl AssetMetadata {
    pub fn index(&self) -> u32 {
        match self {
            AssetMetadata::Image(meta) => meta.index,
            AssetMetadata::Video(meta) => meta.index,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            AssetMetadata::Image(meta) => &meta.url,
            AssetMetadata::Video(meta) => &meta.url,
        }
    }
}

/// A file read from disk, ready to be sent as a binary body.
#[derive(Debug, Clone)]
pub struct Asset {
    pub kind: AssetKind,
    pub index: u32,
    pub path: PathBuf,
    pub content_type: &'static str,
    pub bytes: Bytes,
}

/// Canonical single-asset URL.
pub fn asset_url(base_url: &str, kind: AssetKind, index: u32) -> String {
    format!(
        "{}{}{}",
        base_url.trim_end_matches('/'),
        kind.url_prefix(),
        index
    )
}

/// Width and height from the image header; pixel data is not decoded.
pub fn read_dimensions(path: &Path) -> Result<(u32, u32), ImageError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()
}

/// [`read_dimensions`] on the blocking pool.
pub async fn decode_dimensions(path: PathBuf) -> Result<(u32, u32), ImageError> {
    tokio::task::spawn_blocking(move || read_dimensions(&path))
        .await
        .map_err(|e| ImageError::IoError(io::Error::other(e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_asset_url() {
        assert_eq!(
            asset_url("https://api.racc.lol/", AssetKind::Image, 4),
            "https://api.racc.lol/v1/raccoon/4"
        );
        assert_eq!(
            asset_url("http://localhost:3000", AssetKind::TransparentImage, 2),
            "http://localhost:3000/v1/raccoon/transparent/2"
        );
        assert_eq!(
            asset_url("http://localhost:3000", AssetKind::Video, 9),
            "http://localhost:3000/v1/video/9"
        );
    }

    #[test]
    fn test_read_dimensions_from_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("racc1.png");
        image::RgbaImage::new(7, 5).save(&path).unwrap();
        assert_eq!(read_dimensions(&path).unwrap(), (7, 5));
    }

    #[test]
    fn test_read_dimensions_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("racc1.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();
        assert!(read_dimensions(&path).is_err());
    }

    #[test]
    fn test_metadata_json_shape() {
        let image = AssetMetadata::Image(ImageMetadata {
            url: "u".into(),
            index: 1,
            width: 2,
            height: 3,
            alt: "a raccoon".into(),
        });
        let value = serde_json::to_value(&image).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"url": "u", "index": 1, "width": 2, "height": 3, "alt": "a raccoon"})
        );

        let video = AssetMetadata::Video(VideoMetadata {
            url: "v".into(),
            index: 2,
            alt: "a raccoon".into(),
        });
        let value = serde_json::to_value(&video).unwrap();
        assert!(value.get("width").is_none());
        assert_eq!(value["index"], 2);
    }
}
