//! The three kinds of media the catalog serves and where each one lives.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A class of asset with its own directory, extension set and URL prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    TransparentImage,
    Video,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [
        AssetKind::Image,
        AssetKind::TransparentImage,
        AssetKind::Video,
    ];

    /// Sub-directory of the media root holding this kind. Images sit at the root.
    pub fn subdir(self) -> Option<&'static str> {
        match self {
            AssetKind::Image => None,
            AssetKind::TransparentImage => Some("transparent"),
            AssetKind::Video => Some("videos"),
        }
    }

    /// Extensions in lookup order. Videos are tried `.mp4` first, then `.mov`.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            AssetKind::Image => &["jpg"],
            AssetKind::TransparentImage => &["png"],
            AssetKind::Video => &["mp4", "mov"],
        }
    }

    /// Path prefix of the canonical single-asset URL, e.g. `/v1/raccoon/`.
    pub fn url_prefix(self) -> &'static str {
        match self {
            AssetKind::Image => "/v1/raccoon/",
            AssetKind::TransparentImage => "/v1/raccoon/transparent/",
            AssetKind::Video => "/v1/video/",
        }
    }

    /// Whether JSON metadata for this kind carries decoded dimensions.
    pub fn has_dimensions(self) -> bool {
        !matches!(self, AssetKind::Video)
    }

    pub fn dir(self, root: &Path) -> PathBuf {
        match self.subdir() {
            Some(sub) => root.join(sub),
            None => root.to_path_buf(),
        }
    }

    /// `racc<index>.<ext>` inside this kind's directory.
    pub fn file_path(self, root: &Path, index: u32, ext: &str) -> PathBuf {
        self.dir(root).join(format!("racc{index}.{ext}"))
    }

    pub fn accepts_extension(self, ext: &str) -> bool {
        self.extensions()
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext))
    }

    /// Content type for a file of this kind with the given extension.
    pub fn content_type(self, ext: &str) -> &'static str {
        match self {
            AssetKind::Image => "image/jpeg",
            AssetKind::TransparentImage => "image/png",
            AssetKind::Video if ext.eq_ignore_ascii_case("mov") => "video/quicktime",
            AssetKind::Video => "video/mp4",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Image => "image",
            AssetKind::TransparentImage => "transparent image",
            AssetKind::Video => "video",
        };
        f.write_str(name)
    }
}
