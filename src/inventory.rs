//! Startup-time asset counts.
//!
//! The inventory is computed once and never re-scanned. Each count is the
//! number of matching files plus a configurable `index_base`; with the
//! default base of `1` the count is an exclusive upper bound for the
//! 1-based file names (`racc1..racc<n>`).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::kind::AssetKind;

/// Default headroom added to every directory count.
pub const DEFAULT_INDEX_BASE: u32 = 1;

/// Immutable per-kind counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Inventory {
    images: u32,
    transparent: u32,
    videos: u32,
    index_base: u32,
}

impl Inventory {
    /// Build from raw file counts, applying `index_base` to each.
    pub fn from_counts(images: u32, transparent: u32, videos: u32, index_base: u32) -> Self {
        Self {
            images: images.saturating_add(index_base),
            transparent: transparent.saturating_add(index_base),
            videos: videos.saturating_add(index_base),
            index_base,
        }
    }

    /// Count matching files below `root`. Missing directories count as empty.
    pub fn scan(root: &Path, index_base: u32) -> Self {
        let images = count_files(root, AssetKind::Image);
        let transparent = count_files(root, AssetKind::TransparentImage);
        let videos = count_files(root, AssetKind::Video);

        tracing::info!(
            root = %root.display(),
            images,
            transparent,
            videos,
            index_base,
            "Asset inventory scanned"
        );

        Self::from_counts(images, transparent, videos, index_base)
    }

    pub fn count(&self, kind: AssetKind) -> u32 {
        match kind {
            AssetKind::Image => self.images,
            AssetKind::TransparentImage => self.transparent,
            AssetKind::Video => self.videos,
        }
    }

    pub fn index_base(&self) -> u32 {
        self.index_base
    }

    /// Highest index the count claims is available (at least 1).
    pub fn max_index(&self, kind: AssetKind) -> u32 {
        self.count(kind).saturating_sub(1).max(1)
    }

    /// Names in `1..count` that have no file on disk under any accepted extension.
    ///
    /// Used at startup to flag a mismatch between the counted entries and the
    /// `racc<index>` naming the selector relies on.
    pub fn missing_names(&self, root: &Path) -> Vec<PathBuf> {
        let mut missing = Vec::new();
        for kind in AssetKind::ALL {
            for index in 1..self.count(kind) {
                let exists = kind
                    .extensions()
                    .iter()
                    .any(|ext| kind.file_path(root, index, ext).is_file());
                if !exists {
                    missing.push(kind.file_path(root, index, kind.extensions()[0]));
                }
            }
        }
        missing
    }
}

fn count_files(root: &Path, kind: AssetKind) -> u32 {
    let dir = kind.dir(root);
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), error = %err, "Asset directory unreadable, counting as empty");
            return 0;
        }
    };

    let count = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| kind.accepts_extension(ext))
        })
        .count();

    u32::try_from(count).unwrap_or(u32::MAX)
}
