//! The immutable media catalog built at startup.
//!
//! A [`Catalog`] bundles the media root, the [`Inventory`] counts, the
//! [`AltTextTable`] and the [`IndexPolicy`]. It is built once and shared
//! read-only across requests.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::alt::AltTextTable;
use crate::error::{RaccError, Result};
use crate::inventory::{DEFAULT_INDEX_BASE, Inventory};
use crate::kind::AssetKind;
use crate::period::{Period, period_index};
use crate::selector::{IndexPolicy, ListRange, parse_index, random_index};
use crate::shape::{
    Asset, AssetMetadata, ImageMetadata, VideoMetadata, asset_url, decode_dimensions,
};

/// Inputs for [`Catalog::open`].
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub root: PathBuf,
    pub alt_text: Option<PathBuf>,
    pub index_base: u32,
    pub index_policy: IndexPolicy,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("raccs"),
            alt_text: Some(PathBuf::from("utils/alt.json")),
            index_base: DEFAULT_INDEX_BASE,
            index_policy: IndexPolicy::Permissive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    inventory: Inventory,
    alt: AltTextTable,
    policy: IndexPolicy,
}

impl Catalog {
    pub fn new(root: PathBuf, inventory: Inventory, alt: AltTextTable, policy: IndexPolicy) -> Self {
        Self {
            root,
            inventory,
            alt,
            policy,
        }
    }

    /// Scan the media root, load alt text and report naming gaps.
    ///
    /// Never fails: an unreadable alt-text file or media directory is logged
    /// and replaced by empty defaults.
    pub fn open(options: &CatalogOptions) -> Self {
        let inventory = Inventory::scan(&options.root, options.index_base);

        let missing = inventory.missing_names(&options.root);
        if !missing.is_empty() {
            tracing::warn!(
                count = missing.len(),
                files = ?missing,
                "Inventory counts point at files that do not exist"
            );
        }

        let alt = match &options.alt_text {
            Some(path) => AltTextTable::load_or_default(path),
            None => AltTextTable::default(),
        };

        Self::new(options.root.clone(), inventory, alt, options.index_policy)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn alt(&self) -> &AltTextTable {
        &self.alt
    }

    pub fn policy(&self) -> IndexPolicy {
        self.policy
    }

    pub fn count(&self, kind: AssetKind) -> u32 {
        self.inventory.count(kind)
    }

    pub fn random_index<R: Rng + ?Sized>(&self, kind: AssetKind, rng: &mut R) -> u32 {
        random_index(self.count(kind), rng)
    }

    pub fn period_index(&self, kind: AssetKind, now: DateTime<Utc>, period: Period) -> u32 {
        period_index(now, period, self.count(kind))
    }

    /// Parse an explicit index and apply the catalog's [`IndexPolicy`].
    pub fn resolve_index(&self, kind: AssetKind, raw: &str) -> Result<u32> {
        let index = parse_index(raw)?;
        self.policy.check(&self.inventory, kind, index)
    }

    pub fn list_indices<R: Rng + ?Sized>(
        &self,
        kind: AssetKind,
        range: ListRange,
        rng: &mut R,
    ) -> Vec<u32> {
        range.indices(self.count(kind), rng)
    }

    /// First existing file for `index`, trying the kind's extensions in order.
    pub async fn locate(&self, kind: AssetKind, index: u32) -> Result<(PathBuf, &'static str)> {
        let mut last_err = io::Error::from(io::ErrorKind::NotFound);
        for &ext in kind.extensions() {
            let path = kind.file_path(&self.root, index, ext);
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => return Ok((path, ext)),
                Ok(_) => last_err = io::Error::from(io::ErrorKind::NotFound),
                Err(err) => last_err = err,
            }
        }
        Err(RaccError::AssetRead {
            kind,
            index,
            source: last_err,
        })
    }

    /// Read the whole file for a binary response.
    pub async fn fetch(&self, kind: AssetKind, index: u32) -> Result<Asset> {
        let (path, ext) = self.locate(kind, index).await?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| RaccError::AssetRead {
                kind,
                index,
                source,
            })?;

        Ok(Asset {
            kind,
            index,
            path,
            content_type: kind.content_type(ext),
            bytes: Bytes::from(bytes),
        })
    }

    /// Metadata for a single lookup.
    ///
    /// A missing file is an error. A header that cannot be decoded is logged
    /// and reported as `0x0`.
    pub async fn describe(&self, kind: AssetKind, index: u32, base_url: &str) -> Result<AssetMetadata> {
        let (path, _) = self.locate(kind, index).await?;
        if !kind.has_dimensions() {
            return Ok(self.video_metadata(index, base_url));
        }

        let (width, height) = match decode_dimensions(path.clone()).await {
            Ok(dims) => dims,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Could not decode image header");
                (0, 0)
            }
        };
        Ok(self.image_metadata(kind, index, width, height, base_url))
    }

    /// Metadata for a batch listing.
    ///
    /// Items whose file is missing or whose header cannot be decoded are
    /// logged and left out, so every returned URL resolves.
    pub async fn describe_listing(
        &self,
        kind: AssetKind,
        indices: &[u32],
        base_url: &str,
    ) -> Vec<AssetMetadata> {
        let mut out = Vec::with_capacity(indices.len());
        for &index in indices {
            let path = match self.locate(kind, index).await {
                Ok((path, _)) => path,
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping listing entry");
                    continue;
                }
            };

            if !kind.has_dimensions() {
                out.push(self.video_metadata(index, base_url));
                continue;
            }

            match decode_dimensions(path.clone()).await {
                Ok((width, height)) => {
                    out.push(self.image_metadata(kind, index, width, height, base_url));
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Skipping undecodable listing entry");
                }
            }
        }
        out
    }

    fn image_metadata(
        &self,
        kind: AssetKind,
        index: u32,
        width: u32,
        height: u32,
        base_url: &str,
    ) -> AssetMetadata {
        AssetMetadata::Image(ImageMetadata {
            url: asset_url(base_url, kind, index),
            index,
            width,
            height,
            alt: self.alt.get_index(index).to_string(),
        })
    }

    fn video_metadata(&self, index: u32, base_url: &str) -> AssetMetadata {
        AssetMetadata::Video(VideoMetadata {
            url: asset_url(base_url, AssetKind::Video, index),
            index,
            alt: self.alt.get_index(index).to_string(),
        })
    }
}
