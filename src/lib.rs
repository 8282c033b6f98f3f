//! Core of the raccoon media API.
//!
//! This crate owns everything that does not depend on HTTP: which files
//! exist, how an index is picked, what a metadata response looks like and
//! how requests are counted. The `server` crate in `crates/server` wraps it
//! in an axum router.
//!
//! ```rust,no_run
//! use racc::{AssetKind, Catalog, CatalogOptions};
//!
//! # async fn demo() -> racc::Result<()> {
//! let catalog = Catalog::open(&CatalogOptions::default());
//! let index = catalog.random_index(AssetKind::Image, &mut rand::thread_rng());
//! let asset = catalog.fetch(AssetKind::Image, index).await?;
//! println!("{} bytes of {}", asset.bytes.len(), asset.content_type);
//! # Ok(())
//! # }
//! ```

pub mod alt;
pub mod catalog;
pub mod counter;
pub mod error;
pub mod facts;
pub mod inventory;
pub mod kind;
pub mod period;
pub mod selector;
pub mod shape;

pub use alt::{AltTextTable, DEFAULT_ALT};
pub use catalog::{Catalog, CatalogOptions};
pub use counter::{CounterConfig, InMemoryCounter, PLACEHOLDERS, RequestCounter};
#[cfg(feature = "embedded")]
pub use counter::RedbCounter;
pub use error::{RaccError, Result};
pub use facts::{FACTS, list_facts, random_fact};
pub use inventory::Inventory;
pub use kind::AssetKind;
pub use period::{Period, period_index};
pub use selector::{IndexPolicy, ListRange, parse_index, random_index};
pub use shape::{Asset, AssetMetadata, ImageMetadata, VideoMetadata};
