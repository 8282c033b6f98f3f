//! Index selection: random draws, explicit index checks and range listings.
//!
//! Explicit lookups go through two steps, [`parse_index`] then
//! [`IndexPolicy::check`], so a deployment can choose whether out-of-range
//! indices are rejected up front or left to fail at the file read.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{RaccError, Result};
use crate::inventory::Inventory;
use crate::kind::AssetKind;

/// Default listing length for `take`.
pub const DEFAULT_TAKE: u32 = 25;

/// Default listing start for image listings.
pub const DEFAULT_IMAGE_FROM: u32 = 1;

/// How explicit indices are bounds-checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexPolicy {
    /// Accept any parsed index; a missing file surfaces as a read error.
    #[default]
    Permissive,
    /// Reject indices outside `1..count` before touching the disk.
    Strict,
}

impl IndexPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            IndexPolicy::Strict
        } else {
            IndexPolicy::Permissive
        }
    }

    pub fn check(self, inventory: &Inventory, kind: AssetKind, index: u32) -> Result<u32> {
        match self {
            IndexPolicy::Permissive => Ok(index),
            IndexPolicy::Strict if index == 0 || index >= inventory.count(kind) => {
                Err(RaccError::IndexOutOfRange {
                    kind,
                    index,
                    max: inventory.max_index(kind),
                })
            }
            IndexPolicy::Strict => Ok(index),
        }
    }
}

/// Uniform draw from `[1, count)`; `1` when `count <= 1`.
pub fn random_index<R: Rng + ?Sized>(count: u32, rng: &mut R) -> u32 {
    if count <= 1 {
        return 1;
    }
    rng.gen_range(1..count)
}

/// Parse a path or query value as a non-negative integer.
pub fn parse_index(raw: &str) -> Result<u32> {
    raw.parse::<u32>()
        .map_err(|e| RaccError::InvalidIndex(format!("{raw:?}: {e}")))
}

/// Parse an optional query value, using `default` when absent or empty.
pub fn parse_or(raw: Option<&str>, default: u32) -> Result<u32> {
    match raw {
        None | Some("") => Ok(default),
        Some(value) => parse_index(value),
    }
}

/// A `from`/`take`/`random` listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRange {
    pub from: u32,
    pub take: u32,
    pub random: bool,
}

impl Default for ListRange {
    fn default() -> Self {
        Self {
            from: DEFAULT_IMAGE_FROM,
            take: DEFAULT_TAKE,
            random: false,
        }
    }
}

impl ListRange {
    /// Indices for this range against an exclusive upper bound `count`.
    ///
    /// Sequential mode yields `from..min(from + take, count)`. Random mode
    /// keeps the same length but redraws every position from `[from, count)`,
    /// so duplicates and any order are possible.
    pub fn indices<R: Rng + ?Sized>(&self, count: u32, rng: &mut R) -> Vec<u32> {
        let end = self.from.saturating_add(self.take).min(count);
        if self.from >= end {
            return Vec::new();
        }
        if self.random {
            (self.from..end)
                .map(|_| rng.gen_range(self.from..count))
                .collect()
        } else {
            (self.from..end).collect()
        }
    }
}
