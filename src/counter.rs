use crate::error::Result;
use async_trait::async_trait;
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Key of the single persisted counter.
pub const REQUEST_COUNT_KEY: &str = "requestCount";

/// Shown on the stats endpoint instead of a number when no store is configured.
pub const PLACEHOLDERS: &[&str] = &[
    "a goose stole the database from the trash can",
    "a raccoon ate the database",
    "the database is in the trash",
    "the database scurried away",
    "missing raccoon- i mean database",
];

pub fn random_placeholder<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    PLACEHOLDERS.choose(rng).copied().unwrap_or(PLACEHOLDERS[0])
}

/// Trait for the persistent request counter.
/// This allows for different storage implementations (e.g., in-memory, Redb).
#[async_trait]
pub trait RequestCounter: Send + Sync {
    /// Add one to the counter and return the new value.
    async fn increment(&self) -> Result<u64>;
    /// Current value; zero when nothing has been counted yet.
    async fn read(&self) -> Result<u64>;
}

/// Configuration for selecting and building a counter store.
///
/// # Example
/// ```
/// use racc::counter::CounterConfig;
///
/// assert_eq!(CounterConfig::from_url(None), CounterConfig::Disabled);
/// assert_eq!(CounterConfig::from_url(Some("memory://")), CounterConfig::InMemory);
/// assert_eq!(
///     CounterConfig::from_url(Some("redb:///data/racc.redb")),
///     CounterConfig::redb("/data/racc.redb"),
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CounterConfig {
    /// No store; the stats endpoint runs in placeholder mode.
    #[default]
    Disabled,
    /// Process-local counter. Useful for testing.
    InMemory,
    /// Use Redb for storage. The `path` is the file path for the database.
    ///
    /// Requires the `embedded` feature (enabled by default).
    Redb { path: String },
}

impl CounterConfig {
    pub fn redb<P: Into<String>>(path: P) -> Self {
        CounterConfig::Redb { path: path.into() }
    }

    /// Interpret a store connection string.
    ///
    /// Absent or blank disables counting; `memory://` keeps the count in
    /// process; `redb://<path>` or a bare path opens a redb file.
    pub fn from_url(url: Option<&str>) -> Self {
        let url = match url.map(str::trim) {
            None | Some("") => return CounterConfig::Disabled,
            Some(url) => url,
        };
        if url == "memory://" || url == "memory" {
            return CounterConfig::InMemory;
        }
        let path = url.strip_prefix("redb://").unwrap_or(url);
        CounterConfig::redb(path)
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, CounterConfig::Disabled)
    }

    /// Build the store, or `None` when counting is disabled.
    pub fn build(&self) -> Result<Option<Arc<dyn RequestCounter>>> {
        match self {
            CounterConfig::Disabled => Ok(None),
            CounterConfig::InMemory => Ok(Some(Arc::new(InMemoryCounter::new()))),
            CounterConfig::Redb { path } => {
                #[cfg(feature = "embedded")]
                {
                    Ok(Some(Arc::new(RedbCounter::open(path)?)))
                }
                #[cfg(not(feature = "embedded"))]
                {
                    let _ = path;
                    Err(crate::error::RaccError::storage(
                        "redb counter disabled at compile time",
                    ))
                }
            }
        }
    }
}

/// An in-memory counter backed by an atomic.
#[derive(Debug, Default)]
pub struct InMemoryCounter {
    count: AtomicU64,
}

impl InMemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestCounter for InMemoryCounter {
    async fn increment(&self) -> Result<u64> {
        Ok(self.count.fetch_add(1, Ordering::Relaxed) + 1)
    }

    async fn read(&self) -> Result<u64> {
        Ok(self.count.load(Ordering::Relaxed))
    }
}

/// The Redb counter implementation.
#[cfg(feature = "embedded")]
pub mod redb;

#[cfg(feature = "embedded")]
pub use self::redb::RedbCounter;
