use crate::config::ServerConfig;
use crate::error::ServerResult;
use dashmap::DashMap;
use racc::{Catalog, RequestCounter};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a rate limit check for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Configured requests per window; `0` when limiting is disabled
    pub limit: u32,
    pub remaining: u32,
    /// Time left until the client's window resets
    pub reset_after: Duration,
}

impl RateLimitDecision {
    pub fn is_enforced(&self) -> bool {
        self.limit > 0
    }

    /// Whole seconds until the window resets, rounded up
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.reset_after.as_secs();
        if self.reset_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Immutable startup snapshot of the media directories and alt text
    pub catalog: Arc<Catalog>,

    /// Request counter store; `None` runs stats in placeholder mode
    pub counter: Option<Arc<dyn RequestCounter>>,

    /// Rate limit tracking: client key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, Instant)>>,
}

impl ServerState {
    /// Create new server state, scanning the media root and opening the counter store
    ///
    /// A store that cannot be opened leaves counting disabled so stats fall
    /// back to placeholders.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let catalog = Catalog::open(&config.catalog_options());
        let counter_config = config.counter_config();
        if !counter_config.is_enabled() {
            tracing::warn!("No store configured, request counting disabled");
        }
        let counter = match counter_config.build() {
            Ok(counter) => counter,
            Err(err) => {
                tracing::error!(error = %err, "Counter store unavailable, request counting disabled");
                None
            }
        };
        Ok(Self::with_parts(config, catalog, counter))
    }

    /// Assemble state from already-built parts
    pub fn with_parts(
        config: ServerConfig,
        catalog: Catalog,
        counter: Option<Arc<dyn RequestCounter>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            counter,
            rate_limiter: Arc::new(DashMap::new()),
        }
    }

    pub fn counting_enabled(&self) -> bool {
        self.counter.is_some()
    }

    /// Fixed-window rate limit check for a client key
    pub fn check_rate_limit(&self, key: &str) -> RateLimitDecision {
        let limit = self.config.rate_limit_max;
        let window = self.config.rate_limit_window();
        if limit == 0 {
            return RateLimitDecision {
                allowed: true,
                limit,
                remaining: 0,
                reset_after: Duration::ZERO,
            };
        }
        let now = Instant::now();

        let mut entry = self
            .rate_limiter
            .entry(key.to_string())
            .or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        let reset_after = window.saturating_sub(now.duration_since(*window_start));
        if *count >= limit {
            return RateLimitDecision {
                allowed: false,
                limit,
                remaining: 0,
                reset_after,
            };
        }

        *count += 1;
        RateLimitDecision {
            allowed: true,
            limit,
            remaining: limit - *count,
            reset_after,
        }
    }

    /// Drop rate limit entries whose window has expired
    pub fn prune_rate_limits(&self) {
        let now = Instant::now();
        let window = self.config.rate_limit_window();
        self.rate_limiter
            .retain(|_, (_, start)| now.duration_since(*start) <= window);
    }
}
