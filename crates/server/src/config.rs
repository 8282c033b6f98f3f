use racc::{CatalogOptions, CounterConfig, IndexPolicy};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `racc<N>.jpg`, `transparent/` and `videos/`
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,

    /// JSON file mapping index to alt text
    #[serde(default = "default_alt_text_path")]
    pub alt_text_path: PathBuf,

    /// Request counter store; unset runs the stats endpoint in placeholder mode
    #[serde(default)]
    pub store_url: Option<String>,

    /// Added to every directory count at startup
    #[serde(default = "default_index_base")]
    pub index_base: u32,

    /// Reject out-of-range explicit indices before reading the disk
    #[serde(default)]
    pub strict_index: bool,

    /// Rate limit: requests per window per client
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,

    /// Rate limit window in seconds
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Public base URL used in metadata links; derived from the request when unset
    #[serde(default)]
    pub public_url: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            media_root: default_media_root(),
            alt_text_path: default_alt_text_path(),
            store_url: None,
            index_base: default_index_base(),
            strict_index: false,
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            timeout_secs: default_timeout_secs(),
            enable_cors: default_true(),
            public_url: None,
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `racc` config file and
    /// `RACC_*` environment variables
    pub fn load() -> anyhow::Result<Self> {
        // A missing .env is normal outside development
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("racc").required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix("RACC")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;

        // Plain PORT wins, as hosting platforms set it
        if let Ok(port) = std::env::var("PORT") {
            if !port.is_empty() {
                config.port = port.parse()?;
            }
        }

        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get rate limit window as Duration
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn index_policy(&self) -> IndexPolicy {
        IndexPolicy::from_strict(self.strict_index)
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            root: self.media_root.clone(),
            alt_text: Some(self.alt_text_path.clone()),
            index_base: self.index_base,
            index_policy: self.index_policy(),
        }
    }

    pub fn counter_config(&self) -> CounterConfig {
        CounterConfig::from_url(self.store_url.as_deref())
    }

    /// Base URL for metadata links when the request gives no host
    pub fn fallback_base_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_media_root() -> PathBuf {
    PathBuf::from("raccs")
}

fn default_alt_text_path() -> PathBuf {
    PathBuf::from("utils/alt.json")
}

fn default_index_base() -> u32 {
    racc::inventory::DEFAULT_INDEX_BASE
}

fn default_rate_limit_max() -> u32 {
    30
}

fn default_rate_limit_window_secs() -> u64 {
    30
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
