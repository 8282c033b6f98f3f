//! Raccoon media server - HTTP API over the `racc` catalog
//!
//! This crate serves raccoon images, transparent images, videos and facts
//! over HTTP. Every asset endpoint negotiates between raw bytes and a JSON
//! metadata envelope.
//!
//! # Features
//!
//! - **Content negotiation**: `Accept: application/json` or `?json=true`
//! - **Rate limiting**: fixed window per client, keyed on `X-Forwarded-For`
//! - **Request counting**: optional persistent counter reported by `/stats`
//! - **Middleware**: compression, CORS, request ID tracking, structured logging
//! - **Graceful Shutdown**: SIGTERM and Ctrl+C
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API greeting
//! - `GET /health` - Liveness check
//! - `GET /stats` - Request count and inventory sizes
//! - `GET /v1` - v1 greeting
//! - `GET /v1/raccoons?from&take&random` - Image metadata listing
//! - `GET /v1/raccoon` - Random image (`?transparent=true` for transparent)
//! - `GET /v1/raccoon/{index}` - Image by index
//! - `GET /v1/raccoon/transparent/{index}` - Transparent image by index
//! - `GET /v1/raccoftheday` - Image of the UTC day
//! - `GET /v1/racchour`, `GET /v1/raccofthehour` - Image of the UTC hour
//! - `GET /v1/video` - Random video
//! - `GET /v1/video/{index}` - Video by index
//! - `GET /v1/fact` - Random fact
//! - `GET /v1/facts?from&take` - Fact listing

pub mod config;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod negotiate;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use envelope::Envelope;
pub use error::{ServerError, ServerResult};
pub use negotiate::{ClientPrefs, Format};
pub use server::{build_router, start_server};
pub use state::ServerState;
