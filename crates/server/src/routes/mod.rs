//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `raccoons`: random, indexed, listed and time-bucketed images
//! - `videos`: random and indexed videos
//! - `facts`: canned raccoon facts
//! - `stats`: request count and inventory sizes
//! - `health`: liveness check

pub mod facts;
pub mod health;
pub mod raccoons;
pub mod stats;
pub mod videos;

use crate::envelope::Envelope;
use crate::error::ServerError;
use crate::negotiate::{ClientPrefs, Format};
use crate::state::ServerState;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use racc::AssetKind;

/// Response header carrying the chosen image index
pub const IMAGE_INDEX_HEADER: &str = "x-raccoon-index";

/// Response header carrying the chosen video index
pub const VIDEO_INDEX_HEADER: &str = "x-raccoon-video-index";

/// Root greeting (GET /)
pub async fn api_info() -> Envelope<()> {
    Envelope::message("trash panda discovered! you've found the api.")
}

/// v1 greeting (GET /v1)
pub async fn v1_info() -> Envelope<()> {
    Envelope::message("trash pandas favourite v1, welcome to the trash can.")
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

fn index_header(kind: AssetKind) -> &'static str {
    match kind {
        AssetKind::Video => VIDEO_INDEX_HEADER,
        AssetKind::Image | AssetKind::TransparentImage => IMAGE_INDEX_HEADER,
    }
}

/// Serve one asset as raw bytes or as a metadata envelope.
///
/// The index header is set on success and failure alike.
pub(crate) async fn serve_asset(
    state: &ServerState,
    kind: AssetKind,
    index: u32,
    prefs: &ClientPrefs,
) -> Response {
    let mut response = match prefs.format {
        Format::Json => match state.catalog.describe(kind, index, &prefs.base_url).await {
            Ok(meta) => Envelope::data(meta).into_response(),
            Err(err) => ServerError::from(err).negotiate(Format::Json),
        },
        Format::Binary => match state.catalog.fetch(kind, index).await {
            Ok(asset) => {
                ([(CONTENT_TYPE, HeaderValue::from_static(asset.content_type))], asset.bytes)
                    .into_response()
            }
            Err(err) => ServerError::from(err).negotiate(Format::Binary),
        },
    };

    response
        .headers_mut()
        .insert(index_header(kind), HeaderValue::from(index));
    response
}

/// Parse and policy-check an explicit index, then serve it.
pub(crate) async fn serve_explicit(
    state: &ServerState,
    kind: AssetKind,
    raw: &str,
    prefs: &ClientPrefs,
) -> Response {
    match state.catalog.resolve_index(kind, raw) {
        Ok(index) => serve_asset(state, kind, index, prefs).await,
        Err(err) => ServerError::from(err).negotiate(prefs.format),
    }
}
