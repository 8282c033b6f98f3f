use crate::envelope::Envelope;
use crate::error::ServerResult;
use crate::negotiate::{ClientPrefs, TRANSPARENT_QUERY_KEY};
use crate::routes::{serve_asset, serve_explicit};
use crate::state::ServerState;
use axum::extract::{Path, State};
use axum::response::Response;
use chrono::Utc;
use racc::selector::{DEFAULT_IMAGE_FROM, DEFAULT_TAKE, parse_or};
use racc::{AssetKind, AssetMetadata, ListRange, Period};
use std::sync::Arc;

/// List image metadata (GET /v1/raccoons?from&take&random)
///
/// Entries whose file is missing or undecodable are left out.
pub async fn list_raccoons(
    State(state): State<Arc<ServerState>>,
    prefs: ClientPrefs,
) -> ServerResult<Envelope<Vec<AssetMetadata>>> {
    let range = ListRange {
        from: parse_or(prefs.query_value("from"), DEFAULT_IMAGE_FROM)?,
        take: parse_or(prefs.query_value("take"), DEFAULT_TAKE)?,
        random: prefs.flag("random"),
    };

    let indices = state
        .catalog
        .list_indices(AssetKind::Image, range, &mut rand::thread_rng());
    let photos = state
        .catalog
        .describe_listing(AssetKind::Image, &indices, &prefs.base_url)
        .await;

    Ok(Envelope::data(photos))
}

/// Random image (GET /v1/raccoon), or a transparent one with `?transparent=true`
pub async fn random_raccoon(State(state): State<Arc<ServerState>>, prefs: ClientPrefs) -> Response {
    let kind = if prefs.flag(TRANSPARENT_QUERY_KEY) {
        AssetKind::TransparentImage
    } else {
        AssetKind::Image
    };
    let index = state.catalog.random_index(kind, &mut rand::thread_rng());
    serve_asset(&state, kind, index, &prefs).await
}

/// Image by index (GET /v1/raccoon/{index})
pub async fn raccoon_by_index(
    State(state): State<Arc<ServerState>>,
    Path(index): Path<String>,
    prefs: ClientPrefs,
) -> Response {
    serve_explicit(&state, AssetKind::Image, &index, &prefs).await
}

/// Transparent image by index (GET /v1/raccoon/transparent/{index})
pub async fn transparent_by_index(
    State(state): State<Arc<ServerState>>,
    Path(index): Path<String>,
    prefs: ClientPrefs,
) -> Response {
    serve_explicit(&state, AssetKind::TransparentImage, &index, &prefs).await
}

/// Same image for the whole UTC day (GET /v1/raccoftheday)
pub async fn raccoon_of_the_day(
    State(state): State<Arc<ServerState>>,
    prefs: ClientPrefs,
) -> Response {
    serve_period(&state, Period::Daily, &prefs).await
}

/// Same image for the whole UTC hour (GET /v1/racchour, /v1/raccofthehour)
pub async fn raccoon_of_the_hour(
    State(state): State<Arc<ServerState>>,
    prefs: ClientPrefs,
) -> Response {
    serve_period(&state, Period::Hourly, &prefs).await
}

async fn serve_period(state: &ServerState, period: Period, prefs: &ClientPrefs) -> Response {
    let index = state
        .catalog
        .period_index(AssetKind::Image, Utc::now(), period);
    serve_asset(state, AssetKind::Image, index, prefs).await
}
