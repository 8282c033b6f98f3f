use crate::negotiate::ClientPrefs;
use crate::routes::{serve_asset, serve_explicit};
use crate::state::ServerState;
use axum::extract::{Path, State};
use axum::response::Response;
use racc::AssetKind;
use std::sync::Arc;

/// Random video (GET /v1/video)
///
/// Files are tried as `.mp4` then `.mov`; the content type follows the match.
pub async fn random_video(State(state): State<Arc<ServerState>>, prefs: ClientPrefs) -> Response {
    let index = state
        .catalog
        .random_index(AssetKind::Video, &mut rand::thread_rng());
    serve_asset(&state, AssetKind::Video, index, &prefs).await
}

/// Video by index (GET /v1/video/{index})
pub async fn video_by_index(
    State(state): State<Arc<ServerState>>,
    Path(index): Path<String>,
    prefs: ClientPrefs,
) -> Response {
    serve_explicit(&state, AssetKind::Video, &index, &prefs).await
}
