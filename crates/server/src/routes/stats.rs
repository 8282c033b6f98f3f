use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::Json;
use racc::AssetKind;
use racc::counter::random_placeholder;
use serde::Serialize;
use std::sync::Arc;

/// Either a real count or a placeholder when no store is configured
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestTally {
    Count(u64),
    Placeholder(&'static str),
}

/// Stats response body
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "Requests")]
    pub requests: RequestTally,
    #[serde(rename = "Images")]
    pub images: u32,
    #[serde(rename = "Videos")]
    pub videos: u32,
    #[serde(rename = "TransparentImages")]
    pub transparent_images: u32,
}

/// Request count and inventory sizes (GET /stats)
pub async fn stats(State(state): State<Arc<ServerState>>) -> ServerResult<Json<StatsResponse>> {
    let requests = match &state.counter {
        Some(counter) => RequestTally::Count(counter.read().await?),
        None => {
            let placeholder = random_placeholder(&mut rand::thread_rng());
            RequestTally::Placeholder(placeholder)
        }
    };

    let inventory = state.catalog.inventory();
    Ok(Json(StatsResponse {
        success: true,
        message: "stats for the trash panda api :)".to_string(),
        requests,
        images: inventory.count(AssetKind::Image),
        videos: inventory.count(AssetKind::Video),
        transparent_images: inventory.count(AssetKind::TransparentImage),
    }))
}
