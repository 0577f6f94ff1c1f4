use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use trailerforge_common::{MediaSource, VideoId};

use crate::server::{AppContext, AppError};

pub fn media_routes() -> Router<AppContext> {
    Router::new()
        .route("/media/:video_id", get(media_info))
        .route("/refresh", post(refresh))
}

/// Playback sources of a listed video; empty when it cannot be played.
async fn media_info(
    State(ctx): State<AppContext>,
    Path(video_id): Path<String>,
) -> Result<Json<Vec<MediaSource>>, AppError> {
    let cancel = ctx.cancel.child_token();
    let sources = ctx
        .services
        .browse
        .media_sources(&VideoId::new(video_id), &cancel)
        .await?;
    Ok(Json(sources))
}

#[derive(Debug, Serialize)]
struct RefreshResponse {
    items: usize,
}

async fn refresh(State(ctx): State<AppContext>) -> Result<Json<RefreshResponse>, AppError> {
    let cancel = ctx.cancel.child_token();
    let items = ctx.services.browse.refresh(&cancel).await?;
    Ok(Json(RefreshResponse { items }))
}
