use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use trailerforge_common::{BrowseResult, ChannelInfo, Error};

use crate::browse::{BrowseQuery, Channel};
use crate::server::{AppContext, AppError};

pub fn channel_routes() -> Router<AppContext> {
    Router::new()
        .route("/channels", get(list_channels))
        .route("/channels/:channel_id/items", get(channel_items))
}

async fn list_channels(State(ctx): State<AppContext>) -> Json<Vec<ChannelInfo>> {
    Json(ctx.services.browse.channels())
}

#[derive(Debug, Deserialize)]
struct ItemsQuery {
    folder_id: Option<String>,
    #[serde(default)]
    start_index: usize,
    limit: Option<usize>,
}

async fn channel_items(
    State(ctx): State<AppContext>,
    Path(channel_id): Path<String>,
    Query(params): Query<ItemsQuery>,
) -> Result<Json<BrowseResult>, AppError> {
    let browse = &ctx.services.browse;
    let channel = browse
        .channel(&channel_id)
        .ok_or_else(|| Error::not_found("channel", &channel_id))?;

    let cancel = ctx.cancel.child_token();
    let result = match channel {
        Channel::Trailers => browse.trailers(&cancel).await?,
        Channel::Extras => {
            let query = BrowseQuery {
                folder_id: params.folder_id,
                start_index: params.start_index,
                page_size_hint: params.limit,
            };
            browse.get_items(&query, &cancel).await?
        }
    };

    Ok(Json(result.as_ref().clone()))
}
