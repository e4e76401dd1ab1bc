//! Tags API endpoints.

use api_types::tag::{TagCreate, TagSearch, TagView, TagsResponse};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

fn map_tag(tag: engine::Tag) -> TagView {
    TagView {
        id: tag.id,
        name: tag.name,
        slug: tag.slug,
    }
}

pub async fn search(
    State(state): State<ServerState>,
    Query(params): Query<TagSearch>,
) -> Result<Json<TagsResponse>, ServerError> {
    let tags = state
        .engine
        .search_tags(&params.line_id, params.q.as_deref())
        .await?
        .into_iter()
        .map(map_tag)
        .collect();
    Ok(Json(TagsResponse { tags }))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TagCreate>,
) -> Result<(StatusCode, Json<TagView>), ServerError> {
    let tag = state
        .engine
        .create_tag(&payload.line_id, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(map_tag(tag))))
}
