//! Users API endpoints.

use api_types::user::{UserCreate, UserRole as ApiRole, UserSync, UserUpdate, UserView, UsersResponse};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

fn map_role(role: ApiRole) -> engine::UserRole {
    match role {
        ApiRole::Admin => engine::UserRole::Admin,
        ApiRole::User => engine::UserRole::User,
    }
}

fn map_user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        picture_url: user.picture_url,
        role: match user.role {
            engine::UserRole::Admin => ApiRole::Admin,
            engine::UserRole::User => ApiRole::User,
        },
        line_id: user.line_id,
        created_at: user.created_at.fixed_offset(),
        updated_at: user.updated_at.fixed_offset(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .create_user(
            &payload.username,
            payload.picture_url.as_deref(),
            map_role(payload.role.unwrap_or_default()),
            &payload.line_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_user(user))))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<UsersResponse>, ServerError> {
    let users = state
        .engine
        .list_users()
        .await?
        .into_iter()
        .map(map_user)
        .collect();
    Ok(Json(UsersResponse { users }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(line_id): Path<String>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user_by_line_id(&line_id).await?;
    Ok(Json(map_user(user)))
}

pub async fn sync(
    State(state): State<ServerState>,
    Path(line_id): Path<String>,
    Json(payload): Json<UserSync>,
) -> Result<Json<UserView>, ServerError> {
    let user = state
        .engine
        .sync_user(
            &line_id,
            payload.username.as_deref(),
            payload.picture_url.as_deref(),
            payload.role.map(map_role),
        )
        .await?;
    Ok(Json(map_user(user)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(line_id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    if payload.username.is_none() && payload.picture_url.is_none() && payload.role.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of username, picture_url or role".to_string(),
        ));
    }

    let user = state
        .engine
        .update_user(
            &line_id,
            payload.username.as_deref(),
            payload.picture_url.as_deref(),
            payload.role.map(map_role),
        )
        .await?;
    Ok(Json(map_user(user)))
}

pub async fn remove(
    State(state): State<ServerState>,
    Path(line_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(&line_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
