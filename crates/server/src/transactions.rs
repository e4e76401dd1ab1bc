//! Transactions API endpoints.

use api_types::transaction::{
    TransactionCreated, TransactionDeactivate, TransactionKind as ApiKind, TransactionList,
    TransactionListResponse, TransactionNew, TransactionSource as ApiSource,
    TransactionStatus as ApiStatus, TransactionUpdate, TransactionView,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
    }
}

fn map_source(source: ApiSource) -> engine::TransactionSource {
    match source {
        ApiSource::Manual => engine::TransactionSource::Manual,
        ApiSource::System => engine::TransactionSource::System,
    }
}

fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        title: tx.title,
        amount_minor: tx.amount_minor,
        kind: match tx.kind {
            engine::TransactionKind::Income => ApiKind::Income,
            engine::TransactionKind::Expense => ApiKind::Expense,
        },
        status: match tx.status {
            engine::TransactionStatus::Active => ApiStatus::Active,
            engine::TransactionStatus::Inactive => ApiStatus::Inactive,
        },
        source: match tx.source {
            engine::TransactionSource::Manual => ApiSource::Manual,
            engine::TransactionSource::System => ApiSource::System,
        },
        occurred_at: tx.occurred_at.fixed_offset(),
        created_at: tx.created_at.fixed_offset(),
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let tags = payload.tags.unwrap_or_default();
    let id = state
        .engine
        .create_transaction(
            &payload.line_id,
            &payload.title,
            payload.amount_minor,
            map_kind(payload.kind),
            map_source(payload.source.unwrap_or_default()),
            payload.occurred_at.with_timezone(&Utc),
            &tags,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let patch = engine::TransactionPatch {
        title: payload.title,
        amount_minor: payload.amount_minor,
        kind: payload.kind.map(map_kind),
        occurred_at: payload.occurred_at.map(|dt| dt.with_timezone(&Utc)),
        tags: payload.tags,
    };
    let tx = state
        .engine
        .update_transaction(&payload.line_id, id, patch)
        .await?;
    Ok(Json(map_transaction(tx)))
}

pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionDeactivate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .deactivate_transaction(&payload.line_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let limit = payload.limit.unwrap_or(50);
    let filter = engine::TransactionListFilter {
        from: payload.from.map(|dt| dt.with_timezone(&Utc)),
        to: payload.to.map(|dt| dt.with_timezone(&Utc)),
        kinds: payload
            .kinds
            .map(|kinds| kinds.into_iter().map(map_kind).collect()),
        include_inactive: payload.include_inactive.unwrap_or(false),
    };

    let (txs, next_cursor) = state
        .engine
        .list_transactions_page(&payload.line_id, limit, payload.cursor.as_deref(), &filter)
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(map_transaction).collect(),
        next_cursor,
    }))
}
