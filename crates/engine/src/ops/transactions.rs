use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ResultEngine, Transaction, TransactionKind, TransactionSource, TransactionStatus,
    transactions,
    util::normalize_required_text,
};

use super::{
    Engine,
    summaries::refresh_period_summary,
    tags::{attach_tags, detach_all_tags},
    users::require_user,
    with_tx,
};

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// If present, acts as an allow-list of kinds to return.
    pub kinds: Option<Vec<TransactionKind>>,
    /// If true, includes deactivated transactions (default: false).
    pub include_inactive: bool,
}

/// Partial update of a transaction. `None` fields are left untouched;
/// `tags: Some(..)` replaces the whole tag set.
#[derive(Clone, Debug, Default)]
pub struct TransactionPatch {
    pub title: Option<String>,
    pub amount_minor: Option<i64>,
    pub kind: Option<TransactionKind>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidRange(
            "invalid range: from must be < to".to_string(),
        ));
    }
    if filter.kinds.as_ref().is_some_and(|k| k.is_empty()) {
        return Err(EngineError::InvalidRange(
            "kinds must not be empty".to_string(),
        ));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::OccurredAt.lt(to));
        }

        if !filter.include_inactive {
            self =
                self.filter(transactions::Column::Status.eq(TransactionStatus::Active.as_str()));
        }
        if let Some(kinds) = &filter.kinds {
            let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
            self = self.filter(transactions::Column::Kind.is_in(kinds));
        }

        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TransactionsCursor {
    occurred_at: DateTime<Utc>,
    transaction_id: Uuid,
}

impl TransactionsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))
    }
}

impl Engine {
    /// Records a transaction, attaches its tags and refreshes the day's
    /// rollup, all within one DB transaction.
    pub async fn create_transaction(
        &self,
        line_id: &str,
        title: &str,
        amount_minor: i64,
        kind: TransactionKind,
        source: TransactionSource,
        occurred_at: DateTime<Utc>,
        tags: &[String],
    ) -> ResultEngine<Uuid> {
        let title = normalize_required_text(title, "title")?;
        let tx = Transaction::new(
            line_id.to_string(),
            title,
            amount_minor,
            kind,
            source,
            occurred_at,
        )?;

        with_tx!(self, |db_tx| {
            require_user(&db_tx, line_id).await?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            attach_tags(&db_tx, line_id, tx.id, tags).await?;
            refresh_period_summary(&db_tx, line_id, occurred_at.date_naive()).await?;

            Ok(tx.id)
        })
    }

    /// Applies a partial update to an active transaction and refreshes the
    /// rollups of every day it touched.
    pub async fn update_transaction(
        &self,
        line_id: &str,
        transaction_id: Uuid,
        patch: TransactionPatch,
    ) -> ResultEngine<Transaction> {
        if let Some(amount_minor) = patch.amount_minor
            && amount_minor <= 0
        {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let title = patch
            .title
            .as_deref()
            .map(|t| normalize_required_text(t, "title"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = require_transaction(&db_tx, line_id, transaction_id).await?;
            if model.status == TransactionStatus::Inactive.as_str() {
                return Err(EngineError::InvalidState(
                    "cannot update an inactive transaction".to_string(),
                ));
            }

            let old_day = model.occurred_at.date_naive();
            let mut active: transactions::ActiveModel = model.into();
            if let Some(title) = title {
                active.title = ActiveValue::Set(title);
            }
            if let Some(amount_minor) = patch.amount_minor {
                active.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(kind) = patch.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(occurred_at) = patch.occurred_at {
                active.occurred_at = ActiveValue::Set(occurred_at);
            }
            let model = active.update(&db_tx).await?;

            if let Some(tags) = &patch.tags {
                detach_all_tags(&db_tx, transaction_id).await?;
                attach_tags(&db_tx, line_id, transaction_id, tags).await?;
            }

            let new_day = model.occurred_at.date_naive();
            refresh_period_summary(&db_tx, line_id, old_day).await?;
            if new_day != old_day {
                refresh_period_summary(&db_tx, line_id, new_day).await?;
            }

            Transaction::try_from(model)
        })
    }

    /// Soft-deletes a transaction and refreshes its day's rollup.
    pub async fn deactivate_transaction(
        &self,
        line_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = require_transaction(&db_tx, line_id, transaction_id).await?;
            if model.status == TransactionStatus::Inactive.as_str() {
                return Err(EngineError::InvalidState(
                    "transaction already inactive".to_string(),
                ));
            }

            let day = model.occurred_at.date_naive();
            let mut active: transactions::ActiveModel = model.into();
            active.status = ActiveValue::Set(TransactionStatus::Inactive.as_str().to_string());
            active.update(&db_tx).await?;

            refresh_period_summary(&db_tx, line_id, day).await?;
            Ok(())
        })
    }

    /// Lists a user's transactions with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(occurred_at DESC, transaction_id
    /// DESC)`.
    pub async fn list_transactions_page(
        &self,
        line_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &TransactionListFilter,
    ) -> ResultEngine<(Vec<Transaction>, Option<String>)> {
        with_tx!(self, |db_tx| {
            require_user(&db_tx, line_id).await?;
            validate_list_filter(filter)?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::LineId.eq(line_id))
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = TransactionsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::OccurredAt.lt(cursor.occurred_at))
                        .add(
                            Condition::all()
                                .add(transactions::Column::OccurredAt.eq(cursor.occurred_at))
                                .add(transactions::Column::Id.lt(cursor.transaction_id)),
                        ),
                );
            }
            query = query.apply_tx_filters(filter);

            let rows: Vec<transactions::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut out: Vec<Transaction> = Vec::with_capacity(rows.len().min(limit as usize));
            for tx_model in rows.into_iter().take(limit as usize) {
                out.push(Transaction::try_from(tx_model)?);
            }

            let next_cursor = out.last().map(|tx| TransactionsCursor {
                occurred_at: tx.occurred_at,
                transaction_id: tx.id,
            });
            let next_cursor = if has_more {
                next_cursor.map(|c| c.encode()).transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}

async fn require_transaction<C: sea_orm::ConnectionTrait>(
    conn: &C,
    line_id: &str,
    transaction_id: Uuid,
) -> ResultEngine<transactions::Model> {
    transactions::Entity::find_by_id(transaction_id)
        .filter(transactions::Column::LineId.eq(line_id))
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
}
