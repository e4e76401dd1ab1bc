use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, TransactionKind, date_range::day_window, period_summaries,
    transactions,
};

use super::{Engine, users::require_user, with_tx};

/// Which rollup rows a summary report aggregates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummaryWindow {
    /// Inclusive day range.
    Daily { start: NaiveDate, end: NaiveDate },
    Monthly { month: u32, year: i32 },
    Yearly { year: i32 },
}

/// Aggregate totals over a set of rollup rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeriodTotals {
    pub total_income_minor: i64,
    pub total_expense_minor: i64,
    pub total_balance_minor: i64,
}

impl SummaryWindow {
    /// Resolve to an inclusive `[first, last]` pair of summary dates.
    fn bounds(self) -> ResultEngine<(NaiveDate, NaiveDate)> {
        match self {
            Self::Daily { start, end } => {
                if start > end {
                    return Err(EngineError::InvalidRange(
                        "start_date must be <= end_date".to_string(),
                    ));
                }
                Ok((start, end))
            }
            Self::Monthly { month, year } => {
                let first = NaiveDate::from_ymd_opt(year, month, 1)
                    .ok_or_else(|| EngineError::InvalidRange(format!("invalid month: {month}")))?;
                let next = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)
                }
                .ok_or_else(|| EngineError::InvalidRange("date out of range".to_string()))?;
                Ok((first, next.pred_opt().unwrap_or(first)))
            }
            Self::Yearly { year } => {
                let first = NaiveDate::from_ymd_opt(year, 1, 1)
                    .ok_or_else(|| EngineError::InvalidRange(format!("invalid year: {year}")))?;
                let last = NaiveDate::from_ymd_opt(year, 12, 31)
                    .ok_or_else(|| EngineError::InvalidRange(format!("invalid year: {year}")))?;
                Ok((first, last))
            }
        }
    }
}

impl Engine {
    /// Sums the per-day rollups of a user over the window. Missing rows count
    /// as zero.
    pub async fn summary_report(
        &self,
        line_id: &str,
        window: SummaryWindow,
    ) -> ResultEngine<PeriodTotals> {
        let (first, last) = window.bounds()?;

        let rows = period_summaries::Entity::find()
            .filter(period_summaries::Column::LineId.eq(line_id))
            .filter(period_summaries::Column::SummaryDate.gte(first))
            .filter(period_summaries::Column::SummaryDate.lte(last))
            .all(&self.database)
            .await?;

        Ok(rows.iter().fold(PeriodTotals::default(), |acc, row| {
            PeriodTotals {
                total_income_minor: acc.total_income_minor + row.total_income_minor,
                total_expense_minor: acc.total_expense_minor + row.total_expense_minor,
                total_balance_minor: acc.total_balance_minor + row.total_balance_minor,
            }
        }))
    }

    /// Recomputes the rollup row of one day from the ledger.
    ///
    /// Exposed for repair jobs; transaction mutations refresh their days
    /// automatically.
    pub async fn recompute_period_summary(
        &self,
        line_id: &str,
        date: NaiveDate,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_user(&db_tx, line_id).await?;
            refresh_period_summary(&db_tx, line_id, date).await
        })
    }
}

/// Recomputes a user's rollup for `date` from the active transactions of that
/// day and upserts the row. Days left without active transactions are zeroed,
/// not deleted.
pub(super) async fn refresh_period_summary<C: ConnectionTrait>(
    conn: &C,
    line_id: &str,
    date: NaiveDate,
) -> ResultEngine<()> {
    let (start, end) = day_window(date);

    let rows = transactions::Entity::find()
        .filter(transactions::Column::LineId.eq(line_id))
        .filter(transactions::Column::Status.eq(crate::TransactionStatus::Active.as_str()))
        .filter(transactions::Column::OccurredAt.gte(start))
        .filter(transactions::Column::OccurredAt.lt(end))
        .all(conn)
        .await?;

    let (income, expense) = rows.iter().try_fold((0i64, 0i64), |(inc, exp), row| {
        match TransactionKind::try_from(row.kind.as_str())? {
            TransactionKind::Income => Ok::<_, EngineError>((inc + row.amount_minor, exp)),
            TransactionKind::Expense => Ok((inc, exp + row.amount_minor)),
        }
    })?;

    let now = Utc::now();
    let existing = period_summaries::Entity::find()
        .filter(period_summaries::Column::LineId.eq(line_id))
        .filter(period_summaries::Column::SummaryDate.eq(date))
        .one(conn)
        .await?;

    match existing {
        Some(model) => {
            let mut active: period_summaries::ActiveModel = model.into();
            active.total_income_minor = ActiveValue::Set(income);
            active.total_expense_minor = ActiveValue::Set(expense);
            active.total_balance_minor = ActiveValue::Set(income - expense);
            active.updated_at = ActiveValue::Set(now);
            active.update(conn).await?;
        }
        None => {
            let active = period_summaries::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                line_id: ActiveValue::Set(line_id.to_string()),
                summary_date: ActiveValue::Set(date),
                total_income_minor: ActiveValue::Set(income),
                total_expense_minor: ActiveValue::Set(expense),
                total_balance_minor: ActiveValue::Set(income - expense),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            active.insert(conn).await?;
        }
    }

    Ok(())
}
