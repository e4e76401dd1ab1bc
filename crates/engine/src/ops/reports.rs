//! Tag report: per-tag income/expense aggregation over a date window.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, RangeQuery, ResultEngine, TransactionKind, TransactionStatus, tags,
    transaction_tags, transactions,
};

use super::{Engine, users::require_user, with_tx};

/// Synthetic bucket collecting untagged transactions and, when top-N folding
/// is on, everything past the cutoff.
pub const OTHERS_TAG_ID: i64 = 999_999;
pub const OTHERS_TAG_NAME: &str = "others";

const TOP_N_MAX: usize = 50;

/// Parameters of a tag report request.
#[derive(Clone, Debug)]
pub struct TagReportParams {
    pub line_id: String,
    pub range: RangeQuery,
    pub top_n_enabled: bool,
    pub top_n: usize,
    pub include_others: bool,
}

impl Default for TagReportParams {
    fn default() -> Self {
        Self {
            line_id: String::new(),
            range: RangeQuery::default(),
            top_n_enabled: true,
            top_n: 5,
            include_others: true,
        }
    }
}

/// One emitted report row.
#[derive(Clone, Debug, PartialEq)]
pub struct TagReportRow {
    pub tag_id: i64,
    pub tag_name: String,
    pub income_minor: i64,
    pub expense_minor: i64,
    pub net_minor: i64,
    /// Share of this row's expense over the emitted rows' total expense,
    /// in percent rounded to two decimals. Zero when nothing was spent.
    pub percent_of_expense: f64,
    pub color_index: usize,
}

/// Window-wide income/expense totals, independent of the top-N fold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TagReportTotals {
    pub income_minor: i64,
    pub expense_minor: i64,
    pub net_minor: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TagReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub totals: TagReportTotals,
    pub rows: Vec<TagReportRow>,
}

/// Pre-fold aggregation bucket.
#[derive(Clone, Debug)]
struct TagBucket {
    tag_id: i64,
    tag_name: String,
    income_minor: i64,
    expense_minor: i64,
}

impl Engine {
    /// Builds the per-tag report for one user over a resolved date window.
    pub async fn tag_report(&self, params: &TagReportParams) -> ResultEngine<TagReport> {
        if params.top_n_enabled && !(1..=TOP_N_MAX).contains(&params.top_n) {
            return Err(EngineError::InvalidRange(format!(
                "top_n must be within 1..={TOP_N_MAX}"
            )));
        }
        let (start, end) = params.range.resolve(Utc::now().date_naive())?;

        with_tx!(self, |db_tx| {
            require_user(&db_tx, &params.line_id).await?;

            let rows: Vec<transactions::Model> = transactions::Entity::find()
                .filter(transactions::Column::LineId.eq(params.line_id.as_str()))
                .filter(transactions::Column::Status.eq(TransactionStatus::Active.as_str()))
                .filter(transactions::Column::OccurredAt.gte(start))
                .filter(transactions::Column::OccurredAt.lt(end))
                .all(&db_tx)
                .await?;

            let mut totals = TagReportTotals::default();
            for row in &rows {
                match TransactionKind::try_from(row.kind.as_str())? {
                    TransactionKind::Income => totals.income_minor += row.amount_minor,
                    TransactionKind::Expense => totals.expense_minor += row.amount_minor,
                }
            }
            totals.net_minor = totals.income_minor - totals.expense_minor;

            let tags_by_tx = load_tag_links(&db_tx, &rows).await?;
            let buckets = aggregate_buckets(&rows, &tags_by_tx)?;
            let folded = fold_top_n(
                buckets,
                params.top_n_enabled,
                params.top_n,
                params.include_others,
            );

            Ok(TagReport {
                start,
                end,
                totals,
                rows: finalize_rows(folded),
            })
        })
    }
}

/// Loads `(tag_id, tag_name)` pairs per transaction for the window's rows.
async fn load_tag_links<C: sea_orm::ConnectionTrait>(
    conn: &C,
    rows: &[transactions::Model],
) -> ResultEngine<HashMap<Uuid, Vec<(i64, String)>>> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let mut by_tx: HashMap<Uuid, Vec<(i64, String)>> = HashMap::new();
    if ids.is_empty() {
        return Ok(by_tx);
    }

    let links: Vec<(transaction_tags::Model, Option<tags::Model>)> =
        transaction_tags::Entity::find()
            .filter(transaction_tags::Column::TransactionId.is_in(ids))
            .find_also_related(tags::Entity)
            .all(conn)
            .await?;

    for (link, tag) in links {
        let Some(tag) = tag else {
            continue;
        };
        by_tx
            .entry(link.transaction_id)
            .or_default()
            .push((tag.id, tag.name));
    }

    Ok(by_tx)
}

/// Groups the window's transactions by tag. A transaction with N tags
/// contributes its amount to each of them; untagged ones land in the others
/// bucket. Buckets with no income and no expense are dropped.
fn aggregate_buckets(
    rows: &[transactions::Model],
    tags_by_tx: &HashMap<Uuid, Vec<(i64, String)>>,
) -> ResultEngine<Vec<TagBucket>> {
    let mut by_tag: HashMap<i64, TagBucket> = HashMap::new();

    for row in rows {
        let kind = TransactionKind::try_from(row.kind.as_str())?;
        let others = [(OTHERS_TAG_ID, OTHERS_TAG_NAME.to_string())];
        let targets = match tags_by_tx.get(&row.id) {
            Some(tags) if !tags.is_empty() => tags.as_slice(),
            _ => &others,
        };

        for (tag_id, tag_name) in targets {
            let bucket = by_tag.entry(*tag_id).or_insert_with(|| TagBucket {
                tag_id: *tag_id,
                tag_name: tag_name.clone(),
                income_minor: 0,
                expense_minor: 0,
            });
            match kind {
                TransactionKind::Income => bucket.income_minor += row.amount_minor,
                TransactionKind::Expense => bucket.expense_minor += row.amount_minor,
            }
        }
    }

    let mut buckets: Vec<TagBucket> = by_tag
        .into_values()
        .filter(|b| b.income_minor > 0 || b.expense_minor > 0)
        .collect();
    buckets.sort_by(|a, b| {
        b.expense_minor
            .cmp(&a.expense_minor)
            .then_with(|| a.tag_name.cmp(&b.tag_name))
    });
    Ok(buckets)
}

/// Applies the top-N cutoff, folding the tail into the others bucket when
/// requested.
fn fold_top_n(
    buckets: Vec<TagBucket>,
    top_n_enabled: bool,
    top_n: usize,
    include_others: bool,
) -> Vec<TagBucket> {
    if !top_n_enabled || buckets.len() <= top_n {
        return buckets;
    }
    if !include_others {
        let mut head = buckets;
        head.truncate(top_n);
        return head;
    }

    let mut head = buckets;
    let tail = head.split_off(top_n);

    let (tail_income, tail_expense) = tail.iter().fold((0i64, 0i64), |(inc, exp), b| {
        (inc + b.income_minor, exp + b.expense_minor)
    });

    // The others bucket may already exist (untagged transactions); merge
    // rather than emit it twice.
    if let Some(existing) = head.iter_mut().find(|b| b.tag_id == OTHERS_TAG_ID) {
        existing.income_minor += tail_income;
        existing.expense_minor += tail_expense;
    } else {
        head.push(TagBucket {
            tag_id: OTHERS_TAG_ID,
            tag_name: OTHERS_TAG_NAME.to_string(),
            income_minor: tail_income,
            expense_minor: tail_expense,
        });
    }

    head
}

/// Computes net, percent-of-expense and color indexes over the emitted rows.
fn finalize_rows(buckets: Vec<TagBucket>) -> Vec<TagReportRow> {
    let total_expense: i64 = buckets.iter().map(|b| b.expense_minor).sum();

    buckets
        .into_iter()
        .enumerate()
        .map(|(idx, bucket)| {
            let percent = if total_expense > 0 {
                let raw = bucket.expense_minor as f64 / total_expense as f64 * 100.0;
                (raw * 100.0).round() / 100.0
            } else {
                0.0
            };
            TagReportRow {
                tag_id: bucket.tag_id,
                tag_name: bucket.tag_name,
                income_minor: bucket.income_minor,
                expense_minor: bucket.expense_minor,
                net_minor: bucket.income_minor - bucket.expense_minor,
                percent_of_expense: percent,
                color_index: idx,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(id: i64, name: &str, income: i64, expense: i64) -> TagBucket {
        TagBucket {
            tag_id: id,
            tag_name: name.to_string(),
            income_minor: income,
            expense_minor: expense,
        }
    }

    #[test]
    fn fold_keeps_everything_when_disabled() {
        let buckets = vec![bucket(1, "a", 0, 300), bucket(2, "b", 0, 200)];
        let out = fold_top_n(buckets, false, 1, true);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn fold_truncates_without_others() {
        let buckets = vec![
            bucket(1, "a", 0, 300),
            bucket(2, "b", 0, 200),
            bucket(3, "c", 0, 100),
        ];
        let out = fold_top_n(buckets, true, 2, false);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].tag_id, 2);
    }

    #[test]
    fn fold_sums_tail_into_others() {
        let buckets = vec![
            bucket(1, "a", 50, 300),
            bucket(2, "b", 0, 200),
            bucket(3, "c", 10, 100),
            bucket(4, "d", 0, 40),
        ];
        let out = fold_top_n(buckets, true, 2, true);
        assert_eq!(out.len(), 3);
        let others = &out[2];
        assert_eq!(others.tag_id, OTHERS_TAG_ID);
        assert_eq!(others.income_minor, 10);
        assert_eq!(others.expense_minor, 140);
    }

    #[test]
    fn fold_merges_tail_into_existing_others_bucket() {
        let buckets = vec![
            bucket(OTHERS_TAG_ID, OTHERS_TAG_NAME, 0, 500),
            bucket(1, "a", 0, 200),
            bucket(2, "b", 0, 100),
        ];
        let out = fold_top_n(buckets, true, 2, true);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].tag_id, OTHERS_TAG_ID);
        assert_eq!(out[0].expense_minor, 600);
    }

    #[test]
    fn percentages_sum_over_emitted_rows() {
        let rows = finalize_rows(vec![bucket(1, "a", 0, 300), bucket(2, "b", 0, 100)]);
        assert_eq!(rows[0].percent_of_expense, 75.0);
        assert_eq!(rows[1].percent_of_expense, 25.0);
        assert_eq!(rows[0].color_index, 0);
        assert_eq!(rows[1].color_index, 1);
    }

    #[test]
    fn percent_is_zero_without_expense() {
        let rows = finalize_rows(vec![bucket(1, "a", 100, 0)]);
        assert_eq!(rows[0].percent_of_expense, 0.0);
        assert_eq!(rows[0].net_minor, 100);
    }
}
