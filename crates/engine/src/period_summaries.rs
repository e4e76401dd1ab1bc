//! Per-day rollups of income/expense/balance per user.
//!
//! Rows are refreshed whenever a transaction mutation touches their day, so
//! reads never have to scan the transactions table.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "period_summaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub line_id: String,
    pub summary_date: Date,
    pub total_income_minor: i64,
    pub total_expense_minor: i64,
    pub total_balance_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
