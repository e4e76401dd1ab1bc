use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum UserRole {
        Admin,
        #[default]
        User,
    }

    /// Request body for creating a profile.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreate {
        pub username: String,
        pub picture_url: Option<String>,
        pub role: Option<UserRole>,
        pub line_id: String,
    }

    /// Request body for syncing a profile against upstream data.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserSync {
        pub username: Option<String>,
        pub picture_url: Option<String>,
        pub role: Option<UserRole>,
    }

    /// Request body for a partial profile update.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub username: Option<String>,
        pub picture_url: Option<String>,
        pub role: Option<UserRole>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub username: String,
        pub picture_url: Option<String>,
        pub role: UserRole,
        pub line_id: String,
        pub created_at: DateTime<FixedOffset>,
        pub updated_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsersResponse {
        pub users: Vec<UserView>,
    }
}

pub mod tag {
    use super::*;

    /// Query string of the tag search endpoint.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagSearch {
        pub line_id: String,
        pub q: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagCreate {
        pub line_id: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagView {
        pub id: i64,
        pub name: String,
        pub slug: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagsResponse {
        pub tags: Vec<TagView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Active,
        Inactive,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionSource {
        #[default]
        Manual,
        System,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub line_id: String,
        pub title: String,
        /// Amount in minor currency units; must be positive.
        pub amount_minor: i64,
        pub kind: TransactionKind,
        pub source: Option<TransactionSource>,
        pub occurred_at: DateTime<FixedOffset>,
        pub tags: Option<Vec<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub line_id: String,
        pub title: Option<String>,
        pub amount_minor: Option<i64>,
        pub kind: Option<TransactionKind>,
        pub occurred_at: Option<DateTime<FixedOffset>>,
        /// When present, replaces the whole tag set.
        pub tags: Option<Vec<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionDeactivate {
        pub line_id: String,
    }

    /// Body of the list endpoint. `from`/`to` bound `occurred_at` as
    /// `[from, to)`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub line_id: String,
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
        pub kinds: Option<Vec<TransactionKind>>,
        pub include_inactive: Option<bool>,
        pub limit: Option<u64>,
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub title: String,
        pub amount_minor: i64,
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        pub source: TransactionSource,
        pub occurred_at: DateTime<FixedOffset>,
        pub created_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub next_cursor: Option<String>,
    }
}

pub mod range {
    use super::*;

    /// Date-window modes shared by the reporting endpoints.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RangeMode {
        Today,
        Day,
        SevenDays,
        Month,
        Year,
        Range,
    }

    /// Window parameters; which fields matter depends on `mode`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RangeParams {
        pub mode: Option<RangeMode>,
        pub date: Option<NaiveDate>,
        pub month: Option<u32>,
        pub year: Option<i32>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }
}

pub mod summary {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SummaryType {
        Daily,
        Monthly,
        Yearly,
    }

    /// Body of the period-summary report endpoint.
    ///
    /// - `daily` reads `start_date`/`end_date`.
    /// - `monthly` reads `month`/`year`.
    /// - `yearly` reads `year`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryReportRequest {
        #[serde(rename = "type")]
        pub summary_type: SummaryType,
        pub line_id: String,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
        pub month: Option<u32>,
        pub year: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryReportResponse {
        pub line_id: String,
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub total_balance_minor: i64,
    }
}

pub mod report {
    use super::*;
    pub use super::range::{RangeMode, RangeParams};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagReportRequest {
        pub line_id: String,
        #[serde(flatten)]
        pub range: RangeParams,
        pub top_n_enabled: Option<bool>,
        pub top_n: Option<usize>,
        pub include_others: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportSummary {
        pub income_minor: i64,
        pub expense_minor: i64,
        pub net_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagReportRow {
        pub tag_id: i64,
        pub tag_name: String,
        pub income_minor: i64,
        pub expense_minor: i64,
        pub net_minor: i64,
        pub percent_of_expense: f64,
        pub color_index: usize,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ChartPoint {
        pub x: String,
        pub y: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Charts {
        pub bar: Vec<ChartPoint>,
        pub donut: Vec<ChartPoint>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagReportResponse {
        /// Resolved window start, RFC 3339.
        pub start: DateTime<FixedOffset>,
        /// Resolved window end (exclusive), RFC 3339.
        pub end: DateTime<FixedOffset>,
        pub summary: ReportSummary,
        pub tags: Vec<TagReportRow>,
        pub charts: Charts,
    }
}
