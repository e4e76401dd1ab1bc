pub use date_range::{RangeMode, RangeQuery};
pub use error::EngineError;
pub use ops::{
    Engine, EngineBuilder, PeriodTotals, SummaryWindow, TagReport, TagReportParams, TagReportRow,
    TagReportTotals, TransactionListFilter, TransactionPatch, OTHERS_TAG_ID, OTHERS_TAG_NAME,
};
pub use tags::Tag;
pub use transactions::{Transaction, TransactionKind, TransactionSource, TransactionStatus};
pub use users::{User, UserRole};

mod date_range;
mod error;
mod ops;
mod period_summaries;
mod tags;
mod transaction_tags;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
