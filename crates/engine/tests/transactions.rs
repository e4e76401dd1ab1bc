use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::Database;

use engine::{
    Engine, EngineError, SummaryWindow, TransactionKind, TransactionListFilter, TransactionPatch,
    TransactionSource, TransactionStatus, UserRole,
};
use migration::MigratorTrait;

const LINE_ID: &str = "U-alice";

async fn engine_with_user() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    engine
        .create_user("alice", None, UserRole::User, LINE_ID)
        .await
        .unwrap();
    engine
}

fn at(y: i32, m: u32, d: u32, h: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn daily_totals(engine: &Engine, date: NaiveDate) -> (i64, i64, i64) {
    let totals = engine
        .summary_report(
            LINE_ID,
            SummaryWindow::Daily {
                start: date,
                end: date,
            },
        )
        .await
        .unwrap();
    (
        totals.total_income_minor,
        totals.total_expense_minor,
        totals.total_balance_minor,
    )
}

#[tokio::test]
async fn create_rejects_nonpositive_amount() {
    let engine = engine_with_user().await;

    let err = engine
        .create_transaction(
            LINE_ID,
            "Coffee",
            0,
            TransactionKind::Expense,
            TransactionSource::Manual,
            at(2026, 3, 15, 9),
            &[],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn create_rejects_unknown_user() {
    let engine = engine_with_user().await;

    let err = engine
        .create_transaction(
            "U-nobody",
            "Coffee",
            100,
            TransactionKind::Expense,
            TransactionSource::Manual,
            at(2026, 3, 15, 9),
            &[],
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));
}

#[tokio::test]
async fn create_refreshes_day_rollup() {
    let engine = engine_with_user().await;

    engine
        .create_transaction(
            LINE_ID,
            "Salary",
            100_000,
            TransactionKind::Income,
            TransactionSource::Manual,
            at(2026, 3, 15, 9),
            &[],
        )
        .await
        .unwrap();
    engine
        .create_transaction(
            LINE_ID,
            "Lunch",
            1_200,
            TransactionKind::Expense,
            TransactionSource::Manual,
            at(2026, 3, 15, 12),
            &[],
        )
        .await
        .unwrap();

    assert_eq!(
        daily_totals(&engine, day(2026, 3, 15)).await,
        (100_000, 1_200, 98_800)
    );
}

#[tokio::test]
async fn update_moves_rollup_between_days() {
    let engine = engine_with_user().await;

    let id = engine
        .create_transaction(
            LINE_ID,
            "Lunch",
            1_200,
            TransactionKind::Expense,
            TransactionSource::Manual,
            at(2026, 3, 15, 12),
            &[],
        )
        .await
        .unwrap();

    let patch = TransactionPatch {
        occurred_at: Some(at(2026, 3, 16, 12)),
        ..Default::default()
    };
    engine.update_transaction(LINE_ID, id, patch).await.unwrap();

    assert_eq!(daily_totals(&engine, day(2026, 3, 15)).await, (0, 0, 0));
    assert_eq!(
        daily_totals(&engine, day(2026, 3, 16)).await,
        (0, 1_200, -1_200)
    );
}

#[tokio::test]
async fn update_rejects_inactive_transaction() {
    let engine = engine_with_user().await;

    let id = engine
        .create_transaction(
            LINE_ID,
            "Lunch",
            1_200,
            TransactionKind::Expense,
            TransactionSource::Manual,
            at(2026, 3, 15, 12),
            &[],
        )
        .await
        .unwrap();
    engine.deactivate_transaction(LINE_ID, id).await.unwrap();

    let patch = TransactionPatch {
        amount_minor: Some(1_500),
        ..Default::default()
    };
    let err = engine.update_transaction(LINE_ID, id, patch).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn deactivate_zeroes_rollup_and_hides_from_list() {
    let engine = engine_with_user().await;

    let id = engine
        .create_transaction(
            LINE_ID,
            "Lunch",
            1_200,
            TransactionKind::Expense,
            TransactionSource::Manual,
            at(2026, 3, 15, 12),
            &[],
        )
        .await
        .unwrap();
    engine.deactivate_transaction(LINE_ID, id).await.unwrap();

    assert_eq!(daily_totals(&engine, day(2026, 3, 15)).await, (0, 0, 0));

    let (txs, _) = engine
        .list_transactions_page(LINE_ID, 10, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert!(txs.is_empty());

    let filter = TransactionListFilter {
        include_inactive: true,
        ..Default::default()
    };
    let (txs, _) = engine
        .list_transactions_page(LINE_ID, 10, None, &filter)
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].status, TransactionStatus::Inactive);
}

#[tokio::test]
async fn deactivate_twice_is_rejected() {
    let engine = engine_with_user().await;

    let id = engine
        .create_transaction(
            LINE_ID,
            "Lunch",
            1_200,
            TransactionKind::Expense,
            TransactionSource::Manual,
            at(2026, 3, 15, 12),
            &[],
        )
        .await
        .unwrap();
    engine.deactivate_transaction(LINE_ID, id).await.unwrap();

    let err = engine
        .deactivate_transaction(LINE_ID, id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState(_)));
}

#[tokio::test]
async fn list_paginates_newest_first() {
    let engine = engine_with_user().await;

    for (title, hour) in [("a", 9), ("b", 12), ("c", 15)] {
        engine
            .create_transaction(
                LINE_ID,
                title,
                100,
                TransactionKind::Expense,
                TransactionSource::Manual,
                at(2026, 3, 15, hour),
                &[],
            )
            .await
            .unwrap();
    }

    let (page, cursor) = engine
        .list_transactions_page(LINE_ID, 2, None, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(
        page.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
        ["c", "b"]
    );
    let cursor = cursor.expect("expected a second page");

    let (page, cursor) = engine
        .list_transactions_page(
            LINE_ID,
            2,
            Some(&cursor),
            &TransactionListFilter::default(),
        )
        .await
        .unwrap();
    assert_eq!(
        page.iter().map(|t| t.title.as_str()).collect::<Vec<_>>(),
        ["a"]
    );
    assert!(cursor.is_none());
}

#[tokio::test]
async fn list_filters_by_kind_and_window() {
    let engine = engine_with_user().await;

    engine
        .create_transaction(
            LINE_ID,
            "Salary",
            100_000,
            TransactionKind::Income,
            TransactionSource::Manual,
            at(2026, 3, 15, 9),
            &[],
        )
        .await
        .unwrap();
    engine
        .create_transaction(
            LINE_ID,
            "Lunch",
            1_200,
            TransactionKind::Expense,
            TransactionSource::Manual,
            at(2026, 3, 20, 12),
            &[],
        )
        .await
        .unwrap();

    let filter = TransactionListFilter {
        kinds: Some(vec![TransactionKind::Income]),
        ..Default::default()
    };
    let (txs, _) = engine
        .list_transactions_page(LINE_ID, 10, None, &filter)
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].title, "Salary");

    let filter = TransactionListFilter {
        from: Some(at(2026, 3, 16, 0)),
        to: Some(at(2026, 3, 21, 0)),
        ..Default::default()
    };
    let (txs, _) = engine
        .list_transactions_page(LINE_ID, 10, None, &filter)
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].title, "Lunch");
}

#[tokio::test]
async fn list_rejects_inverted_window() {
    let engine = engine_with_user().await;

    let filter = TransactionListFilter {
        from: Some(at(2026, 3, 21, 0)),
        to: Some(at(2026, 3, 16, 0)),
        ..Default::default()
    };
    let err = engine
        .list_transactions_page(LINE_ID, 10, None, &filter)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));
}

#[tokio::test]
async fn list_rejects_garbage_cursor() {
    let engine = engine_with_user().await;

    let err = engine
        .list_transactions_page(
            LINE_ID,
            10,
            Some("not-a-cursor"),
            &TransactionListFilter::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidCursor(_)));
}

#[tokio::test]
async fn recompute_matches_mutation_driven_rollup() {
    let engine = engine_with_user().await;

    engine
        .create_transaction(
            LINE_ID,
            "Salary",
            100_000,
            TransactionKind::Income,
            TransactionSource::System,
            at(2026, 3, 15, 9),
            &[],
        )
        .await
        .unwrap();

    engine
        .recompute_period_summary(LINE_ID, day(2026, 3, 15))
        .await
        .unwrap();
    assert_eq!(
        daily_totals(&engine, day(2026, 3, 15)).await,
        (100_000, 0, 100_000)
    );
}
