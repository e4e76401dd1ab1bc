use chrono::{NaiveDate, TimeZone, Utc};
use sea_orm::Database;

use engine::{
    Engine, EngineError, OTHERS_TAG_ID, OTHERS_TAG_NAME, RangeMode, RangeQuery, TagReportParams,
    TransactionKind, TransactionSource, UserRole,
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

fn march() -> RangeQuery {
    RangeQuery {
        mode: Some(RangeMode::Range),
        start_date: NaiveDate::from_ymd_opt(2026, 3, 1),
        end_date: NaiveDate::from_ymd_opt(2026, 3, 31),
        ..Default::default()
    }
}

fn params(range: RangeQuery) -> TagReportParams {
    TagReportParams {
        line_id: LINE_ID.to_string(),
        range,
        ..Default::default()
    }
}

async fn spend(engine: &Engine, title: &str, amount: i64, day: u32, tags: &[&str]) {
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    engine
        .create_transaction(
            LINE_ID,
            title,
            amount,
            TransactionKind::Expense,
            TransactionSource::Manual,
            Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
            &tags,
        )
        .await
        .unwrap();
}

async fn earn(engine: &Engine, title: &str, amount: i64, day: u32, tags: &[&str]) {
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    engine
        .create_transaction(
            LINE_ID,
            title,
            amount,
            TransactionKind::Income,
            TransactionSource::Manual,
            Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).unwrap(),
            &tags,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn untagged_transactions_land_in_others() {
    let engine = engine_with_user().await;
    spend(&engine, "mystery", 500, 10, &[]).await;

    let report = engine.tag_report(&params(march())).await.unwrap();
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].tag_id, OTHERS_TAG_ID);
    assert_eq!(report.rows[0].tag_name, OTHERS_TAG_NAME);
    assert_eq!(report.rows[0].expense_minor, 500);
}

#[tokio::test]
async fn multi_tag_transactions_count_in_each_bucket() {
    let engine = engine_with_user().await;
    spend(&engine, "dinner out", 800, 10, &["food", "leisure"]).await;

    let report = engine.tag_report(&params(march())).await.unwrap();
    assert_eq!(report.rows.len(), 2);
    assert!(report.rows.iter().all(|r| r.expense_minor == 800));
    // Window totals count the transaction once.
    assert_eq!(report.totals.expense_minor, 800);
}

#[tokio::test]
async fn rows_sort_by_expense_then_name() {
    let engine = engine_with_user().await;
    spend(&engine, "rent", 5_000, 1, &["housing"]).await;
    spend(&engine, "lunch", 700, 2, &["food"]).await;
    spend(&engine, "bus", 700, 3, &["commute"]).await;

    let report = engine.tag_report(&params(march())).await.unwrap();
    assert_eq!(
        report
            .rows
            .iter()
            .map(|r| r.tag_name.as_str())
            .collect::<Vec<_>>(),
        ["housing", "commute", "food"]
    );
}

#[tokio::test]
async fn top_n_folds_tail_into_others() {
    let engine = engine_with_user().await;
    spend(&engine, "rent", 5_000, 1, &["housing"]).await;
    spend(&engine, "food", 3_000, 2, &["food"]).await;
    spend(&engine, "bus", 1_000, 3, &["commute"]).await;
    spend(&engine, "games", 500, 4, &["leisure"]).await;

    let mut p = params(march());
    p.top_n = 2;
    let report = engine.tag_report(&p).await.unwrap();

    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.rows[0].tag_name, "housing");
    assert_eq!(report.rows[1].tag_name, "food");
    let others = &report.rows[2];
    assert_eq!(others.tag_id, OTHERS_TAG_ID);
    assert_eq!(others.expense_minor, 1_500);
    // Fold never changes the window totals.
    assert_eq!(report.totals.expense_minor, 9_500);
}

#[tokio::test]
async fn top_n_without_others_truncates() {
    let engine = engine_with_user().await;
    spend(&engine, "rent", 5_000, 1, &["housing"]).await;
    spend(&engine, "food", 3_000, 2, &["food"]).await;
    spend(&engine, "bus", 1_000, 3, &["commute"]).await;

    let mut p = params(march());
    p.top_n = 2;
    p.include_others = false;
    let report = engine.tag_report(&p).await.unwrap();

    assert_eq!(report.rows.len(), 2);
    assert!(report.rows.iter().all(|r| r.tag_id != OTHERS_TAG_ID));
}

#[tokio::test]
async fn percentages_cover_emitted_rows() {
    let engine = engine_with_user().await;
    spend(&engine, "rent", 7_500, 1, &["housing"]).await;
    spend(&engine, "food", 2_500, 2, &["food"]).await;

    let report = engine.tag_report(&params(march())).await.unwrap();
    assert_eq!(report.rows[0].percent_of_expense, 75.0);
    assert_eq!(report.rows[1].percent_of_expense, 25.0);
    assert_eq!(report.rows[0].color_index, 0);
    assert_eq!(report.rows[1].color_index, 1);
}

#[tokio::test]
async fn income_only_rows_have_zero_percent() {
    let engine = engine_with_user().await;
    earn(&engine, "salary", 10_000, 1, &["work"]).await;

    let report = engine.tag_report(&params(march())).await.unwrap();
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].percent_of_expense, 0.0);
    assert_eq!(report.rows[0].net_minor, 10_000);
    assert_eq!(report.totals.income_minor, 10_000);
}

#[tokio::test]
async fn window_excludes_outside_transactions() {
    let engine = engine_with_user().await;
    spend(&engine, "in window", 500, 10, &["food"]).await;
    engine
        .create_transaction(
            LINE_ID,
            "out of window",
            900,
            TransactionKind::Expense,
            TransactionSource::Manual,
            Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
            &["food".to_string()],
        )
        .await
        .unwrap();

    let report = engine.tag_report(&params(march())).await.unwrap();
    assert_eq!(report.totals.expense_minor, 500);
    assert_eq!(report.rows[0].expense_minor, 500);
}

#[tokio::test]
async fn deactivated_transactions_are_excluded() {
    let engine = engine_with_user().await;
    spend(&engine, "keep", 500, 10, &["food"]).await;

    let id = engine
        .create_transaction(
            LINE_ID,
            "drop",
            900,
            TransactionKind::Expense,
            TransactionSource::Manual,
            Utc.with_ymd_and_hms(2026, 3, 11, 12, 0, 0).unwrap(),
            &["food".to_string()],
        )
        .await
        .unwrap();
    engine.deactivate_transaction(LINE_ID, id).await.unwrap();

    let report = engine.tag_report(&params(march())).await.unwrap();
    assert_eq!(report.totals.expense_minor, 500);
}

#[tokio::test]
async fn duplicate_tag_names_collapse_to_one_bucket() {
    let engine = engine_with_user().await;
    spend(&engine, "lunch", 700, 10, &["Food", " food "]).await;

    let report = engine.tag_report(&params(march())).await.unwrap();
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].expense_minor, 700);
}

#[tokio::test]
async fn top_n_out_of_bounds_is_rejected() {
    let engine = engine_with_user().await;

    let mut p = params(march());
    p.top_n = 0;
    let err = engine.tag_report(&p).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));

    let mut p = params(march());
    p.top_n = 51;
    assert!(engine.tag_report(&p).await.is_err());
}

#[tokio::test]
async fn unknown_user_is_rejected() {
    let engine = engine_with_user().await;

    let mut p = params(march());
    p.line_id = "U-nobody".to_string();
    let err = engine.tag_report(&p).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));
}
