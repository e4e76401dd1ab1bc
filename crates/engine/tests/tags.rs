use sea_orm::Database;

use engine::{Engine, EngineError, UserRole};
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

#[tokio::test]
async fn create_normalizes_and_is_idempotent() {
    let engine = engine_with_user().await;

    let first = engine.create_tag(LINE_ID, "  Food  and Drink ").await.unwrap();
    assert_eq!(first.name, "Food and Drink");
    assert_eq!(first.slug, "food and drink");

    // Same slug after normalization: the existing tag comes back.
    let second = engine.create_tag(LINE_ID, "food AND drink").await.unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.name, "Food and Drink");
}

#[tokio::test]
async fn create_rejects_blank_name() {
    let engine = engine_with_user().await;

    let err = engine.create_tag(LINE_ID, "   ").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn create_requires_user() {
    let engine = engine_with_user().await;

    let err = engine.create_tag("U-nobody", "food").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));
}

#[tokio::test]
async fn search_filters_by_substring_and_orders_by_name() {
    let engine = engine_with_user().await;

    for name in ["transport", "groceries", "games"] {
        engine.create_tag(LINE_ID, name).await.unwrap();
    }

    let all = engine.search_tags(LINE_ID, None).await.unwrap();
    assert_eq!(
        all.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        ["games", "groceries", "transport"]
    );

    let hits = engine.search_tags(LINE_ID, Some("g")).await.unwrap();
    assert_eq!(
        hits.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        ["games", "groceries"]
    );
}

#[tokio::test]
async fn search_ignores_case_beyond_ascii() {
    let engine = engine_with_user().await;

    engine.create_tag(LINE_ID, "Café").await.unwrap();
    engine.create_tag(LINE_ID, "Groceries").await.unwrap();

    let hits = engine.search_tags(LINE_ID, Some("CAFÉ")).await.unwrap();
    assert_eq!(
        hits.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        ["Café"]
    );

    let hits = engine.search_tags(LINE_ID, Some("GROC")).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn search_is_scoped_per_user() {
    let engine = engine_with_user().await;
    engine
        .create_user("bob", None, UserRole::User, "U-bob")
        .await
        .unwrap();

    engine.create_tag(LINE_ID, "food").await.unwrap();
    engine.create_tag("U-bob", "rent").await.unwrap();

    let tags = engine.search_tags("U-bob", None).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "rent");
}

#[tokio::test]
async fn slugs_are_independent_between_users() {
    let engine = engine_with_user().await;
    engine
        .create_user("bob", None, UserRole::User, "U-bob")
        .await
        .unwrap();

    let alice_tag = engine.create_tag(LINE_ID, "food").await.unwrap();
    let bob_tag = engine.create_tag("U-bob", "food").await.unwrap();
    assert_ne!(alice_tag.id, bob_tag.id);
}
