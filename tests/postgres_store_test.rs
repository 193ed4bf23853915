//! PostgreSQL store tests; run with `cargo test --features postgres-tests` and `DATABASE_URL` set.
#![cfg(feature = "postgres-tests")]

use sqlx::PgPool;
use std::sync::Arc;
use subscribe_core::database::DatabaseConnection;
use subscribe_core::models::{NewSubscription, SubscriptionFilter};
use subscribe_core::scopes::ScopeBuilder;
use subscribe_core::store::{PgSubscriptionStore, SubscriptionStore, UniqueInsert};
use subscribe_core::Subscription;

fn new_sub(user: &str, provider: &str, key: &str, resource: Option<&str>) -> NewSubscription {
    let mut new = NewSubscription::new(provider, key).with_user_id(user);
    new.resource_id = resource.map(str::to_string);
    new
}

#[sqlx::test(migrator = "subscribe_core::database::MIGRATOR")]
async fn test_insert_load_round_trip(pool: PgPool) -> sqlx::Result<()> {
    let store = PgSubscriptionStore::new(pool);

    let new = new_sub("alice", "forum", "thread", Some("42"));
    let created = store.insert(&new).await.unwrap();
    assert!(created.id() > 0);

    let loaded = store.load(created.id()).await.unwrap().unwrap();
    assert_eq!(loaded, created);
    assert!(new.same_target(&loaded));

    let without_resource = store
        .insert(&new_sub("bob", "forum", "digest", None))
        .await
        .unwrap();
    assert_eq!(
        store.load(without_resource.id()).await.unwrap().unwrap().resource_id(),
        None
    );

    assert!(store.load(created.id() + 1000).await.unwrap().is_none());
    Ok(())
}

#[sqlx::test(migrator = "subscribe_core::database::MIGRATOR")]
async fn test_store_replaces_fields(pool: PgPool) -> sqlx::Result<()> {
    let store = PgSubscriptionStore::new(pool);
    let created = store
        .insert(&new_sub("alice", "forum", "thread", Some("42")))
        .await
        .unwrap();

    let revised = created.revise(new_sub("alice", "wiki", "page", None));
    assert!(store.store(&revised).await.unwrap());
    assert_eq!(store.load(created.id()).await.unwrap().unwrap(), revised);

    store.delete(created.id()).await.unwrap();
    assert!(!store.store(&revised).await.unwrap());
    Ok(())
}

#[sqlx::test(migrator = "subscribe_core::database::MIGRATOR")]
async fn test_delete_is_idempotent(pool: PgPool) -> sqlx::Result<()> {
    let store = PgSubscriptionStore::new(pool);
    let created = store
        .insert(&new_sub("alice", "forum", "thread", None))
        .await
        .unwrap();

    assert!(store.delete(created.id()).await.unwrap());
    assert!(store.load(created.id()).await.unwrap().is_none());
    assert!(!store.delete(created.id()).await.unwrap());
    Ok(())
}

#[sqlx::test(migrator = "subscribe_core::database::MIGRATOR")]
async fn test_filter_and_count(pool: PgPool) -> sqlx::Result<()> {
    let store = PgSubscriptionStore::new(pool.clone());
    store.insert(&new_sub("alice", "forum", "thread", Some("42"))).await.unwrap();
    store.insert(&new_sub("bob", "forum", "thread", Some("42"))).await.unwrap();
    store.insert(&new_sub("bob", "forum", "digest", None)).await.unwrap();
    store.insert(&new_sub("carol", "wiki", "thread", Some("42"))).await.unwrap();

    let forum = store
        .find_by_filter(&SubscriptionFilter::default().with_provider("forum"))
        .await
        .unwrap();
    assert_eq!(forum.len(), 3);
    assert!(forum.windows(2).all(|w| w[0].id() < w[1].id()));

    let thread_42 = SubscriptionFilter::default()
        .with_provider("forum")
        .with_key("thread")
        .with_resource_id("42");
    let users: Vec<String> = store
        .find_by_filter(&thread_42)
        .await
        .unwrap()
        .iter()
        .map(|s| s.user_id().to_string())
        .collect();
    assert_eq!(users, vec!["alice", "bob"]);
    assert_eq!(store.count_by_filter(&thread_42).await.unwrap(), 2);

    // Empty strings place no constraint
    let empty = SubscriptionFilter::new(Some(String::new()), None, Some(String::new()), None);
    assert_eq!(store.find_by_filter(&empty).await.unwrap().len(), 4);
    assert_eq!(store.list_all().await.unwrap().len(), 4);

    let exists = Subscription::scope().for_user("carol").exists(&pool).await?;
    assert!(exists);
    let first = Subscription::scope()
        .for_provider("forum")
        .ordered_by_id()
        .first(&pool)
        .await?;
    assert_eq!(first.map(|s| s.user_id().to_string()).as_deref(), Some("alice"));
    Ok(())
}

#[sqlx::test(migrator = "subscribe_core::database::MIGRATOR")]
async fn test_concurrent_inserts_get_distinct_ids(pool: PgPool) -> sqlx::Result<()> {
    let store: Arc<dyn SubscriptionStore> = Arc::new(PgSubscriptionStore::new(pool));

    let inserts = (0..20).map(|i| {
        let store = store.clone();
        async move {
            store
                .insert(&new_sub(&format!("user-{i}"), "forum", "thread", Some("42")))
                .await
                .map(|s| s.id())
        }
    });
    let mut ids: Vec<i64> = futures::future::try_join_all(inserts).await.unwrap();
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 20);
    assert_eq!(ids[19] - ids[0], 19);
    Ok(())
}

#[sqlx::test(migrator = "subscribe_core::database::MIGRATOR")]
async fn test_concurrent_unique_inserts_keep_one_row(pool: PgPool) -> sqlx::Result<()> {
    let store: Arc<dyn SubscriptionStore> = Arc::new(PgSubscriptionStore::new(pool));

    let attempts = (0..16).map(|_| {
        let store = store.clone();
        async move {
            store
                .insert_unique(&new_sub("alice", "forum", "thread", None))
                .await
        }
    });
    let outcomes = futures::future::try_join_all(attempts).await.unwrap();

    let inserted: Vec<_> = outcomes
        .iter()
        .filter_map(|o| match o {
            UniqueInsert::Inserted(row) => Some(row.id()),
            UniqueInsert::Existing(_) => None,
        })
        .collect();
    assert_eq!(inserted.len(), 1);
    assert!(outcomes.iter().all(|o| match o {
        UniqueInsert::Inserted(row) | UniqueInsert::Existing(row) => row.id() == inserted[0],
    }));
    assert_eq!(store.list_all().await.unwrap().len(), 1);

    // A resource id makes it a different target
    assert!(matches!(
        store
            .insert_unique(&new_sub("alice", "forum", "thread", Some("42")))
            .await
            .unwrap(),
        UniqueInsert::Inserted(_)
    ));
    Ok(())
}

#[sqlx::test(migrator = "subscribe_core::database::MIGRATOR")]
async fn test_health_check(pool: PgPool) -> sqlx::Result<()> {
    let db = DatabaseConnection::from_pool(pool);
    assert!(db.health_check().await.unwrap());
    Ok(())
}
