//! PostgreSQL-backed subscription store.
//!
//! Ids come from the table's identity column inside the `INSERT ... RETURNING`
//! statement, so concurrent writers in any number of processes never collide.
//!
//! [`SubscriptionStore::insert_unique`] runs in a transaction holding a
//! transaction-scoped advisory lock keyed on the four subscription values. Every
//! `insert_unique` caller for the same target, in any process, queues on that lock, so
//! the existence check and the insert cannot interleave. Plain `insert` takes no lock
//! and can still add a duplicate next to it.

use super::{SubscriptionStore, UniqueInsert};
use crate::error::{Result, SubscribeError};
use crate::models::{NewSubscription, Subscription, SubscriptionFilter};
use crate::scopes::ScopeBuilder;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

const INSERT_SUBSCRIPTION: &str = r#"
    INSERT INTO subscribe_subscriptions (user_id, provider, subscription_key, resource_id)
    VALUES ($1, $2, $3, $4)
    RETURNING id, user_id, provider, subscription_key, resource_id
"#;

const SELECT_SAME_TARGET: &str = r#"
    SELECT id, user_id, provider, subscription_key, resource_id
    FROM subscribe_subscriptions
    WHERE user_id = $1
      AND provider = $2
      AND subscription_key = $3
      AND resource_id IS NOT DISTINCT FROM $4
    ORDER BY id
    LIMIT 1
"#;

/// Advisory lock key text; hash collisions only serialize unrelated targets
fn target_lock_key(subscription: &NewSubscription) -> String {
    format!(
        "subscribe:{}\u{1f}{}\u{1f}{}\u{1f}{}",
        subscription.user_id,
        subscription.provider,
        subscription.key,
        subscription.resource_id.as_deref().unwrap_or("")
    )
}

#[derive(Debug, Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn insert(&self, subscription: &NewSubscription) -> Result<Subscription> {
        let inserted = sqlx::query_as::<_, Subscription>(INSERT_SUBSCRIPTION)
        .bind(&subscription.user_id)
        .bind(&subscription.provider)
        .bind(&subscription.key)
        .bind(&subscription.resource_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| SubscribeError::from_sqlx("insert", e))?;

        debug!(subscription_id = inserted.id(), provider = %inserted.provider(), "Inserted subscription");
        Ok(inserted)
    }

    async fn insert_unique(&self, subscription: &NewSubscription) -> Result<UniqueInsert> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SubscribeError::from_sqlx("insert_unique", e))?;

        // Released on commit or rollback
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(target_lock_key(subscription))
            .execute(&mut *tx)
            .await
            .map_err(|e| SubscribeError::from_sqlx("insert_unique", e))?;

        let existing = sqlx::query_as::<_, Subscription>(SELECT_SAME_TARGET)
            .bind(&subscription.user_id)
            .bind(&subscription.provider)
            .bind(&subscription.key)
            .bind(&subscription.resource_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| SubscribeError::from_sqlx("insert_unique", e))?;

        if let Some(existing) = existing {
            tx.rollback()
                .await
                .map_err(|e| SubscribeError::from_sqlx("insert_unique", e))?;
            debug!(subscription_id = existing.id(), "Subscription target already present");
            return Ok(UniqueInsert::Existing(existing));
        }

        let inserted = sqlx::query_as::<_, Subscription>(INSERT_SUBSCRIPTION)
            .bind(&subscription.user_id)
            .bind(&subscription.provider)
            .bind(&subscription.key)
            .bind(&subscription.resource_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| SubscribeError::from_sqlx("insert_unique", e))?;

        tx.commit()
            .await
            .map_err(|e| SubscribeError::from_sqlx("insert_unique", e))?;

        debug!(subscription_id = inserted.id(), provider = %inserted.provider(), "Inserted subscription");
        Ok(UniqueInsert::Inserted(inserted))
    }

    async fn load(&self, id: i64) -> Result<Option<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, user_id, provider, subscription_key, resource_id
            FROM subscribe_subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SubscribeError::from_sqlx("load", e))
    }

    async fn store(&self, subscription: &Subscription) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE subscribe_subscriptions
            SET
                user_id = $2,
                provider = $3,
                subscription_key = $4,
                resource_id = $5
            WHERE id = $1
            "#,
        )
        .bind(subscription.id())
        .bind(subscription.user_id())
        .bind(subscription.provider())
        .bind(subscription.key())
        .bind(subscription.resource_id())
        .execute(&self.pool)
        .await
        .map_err(|e| SubscribeError::from_sqlx("store", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM subscribe_subscriptions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| SubscribeError::from_sqlx("delete", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self) -> Result<Vec<Subscription>> {
        Subscription::scope()
            .ordered_by_id()
            .all(&self.pool)
            .await
            .map_err(|e| SubscribeError::from_sqlx("list_all", e))
    }

    async fn find_by_filter(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>> {
        Subscription::scope()
            .matching(filter)
            .ordered_by_id()
            .all(&self.pool)
            .await
            .map_err(|e| SubscribeError::from_sqlx("find_by_filter", e))
    }

    async fn count_by_filter(&self, filter: &SubscriptionFilter) -> Result<i64> {
        Subscription::scope()
            .matching(filter)
            .count(&self.pool)
            .await
            .map_err(|e| SubscribeError::from_sqlx("count_by_filter", e))
    }
}
