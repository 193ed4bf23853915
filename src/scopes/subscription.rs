//! # Subscription Scopes
//!
//! Chainable equality predicates over `subscribe_subscriptions`, and the translation
//! of a [`SubscriptionFilter`] into a conjunctive WHERE clause.
//!
//! Predicates are rendered in the order they were added, joined with AND, with every
//! value bound as a parameter. A scope without predicates renders no WHERE clause at
//! all and therefore selects every row.

use super::common::ScopeBuilder;
use crate::models::{Subscription, SubscriptionFilter};
use sqlx::{PgPool, Postgres, QueryBuilder};

const SELECT_SUBSCRIPTIONS: &str =
    "SELECT id, user_id, provider, subscription_key, resource_id FROM subscribe_subscriptions";
const COUNT_SUBSCRIPTIONS: &str = "SELECT COUNT(*) FROM subscribe_subscriptions";

/// Query builder for Subscription scopes
#[derive(Debug, Clone, Default)]
pub struct SubscriptionScope {
    conditions: Vec<(&'static str, String)>,
    ordered: bool,
}

impl Subscription {
    /// Start building a scoped query
    pub fn scope() -> SubscriptionScope {
        SubscriptionScope::default()
    }
}

impl SubscriptionScope {
    fn add_condition(mut self, column: &'static str, value: String) -> Self {
        self.conditions.push((column, value));
        self
    }

    /// Scope: for_user - Subscriptions filed under one identity
    pub fn for_user(self, user_id: impl Into<String>) -> Self {
        self.add_condition("user_id", user_id.into())
    }

    /// Scope: for_provider - Subscriptions owned by one provider
    pub fn for_provider(self, provider: impl Into<String>) -> Self {
        self.add_condition("provider", provider.into())
    }

    /// Scope: with_key - One subscription list of a provider
    pub fn with_key(self, key: impl Into<String>) -> Self {
        self.add_condition("subscription_key", key.into())
    }

    /// Scope: for_resource - Subscriptions to one subscribed object
    pub fn for_resource(self, resource_id: impl Into<String>) -> Self {
        self.add_condition("resource_id", resource_id.into())
    }

    /// Apply every present predicate of `filter`, in the fixed order
    /// user_id, provider, key, resource_id
    pub fn matching(mut self, filter: &SubscriptionFilter) -> Self {
        if let Some(user_id) = filter.user_id() {
            self = self.for_user(user_id);
        }
        if let Some(provider) = filter.provider() {
            self = self.for_provider(provider);
        }
        if let Some(key) = filter.key() {
            self = self.with_key(key);
        }
        if let Some(resource_id) = filter.resource_id() {
            self = self.for_resource(resource_id);
        }
        self
    }

    /// Scope: ordered_by_id - Oldest subscriptions first
    pub fn ordered_by_id(mut self) -> Self {
        self.ordered = true;
        self
    }

    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    fn build(&self, select: &str, with_order: bool) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(select);
        let mut has_conditions = false;

        for (column, value) in &self.conditions {
            if has_conditions {
                query.push(" AND ");
            } else {
                query.push(" WHERE ");
                has_conditions = true;
            }
            query.push(*column).push(" = ").push_bind(value.clone());
        }

        if with_order && self.ordered {
            query.push(" ORDER BY id ASC");
        }
        query
    }

    /// The SELECT statement this scope would run
    pub fn to_sql(&self) -> String {
        self.build(SELECT_SUBSCRIPTIONS, true).sql().to_string()
    }
}

impl ScopeBuilder<Subscription> for SubscriptionScope {
    async fn all(self, pool: &PgPool) -> Result<Vec<Subscription>, sqlx::Error> {
        let mut query = self.build(SELECT_SUBSCRIPTIONS, true);
        query.build_query_as::<Subscription>().fetch_all(pool).await
    }

    async fn first(self, pool: &PgPool) -> Result<Option<Subscription>, sqlx::Error> {
        let mut query = self.build(SELECT_SUBSCRIPTIONS, true);
        query.push(" LIMIT 1");
        query
            .build_query_as::<Subscription>()
            .fetch_optional(pool)
            .await
    }

    async fn count(self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        let mut query = self.build(COUNT_SUBSCRIPTIONS, false);
        let row: (i64,) = query.build_query_as().fetch_one(pool).await?;
        Ok(row.0)
    }

    async fn exists(self, pool: &PgPool) -> Result<bool, sqlx::Error> {
        let mut query = self.build(SELECT_SUBSCRIPTIONS, false);
        query.push(" LIMIT 1");
        let result = query
            .build_query_as::<Subscription>()
            .fetch_optional(pool)
            .await?;
        Ok(result.is_some())
    }
}
