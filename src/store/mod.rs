//! # Subscription Store
//!
//! Persistence contract for subscriptions, with a PostgreSQL implementation and a
//! process-local one.
//!
//! Every operation is a single atomic step; nothing spans several of them in a
//! transaction. Ids are allocated by the store at insert time and never reused.
//!
//! ## Unfiltered queries
//!
//! [`SubscriptionStore::find_by_filter`] with a filter that has no predicates returns
//! **every row**. That is the contract, not an accident; callers that cannot afford a
//! full scan must check [`SubscriptionFilter::is_unconstrained`] first (the service
//! does this when `allow_unfiltered_queries` is off).

pub mod memory;
pub mod postgres;

use crate::error::Result;
use crate::models::{NewSubscription, Subscription, SubscriptionFilter};
use async_trait::async_trait;

pub use memory::InMemorySubscriptionStore;
pub use postgres::PgSubscriptionStore;

/// Result of [`SubscriptionStore::insert_unique`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueInsert {
    Inserted(Subscription),
    /// A row with the same user, provider, key and resource was already there
    Existing(Subscription),
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Persist a new row and return it with its freshly assigned id
    async fn insert(&self, subscription: &NewSubscription) -> Result<Subscription>;

    /// Insert unless a row with the same four values exists.
    ///
    /// Check and insert are atomic with respect to other `insert_unique` callers;
    /// a concurrent plain `insert` is not excluded.
    async fn insert_unique(&self, subscription: &NewSubscription) -> Result<UniqueInsert>;

    async fn load(&self, id: i64) -> Result<Option<Subscription>>;

    /// Overwrite the non-key columns of the row with `subscription.id()`.
    /// Returns `false` when no such row exists.
    async fn store(&self, subscription: &Subscription) -> Result<bool>;

    /// Remove a row. Returns `false`, not an error, when the id was already absent.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Every row, ordered by id
    async fn list_all(&self) -> Result<Vec<Subscription>>;

    /// Rows matching every present predicate, ordered by id.
    /// An unconstrained filter returns every row.
    async fn find_by_filter(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>>;

    async fn count_by_filter(&self, filter: &SubscriptionFilter) -> Result<i64>;
}
