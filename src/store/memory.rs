//! Process-local subscription store.
//!
//! Rows live in a `BTreeMap` keyed by id. The id counter sits under the same lock as
//! the map, so allocating an id and inserting the row happen in one critical section.
//! Like the database identity column, the counter only moves forward.

use super::{SubscriptionStore, UniqueInsert};
use crate::error::Result;
use crate::models::{NewSubscription, Subscription, SubscriptionFilter};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, Subscription>,
    last_id: i64,
}

impl Table {
    fn append(&mut self, subscription: &NewSubscription) -> Subscription {
        self.last_id += 1;
        let row = Subscription::from_parts(self.last_id, subscription.clone());
        self.rows.insert(row.id(), row.clone());
        row
    }
}

#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    table: RwLock<Table>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing rows; new ids continue after the highest one
    pub fn with_rows(rows: impl IntoIterator<Item = Subscription>) -> Self {
        let rows: BTreeMap<i64, Subscription> = rows.into_iter().map(|s| (s.id(), s)).collect();
        let last_id = rows.keys().next_back().copied().unwrap_or(0);
        Self {
            table: RwLock::new(Table { rows, last_id }),
        }
    }

    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn insert(&self, subscription: &NewSubscription) -> Result<Subscription> {
        let inserted = self.table.write().append(subscription);

        debug!(subscription_id = inserted.id(), provider = %inserted.provider(), "Inserted subscription");
        Ok(inserted)
    }

    async fn insert_unique(&self, subscription: &NewSubscription) -> Result<UniqueInsert> {
        let mut table = self.table.write();
        if let Some(existing) = table.rows.values().find(|s| subscription.same_target(s)) {
            return Ok(UniqueInsert::Existing(existing.clone()));
        }
        Ok(UniqueInsert::Inserted(table.append(subscription)))
    }

    async fn load(&self, id: i64) -> Result<Option<Subscription>> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn store(&self, subscription: &Subscription) -> Result<bool> {
        let mut table = self.table.write();
        match table.rows.get_mut(&subscription.id()) {
            Some(row) => {
                *row = subscription.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        Ok(self.table.write().rows.remove(&id).is_some())
    }

    async fn list_all(&self) -> Result<Vec<Subscription>> {
        Ok(self.table.read().rows.values().cloned().collect())
    }

    async fn find_by_filter(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>> {
        Ok(self
            .table
            .read()
            .rows
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn count_by_filter(&self, filter: &SubscriptionFilter) -> Result<i64> {
        let count = self
            .table
            .read()
            .rows
            .values()
            .filter(|s| filter.matches(s))
            .count();
        Ok(count as i64)
    }
}
