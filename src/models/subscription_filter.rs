//! # Subscription Filter
//!
//! Conjunctive query specification over the four subscription columns.
//!
//! Each predicate is independently optional. An absent predicate (or one set to the
//! empty string) places no constraint on its column; it never means "match empty".
//! Present predicates are combined with AND. There is no OR and no negation.
//!
//! **A filter with no predicates matches every row.** Stores treat it as a full
//! scan; the service can be configured to reject it instead
//! (`subscriptions.allow_unfiltered_queries = false`).

use super::Subscription;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    user_id: Option<String>,
    provider: Option<String>,
    key: Option<String>,
    resource_id: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl SubscriptionFilter {
    /// All-argument constructor
    pub fn new(
        user_id: Option<String>,
        provider: Option<String>,
        key: Option<String>,
        resource_id: Option<String>,
    ) -> Self {
        Self {
            user_id,
            provider,
            key,
            resource_id,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn set_user_id(&mut self, user_id: Option<String>) {
        self.user_id = user_id;
    }

    pub fn set_provider(&mut self, provider: Option<String>) {
        self.provider = provider;
    }

    pub fn set_key(&mut self, key: Option<String>) {
        self.key = key;
    }

    pub fn set_resource_id(&mut self, resource_id: Option<String>) {
        self.resource_id = resource_id;
    }

    pub fn user_id(&self) -> Option<&str> {
        present(&self.user_id)
    }

    pub fn provider(&self) -> Option<&str> {
        present(&self.provider)
    }

    pub fn key(&self) -> Option<&str> {
        present(&self.key)
    }

    pub fn resource_id(&self) -> Option<&str> {
        present(&self.resource_id)
    }

    /// True when no predicate is present, i.e. the filter matches every row
    pub fn is_unconstrained(&self) -> bool {
        self.user_id().is_none()
            && self.provider().is_none()
            && self.key().is_none()
            && self.resource_id().is_none()
    }

    /// In-process evaluation with the same semantics as the SQL translation
    pub fn matches(&self, subscription: &Subscription) -> bool {
        self.user_id().map_or(true, |v| v == subscription.user_id())
            && self.provider().map_or(true, |v| v == subscription.provider())
            && self.key().map_or(true, |v| v == subscription.key())
            && self
                .resource_id()
                .map_or(true, |v| Some(v) == subscription.resource_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewSubscription;

    fn forum_sub(user: &str, resource: Option<&str>) -> Subscription {
        let mut new = NewSubscription::new("forum", "thread").with_user_id(user);
        new.resource_id = resource.map(str::to_string);
        Subscription::from_parts(1, new)
    }

    #[test]
    fn test_default_filter_is_unconstrained() {
        let filter = SubscriptionFilter::default();
        assert!(filter.is_unconstrained());
        assert!(filter.matches(&forum_sub("alice", None)));
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let filter = SubscriptionFilter::new(
            Some(String::new()),
            Some(String::new()),
            None,
            Some(String::new()),
        );
        assert!(filter.is_unconstrained());
        assert_eq!(filter.provider(), None);
    }

    #[test]
    fn test_setters_and_builders_agree() {
        let mut incremental = SubscriptionFilter::default();
        incremental.set_provider(Some("forum".to_string()));
        incremental.set_key(Some("thread".to_string()));

        let built = SubscriptionFilter::default()
            .with_provider("forum")
            .with_key("thread");

        assert_eq!(incremental, built);
    }

    #[test]
    fn test_matches_is_conjunctive() {
        let filter = SubscriptionFilter::default()
            .with_provider("forum")
            .with_resource_id("42");

        assert!(filter.matches(&forum_sub("alice", Some("42"))));
        assert!(!filter.matches(&forum_sub("alice", Some("43"))));
        assert!(!filter.matches(&forum_sub("alice", None)));
        assert!(!filter
            .clone()
            .with_user_id("bob")
            .matches(&forum_sub("alice", Some("42"))));
    }
}
