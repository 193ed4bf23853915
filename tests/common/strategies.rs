use proptest::prelude::*;
use subscribe_core::models::{NewSubscription, SubscriptionFilter};

/// Small value pools so generated filters actually hit generated rows
pub fn user_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["alice", "bob", "carol"]).prop_map(str::to_string)
}

pub fn provider_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["forum", "wiki"]).prop_map(str::to_string)
}

pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["thread", "page", "digest"]).prop_map(str::to_string)
}

pub fn resource_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec!["1", "2", "42"]).prop_map(str::to_string))
}

/// Strategy for generating valid NewSubscription instances
pub fn new_subscription_strategy() -> impl Strategy<Value = NewSubscription> {
    (
        user_strategy(),
        provider_strategy(),
        key_strategy(),
        resource_strategy(),
    )
        .prop_map(|(user_id, provider, key, resource_id)| NewSubscription {
            user_id,
            provider,
            key,
            resource_id,
        })
}

/// Filter predicate that is absent, empty, or a value from the pool
fn predicate(values: impl Strategy<Value = String>) -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        2 => Just(None),
        1 => Just(Some(String::new())),
        3 => values.prop_map(Some),
    ]
}

pub fn filter_strategy() -> impl Strategy<Value = SubscriptionFilter> {
    (
        predicate(user_strategy()),
        predicate(provider_strategy()),
        predicate(key_strategy()),
        predicate(prop::sample::select(vec!["1", "2", "42"]).prop_map(str::to_string)),
    )
        .prop_map(|(user_id, provider, key, resource_id)| {
            SubscriptionFilter::new(user_id, provider, key, resource_id)
        })
}
