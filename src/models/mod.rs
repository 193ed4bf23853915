//! # Models
//!
//! Value records for the `subscribe_subscriptions` table and the query
//! specification used to search it.

pub mod subscription;
pub mod subscription_filter;
pub mod subscription_view;

pub use subscription::{NewSubscription, Subscription};
pub use subscription_filter::SubscriptionFilter;
pub use subscription_view::SubscriptionView;
