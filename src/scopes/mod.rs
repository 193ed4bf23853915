//! # Query Scopes Module
//!
//! Chainable, parameter-bound queries over the subscription table.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use subscribe_core::models::{Subscription, SubscriptionFilter};
//! use subscribe_core::scopes::ScopeBuilder;
//! # async fn example(pool: &sqlx::PgPool) -> Result<(), sqlx::Error> {
//! // Everyone subscribed to thread 42 of the forum provider
//! let subscribers = Subscription::scope()
//!     .for_provider("forum")
//!     .with_key("thread")
//!     .for_resource("42")
//!     .all(pool)
//!     .await?;
//!
//! // Same thing, driven by a filter
//! let filter = SubscriptionFilter::default()
//!     .with_provider("forum")
//!     .with_key("thread")
//!     .with_resource_id("42");
//! let count = Subscription::scope().matching(&filter).count(pool).await?;
//! # let _ = (subscribers, count);
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod subscription;

pub use common::ScopeBuilder;
pub use subscription::SubscriptionScope;
