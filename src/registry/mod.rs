//! # Registry Infrastructure
//!
//! Runtime registry of the providers that own subscriptions.
//!
//! The registry is built explicitly at startup and handed to the service; there is no
//! global instance and no discovery beyond what the caller registers.

pub mod provider_registry;

pub use provider_registry::{ProviderRegistry, SubscriptionProvider};
