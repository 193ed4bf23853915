#![allow(dead_code)]

pub mod recording_provider;
pub mod strategies;

use std::sync::Arc;
use subscribe_core::config::SubscriptionSettings;
use subscribe_core::registry::ProviderRegistry;
use subscribe_core::services::SubscriptionService;
use subscribe_core::store::{InMemorySubscriptionStore, SubscriptionStore};

/// Service over a fresh in-memory store
pub fn memory_service(registry: ProviderRegistry) -> SubscriptionService {
    memory_service_with(registry, SubscriptionSettings::default())
}

pub fn memory_service_with(
    registry: ProviderRegistry,
    settings: SubscriptionSettings,
) -> SubscriptionService {
    let store: Arc<dyn SubscriptionStore> = Arc::new(InMemorySubscriptionStore::new());
    SubscriptionService::new(store, Arc::new(registry), settings)
}
