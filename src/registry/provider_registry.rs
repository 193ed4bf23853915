//! # Provider Registry
//!
//! Name-indexed lookup of the subscription providers known to this process.
//!
//! ## Overview
//!
//! A provider is an external feature that owns a class of subscriptions (those whose
//! `provider` column equals its [`SubscriptionProvider::provider_name`]). The registry
//! is populated once at startup, either by explicit registration or from the
//! `providers.enabled` configuration list, and then shared read-only.
//!
//! Lookup is an exact name match. At most one provider is expected per name; if
//! several are registered the first one wins and later ones are never returned.
//!
//! ## Usage
//!
//! ```rust
//! use async_trait::async_trait;
//! use subscribe_core::error::ProviderError;
//! use subscribe_core::models::Subscription;
//! use subscribe_core::registry::{ProviderRegistry, SubscriptionProvider};
//! use std::sync::Arc;
//!
//! struct ForumProvider;
//!
//! #[async_trait]
//! impl SubscriptionProvider for ForumProvider {
//!     fn provider_name(&self) -> &str {
//!         "forum"
//!     }
//!
//!     fn describe_subscription(&self, _: &str, key: &str, resource_id: Option<&str>, _: &str) -> String {
//!         format!("{key} {}", resource_id.unwrap_or("*"))
//!     }
//!
//!     fn is_removable(&self, _: &str, _: &str, _: Option<&str>) -> bool {
//!         true
//!     }
//!
//!     fn modify_url(&self, _: &str, _: &str, _: Option<&str>) -> Option<String> {
//!         None
//!     }
//!
//!     async fn notify_removal(&self, _: &Subscription) -> Result<(), ProviderError> {
//!         Ok(())
//!     }
//! }
//!
//! let registry = ProviderRegistry::new().with_provider(Arc::new(ForumProvider));
//! assert!(registry.get("forum").is_some());
//! assert!(registry.get("wiki").is_none());
//! ```

use crate::config::ProvidersConfig;
use crate::error::ProviderError;
use crate::models::Subscription;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Capability set every subscription provider exposes
#[async_trait]
pub trait SubscriptionProvider: Send + Sync {
    /// Stable identifier matching the `provider` field of the subscriptions it owns
    fn provider_name(&self) -> &str;

    /// Human-readable description of a subscription; opaque to this crate
    fn describe_subscription(
        &self,
        identity: &str,
        key: &str,
        resource_id: Option<&str>,
        locale: &str,
    ) -> String;

    fn is_removable(&self, identity: &str, key: &str, resource_id: Option<&str>) -> bool;

    /// Where the subscriber can change the subscription, if anywhere
    fn modify_url(&self, identity: &str, key: &str, resource_id: Option<&str>) -> Option<String>;

    /// Called just before `subscription` is deleted, when notification was requested
    async fn notify_removal(&self, subscription: &Subscription) -> Result<(), ProviderError>;
}

/// Registry for subscription providers, in registration order
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn SubscriptionProvider>>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_names())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register from a candidate set, honouring `providers.enabled`
    ///
    /// With an empty `enabled` list every candidate is registered in the order
    /// given. Otherwise only the named candidates are registered, in the order the
    /// configuration lists them; configured names without a candidate are logged.
    pub fn from_config(
        config: &ProvidersConfig,
        candidates: impl IntoIterator<Item = Arc<dyn SubscriptionProvider>>,
    ) -> Self {
        let candidates: Vec<Arc<dyn SubscriptionProvider>> = candidates.into_iter().collect();
        let mut registry = Self::new();

        if config.enabled.is_empty() {
            for provider in candidates {
                registry.register(provider);
            }
            return registry;
        }

        for name in &config.enabled {
            match candidates.iter().find(|p| p.provider_name() == name) {
                Some(provider) => registry.register(Arc::clone(provider)),
                None => warn!(
                    provider = %name,
                    "Configured subscription provider has no implementation; skipping"
                ),
            }
        }

        let skipped = candidates
            .iter()
            .filter(|p| !config.enabled.iter().any(|n| n == p.provider_name()))
            .count();
        if skipped > 0 {
            debug!(skipped, "Subscription providers left out by configuration");
        }

        registry
    }

    /// Add a provider; a name that is already registered keeps its first provider
    pub fn register(&mut self, provider: Arc<dyn SubscriptionProvider>) {
        let name = provider.provider_name().to_string();
        if self.contains(&name) {
            warn!(
                provider = %name,
                "Subscription provider registered twice; lookups keep returning the first"
            );
        } else {
            info!(provider = %name, "Registered subscription provider");
        }
        self.providers.push(provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn SubscriptionProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Provider whose name equals `name` exactly
    pub fn get(&self, name: &str) -> Option<Arc<dyn SubscriptionProvider>> {
        self.providers
            .iter()
            .find(|p| p.provider_name() == name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.iter().any(|p| p.provider_name() == name)
    }

    /// Names in registration order, duplicates included
    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|p| p.provider_name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NamedProvider {
        name: &'static str,
        tag: &'static str,
    }

    #[async_trait]
    impl SubscriptionProvider for NamedProvider {
        fn provider_name(&self) -> &str {
            self.name
        }

        fn describe_subscription(&self, _: &str, _: &str, _: Option<&str>, _: &str) -> String {
            self.tag.to_string()
        }

        fn is_removable(&self, _: &str, _: &str, _: Option<&str>) -> bool {
            true
        }

        fn modify_url(&self, _: &str, _: &str, _: Option<&str>) -> Option<String> {
            None
        }

        async fn notify_removal(&self, _: &Subscription) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn provider(name: &'static str, tag: &'static str) -> Arc<dyn SubscriptionProvider> {
        Arc::new(NamedProvider { name, tag })
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = ProviderRegistry::new().with_provider(provider("forum", "a"));
        assert!(registry.get("forum").is_some());
        assert!(registry.get("Forum").is_none());
        assert!(registry.get("forum ").is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        let registry = ProviderRegistry::new()
            .with_provider(provider("forum", "first"))
            .with_provider(provider("forum", "second"));

        assert_eq!(registry.len(), 2);
        let found = registry.get("forum").unwrap();
        assert_eq!(found.describe_subscription("u", "k", None, "en"), "first");
    }

    #[test]
    fn test_from_config_empty_list_registers_all() {
        let registry = ProviderRegistry::from_config(
            &ProvidersConfig::default(),
            vec![provider("forum", "a"), provider("wiki", "b")],
        );
        assert_eq!(registry.provider_names(), vec!["forum", "wiki"]);
    }

    #[test]
    fn test_from_config_follows_configured_order() {
        let config = ProvidersConfig {
            enabled: vec!["wiki".to_string(), "calendar".to_string(), "forum".to_string()],
        };
        let registry = ProviderRegistry::from_config(
            &config,
            vec![
                provider("forum", "a"),
                provider("wiki", "b"),
                provider("blog", "c"),
            ],
        );

        assert_eq!(registry.provider_names(), vec!["wiki", "forum"]);
        assert!(registry.get("blog").is_none());
        assert!(registry.get("calendar").is_none());
    }
}
