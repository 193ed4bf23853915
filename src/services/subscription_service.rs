//! # Subscription Service
//!
//! Orchestrates the store and the provider registry: creation on behalf of a caller
//! identity, lookups, removal with optional provider notification, and subscriber
//! aggregation.
//!
//! ## Removal protocol
//!
//! When notification is requested the owning provider is resolved by name and its
//! `notify_removal` hook runs strictly **before** the row is deleted. The delete is
//! then issued unconditionally: a missing provider or a failing hook is logged and
//! reported in the [`RemovalReport`] but never blocks the removal.
//!
//! Notification and delete are two separate steps with no transaction around them.
//! A crash in between leaves a provider notified of a removal that did not happen;
//! notification is best-effort and at-most-once.

use crate::config::{SubscribeConfig, SubscriptionSettings};
use crate::error::{Result, SubscribeError};
use crate::logging::log_subscription_operation;
use crate::models::{NewSubscription, Subscription, SubscriptionFilter, SubscriptionView};
use crate::registry::{ProviderRegistry, SubscriptionProvider};
use crate::store::{SubscriptionStore, UniqueInsert};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happened to the provider side of a removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// The caller asked for a silent removal
    NotRequested,
    Delivered { provider: String },
    /// No registered provider claims the subscription's provider name
    ProviderNotFound { provider: String },
    /// The provider's hook returned an error; the delete still went ahead
    Failed { provider: String, reason: String },
    /// Notification was requested for an id with no row, so there was nothing to send
    SubscriptionMissing,
}

/// Result of a removal request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalReport {
    pub subscription_id: i64,
    /// Whether a row was actually removed; `false` means the id was already gone
    pub deleted: bool,
    pub notification: NotificationOutcome,
}

/// Result of a removal requested by a subscriber for one of their own subscriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedRemoval {
    Removed(RemovalReport),
    NotFound,
    /// The subscription exists but is filed under another identity
    AccessDenied,
}

/// Service for subscription lifecycle and provider notification
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
    registry: Arc<ProviderRegistry>,
    settings: SubscriptionSettings,
}

impl std::fmt::Debug for SubscriptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionService")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SubscriptionService {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        registry: Arc<ProviderRegistry>,
        settings: SubscriptionSettings,
    ) -> Self {
        Self {
            store,
            registry,
            settings,
        }
    }

    pub fn from_config(
        store: Arc<dyn SubscriptionStore>,
        registry: Arc<ProviderRegistry>,
        config: &SubscribeConfig,
    ) -> Self {
        Self::new(store, registry, config.subscriptions.clone())
    }

    pub fn settings(&self) -> &SubscriptionSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// File a subscription under `caller_identity`
    ///
    /// Any `user_id` already on `subscription` is replaced by the identity. The record
    /// is validated before it reaches the store, and the id is assigned by the store.
    /// With `reject_duplicates` the existence check and the insert are one atomic store
    /// operation, so concurrent creates of the same target yield a single row.
    pub async fn create_subscription(
        &self,
        subscription: NewSubscription,
        caller_identity: &str,
    ) -> Result<Subscription> {
        let subscription = subscription.with_user_id(caller_identity);
        subscription.validate()?;

        let created = if self.settings.reject_duplicates {
            match self.store.insert_unique(&subscription).await? {
                UniqueInsert::Inserted(created) => created,
                UniqueInsert::Existing(existing) => {
                    return Err(SubscribeError::DuplicateSubscription {
                        existing_id: existing.id(),
                        user_id: subscription.user_id,
                        provider: subscription.provider,
                        key: subscription.key,
                    });
                }
            }
        } else {
            self.store.insert(&subscription).await?
        };

        log_subscription_operation(
            "create",
            Some(created.id()),
            Some(created.provider()),
            "created",
            created.resource_id(),
        );
        Ok(created)
    }

    pub async fn find_by_subscription_id(&self, id: i64) -> Result<Option<Subscription>> {
        self.store.load(id).await
    }

    /// Subscriptions matching every present predicate of `filter`
    ///
    /// An unconstrained filter returns **every** subscription unless
    /// `allow_unfiltered_queries` is off, in which case it is rejected.
    pub async fn find_by_filter(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>> {
        self.guard_unconstrained(filter)?;
        self.store.find_by_filter(filter).await
    }

    pub async fn count_by_filter(&self, filter: &SubscriptionFilter) -> Result<i64> {
        self.guard_unconstrained(filter)?;
        self.store.count_by_filter(filter).await
    }

    fn guard_unconstrained(&self, filter: &SubscriptionFilter) -> Result<()> {
        if filter.is_unconstrained() {
            if !self.settings.allow_unfiltered_queries {
                return Err(SubscribeError::UnfilteredQuery);
            }
            debug!("Subscription filter has no predicates; scanning every subscription");
        }
        Ok(())
    }

    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.store.list_all().await
    }

    /// Replace the stored record with the same id; `false` if there is no such row
    pub async fn update_subscription(&self, subscription: &Subscription) -> Result<bool> {
        subscription.validate()?;
        let updated = self.store.store(subscription).await?;
        if !updated {
            debug!(subscription_id = subscription.id(), "Update matched no subscription");
        }
        Ok(updated)
    }

    /// Remove by id, optionally notifying the owning provider first
    pub async fn remove_subscription(&self, id: i64, notify: bool) -> Result<RemovalReport> {
        if !notify {
            let deleted = self.store.delete(id).await?;
            log_subscription_operation("remove", Some(id), None, status(deleted), None);
            return Ok(RemovalReport {
                subscription_id: id,
                deleted,
                notification: NotificationOutcome::NotRequested,
            });
        }

        match self.store.load(id).await? {
            Some(subscription) => self.remove_subscription_record(&subscription, true).await,
            None => {
                warn!(subscription_id = id, "Removal with notification requested for unknown subscription");
                let deleted = self.store.delete(id).await?;
                log_subscription_operation("remove", Some(id), None, status(deleted), None);
                Ok(RemovalReport {
                    subscription_id: id,
                    deleted,
                    notification: NotificationOutcome::SubscriptionMissing,
                })
            }
        }
    }

    /// Remove a loaded record, optionally notifying its provider first
    pub async fn remove_subscription_record(
        &self,
        subscription: &Subscription,
        notify: bool,
    ) -> Result<RemovalReport> {
        let notification = if notify {
            self.notify_provider(subscription).await
        } else {
            NotificationOutcome::NotRequested
        };

        let deleted = self.store.delete(subscription.id()).await?;
        log_subscription_operation(
            "remove",
            Some(subscription.id()),
            Some(subscription.provider()),
            status(deleted),
            None,
        );

        Ok(RemovalReport {
            subscription_id: subscription.id(),
            deleted,
            notification,
        })
    }

    async fn notify_provider(&self, subscription: &Subscription) -> NotificationOutcome {
        let provider_name = subscription.provider().to_string();

        let Some(provider) = self.registry.get(&provider_name) else {
            warn!(
                subscription_id = subscription.id(),
                provider = %provider_name,
                "No registered provider for subscription; removing without notification"
            );
            return NotificationOutcome::ProviderNotFound {
                provider: provider_name,
            };
        };

        match provider.notify_removal(subscription).await {
            Ok(()) => {
                debug!(subscription_id = subscription.id(), provider = %provider_name, "Provider notified of removal");
                NotificationOutcome::Delivered {
                    provider: provider_name,
                }
            }
            Err(e) => {
                warn!(
                    subscription_id = subscription.id(),
                    provider = %provider_name,
                    error = %e,
                    "Provider failed to handle removal notification; removing anyway"
                );
                NotificationOutcome::Failed {
                    provider: provider_name,
                    reason: e.reason,
                }
            }
        }
    }

    /// Remove one of the caller's own subscriptions, notifying its provider
    pub async fn remove_owned_subscription(
        &self,
        id: i64,
        caller_identity: &str,
    ) -> Result<OwnedRemoval> {
        let Some(subscription) = self.store.load(id).await? else {
            return Ok(OwnedRemoval::NotFound);
        };

        if subscription.user_id() != caller_identity {
            warn!(subscription_id = id, "Refusing to remove a subscription filed under another identity");
            return Ok(OwnedRemoval::AccessDenied);
        }

        let report = self.remove_subscription_record(&subscription, true).await?;
        Ok(OwnedRemoval::Removed(report))
    }

    /// Distinct identities subscribed to `provider`/`key`, optionally narrowed to one resource
    ///
    /// Several rows for the same identity collapse into one entry.
    pub async fn subscriber_list(
        &self,
        provider: &str,
        key: &str,
        resource_id: Option<&str>,
    ) -> Result<HashSet<String>> {
        let mut filter = SubscriptionFilter::default()
            .with_provider(provider)
            .with_key(key);
        filter.set_resource_id(resource_id.map(str::to_string));

        let subscribers: HashSet<String> = self
            .find_by_filter(&filter)
            .await?
            .into_iter()
            .map(|s| s.user_id().to_string())
            .filter(|user_id| !user_id.is_empty())
            .collect();

        debug!(
            provider = %provider,
            key = %key,
            subscribers = subscribers.len(),
            "Resolved subscriber list"
        );
        Ok(subscribers)
    }

    /// Registered provider with exactly this name
    pub fn provider_service(&self, name: &str) -> Option<Arc<dyn SubscriptionProvider>> {
        self.registry.get(name)
    }

    /// The caller's subscriptions, each described by its provider
    ///
    /// Subscriptions whose provider is not registered are left out.
    pub async fn subscription_views(
        &self,
        caller_identity: &str,
        locale: &str,
    ) -> Result<Vec<SubscriptionView>> {
        if caller_identity.is_empty() {
            return Ok(Vec::new());
        }

        let filter = SubscriptionFilter::default().with_user_id(caller_identity);
        let subscriptions = self.store.find_by_filter(&filter).await?;

        let mut views = Vec::with_capacity(subscriptions.len());
        for subscription in subscriptions {
            let Some(provider) = self.registry.get(subscription.provider()) else {
                warn!(
                    subscription_id = subscription.id(),
                    provider = %subscription.provider(),
                    "Skipping subscription with no registered provider"
                );
                continue;
            };

            let key = subscription.key();
            let resource_id = subscription.resource_id();
            views.push(SubscriptionView {
                subscription_id: subscription.id(),
                description: provider.describe_subscription(
                    caller_identity,
                    key,
                    resource_id,
                    locale,
                ),
                removable: provider.is_removable(caller_identity, key, resource_id),
                modify_url: provider.modify_url(caller_identity, key, resource_id),
            });
        }

        info!(views = views.len(), "Built subscription views");
        Ok(views)
    }
}

fn status(deleted: bool) -> &'static str {
    if deleted {
        "deleted"
    } else {
        "absent"
    }
}
