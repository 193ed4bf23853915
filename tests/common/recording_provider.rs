use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use subscribe_core::error::ProviderError;
use subscribe_core::models::Subscription;
use subscribe_core::registry::SubscriptionProvider;
use subscribe_core::store::SubscriptionStore;

/// What the provider saw when it was notified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNotification {
    pub subscription: Subscription,
    /// Whether the row was still in the store when the hook ran
    pub present_in_store: bool,
}

/// Provider that records every removal notification it receives
pub struct RecordingProvider {
    name: String,
    failure: Option<String>,
    removable: bool,
    observed_store: Option<Arc<dyn SubscriptionStore>>,
    notifications: Mutex<Vec<RecordedNotification>>,
}

impl RecordingProvider {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            failure: None,
            removable: true,
            observed_store: None,
            notifications: Mutex::new(Vec::new()),
        }
    }

    /// Make `notify_removal` fail with `reason`
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    pub fn not_removable(mut self) -> Self {
        self.removable = false;
        self
    }

    /// Check the store from inside the hook to see whether the row still exists
    pub fn observing(mut self, store: Arc<dyn SubscriptionStore>) -> Self {
        self.observed_store = Some(store);
        self
    }

    pub fn notifications(&self) -> Vec<RecordedNotification> {
        self.notifications.lock().clone()
    }

    pub fn notified_ids(&self) -> Vec<i64> {
        self.notifications
            .lock()
            .iter()
            .map(|n| n.subscription.id())
            .collect()
    }
}

#[async_trait]
impl SubscriptionProvider for RecordingProvider {
    fn provider_name(&self) -> &str {
        &self.name
    }

    fn describe_subscription(
        &self,
        identity: &str,
        key: &str,
        resource_id: Option<&str>,
        locale: &str,
    ) -> String {
        match resource_id {
            Some(resource_id) => format!("[{locale}] {identity}: {}/{key}/{resource_id}", self.name),
            None => format!("[{locale}] {identity}: {}/{key}", self.name),
        }
    }

    fn is_removable(&self, _identity: &str, _key: &str, _resource_id: Option<&str>) -> bool {
        self.removable
    }

    fn modify_url(&self, _identity: &str, key: &str, _resource_id: Option<&str>) -> Option<String> {
        Some(format!("/{}/{key}/settings", self.name))
    }

    async fn notify_removal(&self, subscription: &Subscription) -> Result<(), ProviderError> {
        let present_in_store = match &self.observed_store {
            Some(store) => store
                .load(subscription.id())
                .await
                .map_err(|e| ProviderError::new(&self.name, e.to_string()))?
                .is_some(),
            None => false,
        };

        self.notifications.lock().push(RecordedNotification {
            subscription: subscription.clone(),
            present_in_store,
        });

        match &self.failure {
            Some(reason) => Err(ProviderError::new(&self.name, reason.as_str())),
            None => Ok(()),
        }
    }
}
