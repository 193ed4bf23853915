use crate::validation::{SubscriptionField, ValidationErrors};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Subscription represents a user's subscription to a resource offered by a provider
/// Maps to `subscribe_subscriptions` table
///
/// `provider` namespaces the subscription so independent features never collide,
/// `key` separates several subscription lists of one provider, and `resource_id`
/// names the subscribed object within the provider's domain.
///
/// Records are replaced as a whole (see [`Subscription::revise`]); there are no
/// in-place setters. Deserialized records are validated like any other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
#[serde(try_from = "SubscriptionRecord")]
pub struct Subscription {
    id: i64,
    user_id: String,
    provider: String,
    #[sqlx(rename = "subscription_key")]
    key: String,
    resource_id: Option<String>,
}

/// Wire shape of a [`Subscription`] before validation
#[derive(Deserialize)]
struct SubscriptionRecord {
    id: i64,
    user_id: String,
    provider: String,
    key: String,
    resource_id: Option<String>,
}

impl TryFrom<SubscriptionRecord> for Subscription {
    type Error = ValidationErrors;

    fn try_from(record: SubscriptionRecord) -> Result<Self, Self::Error> {
        let fields = NewSubscription {
            user_id: record.user_id,
            provider: record.provider,
            key: record.key,
            resource_id: record.resource_id,
        };
        fields.validate()?;
        Ok(Self::from_parts(record.id, fields))
    }
}

/// New Subscription for creation (without generated fields)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSubscription {
    pub user_id: String,
    pub provider: String,
    pub key: String,
    pub resource_id: Option<String>,
}

impl NewSubscription {
    /// Start a subscription to `provider`/`key`; the user is filled in by the service
    pub fn new(provider: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            user_id: String::new(),
            provider: provider.into(),
            key: key.into(),
            resource_id: None,
        }
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check_required(SubscriptionField::UserId, &self.user_id);
        errors.check_required(SubscriptionField::Provider, &self.provider);
        errors.check_required(SubscriptionField::Key, &self.key);
        errors.check_optional(SubscriptionField::ResourceId, self.resource_id.as_deref());
        errors.into_result()
    }

    /// True when `subscription` carries exactly these four values
    pub fn same_target(&self, subscription: &Subscription) -> bool {
        self.user_id == subscription.user_id
            && self.provider == subscription.provider
            && self.key == subscription.key
            && self.resource_id == subscription.resource_id
    }
}

impl Subscription {
    /// Assemble a persisted record; stores call this once an id has been assigned
    pub fn from_parts(id: i64, fields: NewSubscription) -> Self {
        Self {
            id,
            user_id: fields.user_id,
            provider: fields.provider,
            key: fields.key,
            resource_id: fields.resource_id,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// Replacement record carrying the same id and the given non-key fields
    pub fn revise(&self, fields: NewSubscription) -> Self {
        Self::from_parts(self.id, fields)
    }

    /// The non-key fields of this record
    pub fn to_new(&self) -> NewSubscription {
        NewSubscription {
            user_id: self.user_id.clone(),
            provider: self.provider.clone(),
            key: self.key.clone(),
            resource_id: self.resource_id.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        self.to_new().validate()
    }
}
