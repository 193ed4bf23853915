use serde::{Deserialize, Serialize};

/// Presentation data for one of a user's subscriptions, as assembled from its provider
///
/// The description is whatever the provider returns and is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionView {
    pub subscription_id: i64,
    pub description: String,
    pub removable: bool,
    pub modify_url: Option<String>,
}
