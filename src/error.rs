//! Error types for the subscription core.

use crate::config::ConfigurationError;
use crate::validation::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubscribeError {
    /// A subscription field failed its required/length constraints.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// The pool could not hand out a connection or the server went away.
    #[error("Persistence unavailable during {operation}: {source}")]
    PersistenceUnavailable {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A statement reached the database and failed there.
    #[error("Database error during {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Subscription filter has no predicates and unfiltered queries are disabled")]
    UnfilteredQuery,

    #[error("Subscription already exists as #{existing_id} for '{user_id}' on {provider}/{key}")]
    DuplicateSubscription {
        existing_id: i64,
        user_id: String,
        provider: String,
        key: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl SubscribeError {
    /// Classify a sqlx error raised while running `operation`.
    pub fn from_sqlx(operation: &'static str, source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => Self::PersistenceUnavailable { operation, source },
            other => Self::Database {
                operation,
                source: other,
            },
        }
    }

    pub fn is_persistence_unavailable(&self) -> bool {
        matches!(self, Self::PersistenceUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, SubscribeError>;

/// Failure reported by a provider while handling a removal notification.
///
/// Never propagated out of a removal; the service logs it and still deletes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Provider '{provider}' failed: {reason}")]
pub struct ProviderError {
    pub provider: String,
    pub reason: String,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}
