#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Subscribe Core
//!
//! Subscription persistence and provider notification.
//!
//! ## Overview
//!
//! Users subscribe to resources offered by named **providers** (forums, wikis, issue
//! trackers and so on). This crate stores those subscriptions, answers conjunctive
//! filter queries over them, collapses them into distinct subscriber sets, and gives
//! each provider a chance to react before one of its subscriptions is removed.
//!
//! ## Module Organization
//!
//! - [`models`] - Subscription records, the query filter and presentation views
//! - [`validation`] - Field-level validation of subscription records
//! - [`scopes`] - Chainable SQL query builders over the subscription table
//! - [`store`] - The persistence contract with PostgreSQL and in-memory backends
//! - [`registry`] - Provider trait and name-keyed provider registry
//! - [`services`] - Subscription lifecycle service
//! - [`database`] - Pool construction and schema migrations
//! - [`config`] - Layered TOML + environment configuration
//! - [`logging`] - Structured logging initialization
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use subscribe_core::config::ConfigManager;
//! use subscribe_core::database::DatabaseConnection;
//! use subscribe_core::models::NewSubscription;
//! use subscribe_core::registry::ProviderRegistry;
//! use subscribe_core::services::SubscriptionService;
//! use subscribe_core::store::PgSubscriptionStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! subscribe_core::logging::init_structured_logging();
//!
//! let config = ConfigManager::load()?;
//! let db = DatabaseConnection::connect(&config).await?;
//! db.migrate().await?;
//!
//! let service = SubscriptionService::from_config(
//!     Arc::new(PgSubscriptionStore::new(db.pool().clone())),
//!     Arc::new(ProviderRegistry::new()),
//!     config.config(),
//! );
//!
//! service
//!     .create_subscription(NewSubscription::new("forum", "thread").with_resource_id("42"), "alice")
//!     .await?;
//! let subscribers = service.subscriber_list("forum", "thread", Some("42")).await?;
//! assert!(subscribers.contains("alice"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! Service and store behaviour is tested against the in-memory store. PostgreSQL
//! tests use SQLx native testing and need a database:
//!
//! ```bash
//! cargo test                                  # Unit and in-memory tests
//! cargo test --features postgres-tests        # Also run against PostgreSQL
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod registry;
pub mod scopes;
pub mod services;
pub mod store;
pub mod validation;

pub use config::{ConfigManager, DatabaseConfig, ProvidersConfig, SubscribeConfig, SubscriptionSettings};
pub use error::{ProviderError, Result, SubscribeError};
pub use models::{NewSubscription, Subscription, SubscriptionFilter, SubscriptionView};
pub use registry::{ProviderRegistry, SubscriptionProvider};
pub use services::{NotificationOutcome, OwnedRemoval, RemovalReport, SubscriptionService};
pub use store::{InMemorySubscriptionStore, PgSubscriptionStore, SubscriptionStore, UniqueInsert};
