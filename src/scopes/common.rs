//! # Common Scope Functionality
//!
//! Shared traits used across scope builders.

use sqlx::PgPool;

/// Base trait for all scope builders
pub trait ScopeBuilder<T> {
    /// Build the final query and execute it
    fn all(
        self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<Vec<T>, sqlx::Error>> + Send;

    /// Get a single result (first match)
    fn first(
        self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<Option<T>, sqlx::Error>> + Send;

    /// Count the number of results
    fn count(
        self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Check if any results exist
    fn exists(
        self,
        pool: &PgPool,
    ) -> impl std::future::Future<Output = Result<bool, sqlx::Error>> + Send;
}
