//! Identity store capability
//!
//! Lookups return `Ok(None)` when no row matches; a `StoreError` always
//! means the storage layer itself failed. Uniqueness and conflict
//! resolution for the upserts are enforced by the storage engine's
//! constraints, not by check-then-act logic in application code.

use crate::{Account, NewAccount, NewProfile, Profile};
use async_trait::async_trait;
use thiserror::Error;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod postgres;

/// Storage faults. Absence of a matching row is never an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage fault: {0}")]
    Backend(String),
}

/// Durable mapping from account identity to credentials and profile data.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert an account or, on email conflict, update the existing row.
    /// Returns the row id: assigned on first insert, unchanged on conflict.
    async fn upsert_account(&self, account: &NewAccount) -> Result<i64, StoreError>;

    /// Insert a profile or, on owner conflict, update the existing row.
    async fn upsert_profile(&self, profile: &NewProfile) -> Result<i64, StoreError>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError>;

    async fn find_profile_by_owner(&self, account_id: i64) -> Result<Option<Profile>, StoreError>;
}
