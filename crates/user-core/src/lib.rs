//! User service core - domain models, configuration, and the identity store
//!
//! This crate defines the shared abstractions of the identity service:
//! - Account and Profile domain models
//! - The `IdentityStore` capability trait with its PostgreSQL implementation
//! - Configuration management

pub mod config;
pub mod store;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, LoggingConfig, ServerConfig};
pub use store::postgres::PgIdentityStore;
pub use store::{IdentityStore, StoreError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Surrogate account identifier, assigned by the store on first persist.
pub type AccountId = i64;

/// A registered account.
///
/// `password_hash` is never serialized into API responses and must not be
/// logged.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: AccountId,

    /// Unique natural key, case-sensitive as stored.
    pub email: String,

    /// Argon2id hash in PHC string format.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting or updating an account. The store assigns the id
/// and the timestamps.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
}

/// A profile, owned by exactly one account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub country: String,
    /// Continent
    pub region: String,
    pub phone: String,
    pub personal_id: String,
    /// DNI, NIE, Passport
    pub personal_id_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting or updating a profile, keyed by the owning account.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub account_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub region: String,
    pub phone: String,
    pub personal_id: String,
    pub personal_id_type: String,
}
