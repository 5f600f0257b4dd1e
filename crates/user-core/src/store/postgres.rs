//! PostgreSQL identity store
//!
//! Account upserts are keyed by the unique email constraint, profile
//! upserts by the unique owner constraint, so two concurrent inserts for
//! the same natural key resolve to a single row inside the database.

use crate::config::DatabaseConfig;
use crate::store::{IdentityStore, StoreError};
use crate::{Account, NewAccount, NewProfile, Profile};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// PostgreSQL-backed identity store
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    /// Connect a new pool using the database configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::Backend(format!("PostgreSQL connection failed: {e}")))?;

        tracing::info!("connected to database");
        Ok(Self { pool })
    }

    /// Create from an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the identity tables if they do not exist.
    ///
    /// The unique constraints on `accounts.email` and `profiles.account_id`
    /// are what make the upserts atomic.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id BIGSERIAL PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(format!("failed to create accounts table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id BIGSERIAL PRIMARY KEY,
                account_id BIGINT NOT NULL UNIQUE REFERENCES accounts (id),
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                address TEXT NOT NULL DEFAULT '',
                district TEXT NOT NULL DEFAULT '',
                city TEXT NOT NULL DEFAULT '',
                state TEXT NOT NULL DEFAULT '',
                country TEXT NOT NULL DEFAULT '',
                region TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL DEFAULT '',
                personal_id TEXT NOT NULL DEFAULT '',
                personal_id_type TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(format!("failed to create profiles table: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn upsert_account(&self, account: &NewAccount) -> Result<i64, StoreError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO accounts (email, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE
                SET password_hash = EXCLUDED.password_hash,
                    updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(&account.email)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // the insert-returning statement always yields a row
            sqlx::Error::RowNotFound => {
                StoreError::Backend("account upsert returned no row".to_string())
            }
            e => StoreError::Backend(format!("failed to upsert account: {e}")),
        })?;

        Ok(row.0)
    }

    async fn upsert_profile(&self, profile: &NewProfile) -> Result<i64, StoreError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO profiles (
                account_id, first_name, last_name, address, district,
                city, state, country, region, phone,
                personal_id, personal_id_type
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (account_id) DO UPDATE
                SET first_name = EXCLUDED.first_name,
                    last_name = EXCLUDED.last_name,
                    address = EXCLUDED.address,
                    district = EXCLUDED.district,
                    city = EXCLUDED.city,
                    state = EXCLUDED.state,
                    country = EXCLUDED.country,
                    region = EXCLUDED.region,
                    phone = EXCLUDED.phone,
                    personal_id = EXCLUDED.personal_id,
                    personal_id_type = EXCLUDED.personal_id_type,
                    updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(profile.account_id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.address)
        .bind(&profile.district)
        .bind(&profile.city)
        .bind(&profile.state)
        .bind(&profile.country)
        .bind(&profile.region)
        .bind(&profile.phone)
        .bind(&profile.personal_id)
        .bind(&profile.personal_id_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                StoreError::Backend("profile upsert returned no row".to_string())
            }
            e => StoreError::Backend(format!("failed to upsert profile: {e}")),
        })?;

        Ok(row.0)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        sqlx::query_as(
            r#"
            SELECT id, email, password_hash, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(format!("failed to find account by email: {e}")))
    }

    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        sqlx::query_as(
            r#"
            SELECT id, email, password_hash, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(format!("failed to find account by id: {e}")))
    }

    async fn find_profile_by_owner(&self, account_id: i64) -> Result<Option<Profile>, StoreError> {
        sqlx::query_as(
            r#"
            SELECT id, account_id, first_name, last_name, address, district,
                   city, state, country, region, phone,
                   personal_id, personal_id_type, created_at, updated_at
            FROM profiles
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(format!("failed to find profile by owner: {e}")))
    }
}
