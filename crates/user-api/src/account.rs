//! Account and profile service layer
//!
//! Orchestrates the store for account reads, email updates, and profile
//! maintenance. All writes go through the store's upserts; this layer only
//! adds the existence checks the request contracts require.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use user_core::{Account, IdentityStore, NewAccount, NewProfile, Profile, StoreError};
use validator::Validate;

/// Account email update request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(email)]
    pub email: String,
}

/// Account representation returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i64,
    pub email: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
        }
    }
}

/// Profile create/update request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub personal_id: String,
    #[serde(default)]
    pub personal_id_type: String,
}

impl ProfileRequest {
    fn into_new_profile(self, account_id: i64) -> NewProfile {
        NewProfile {
            account_id,
            first_name: self.first_name,
            last_name: self.last_name,
            address: self.address,
            district: self.district,
            city: self.city,
            state: self.state,
            country: self.country,
            region: self.region,
            phone: self.phone,
            personal_id: self.personal_id,
            personal_id_type: self.personal_id_type,
        }
    }
}

/// Profile representation returned to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub account_id: i64,
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

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            account_id: profile.account_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            address: profile.address,
            district: profile.district,
            city: profile.city,
            state: profile.state,
            country: profile.country,
            region: profile.region,
            phone: profile.phone,
            personal_id: profile.personal_id,
            personal_id_type: profile.personal_id_type,
        }
    }
}

/// Account and profile errors
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account not found")]
    AccountNotFound,

    #[error("profile not found")]
    ProfileNotFound,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Account and profile service
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn IdentityStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    pub async fn get_account(&self, account_id: i64) -> Result<Account, AccountError> {
        self.store
            .find_account_by_id(account_id)
            .await?
            .ok_or(AccountError::AccountNotFound)
    }

    /// Change the account's email, preserving the stored credential.
    pub async fn update_email(&self, account_id: i64, email: &str) -> Result<i64, AccountError> {
        let existing = self.get_account(account_id).await?;

        let id = self
            .store
            .upsert_account(&NewAccount {
                email: email.to_string(),
                password_hash: existing.password_hash,
            })
            .await?;

        Ok(id)
    }

    /// Create the profile for an account; the account must exist.
    pub async fn create_profile(
        &self,
        account_id: i64,
        request: ProfileRequest,
    ) -> Result<i64, AccountError> {
        self.get_account(account_id).await?;

        let id = self
            .store
            .upsert_profile(&request.into_new_profile(account_id))
            .await?;

        tracing::info!(account_id, profile_id = id, "profile created");
        Ok(id)
    }

    pub async fn get_profile(&self, account_id: i64) -> Result<Profile, AccountError> {
        self.store
            .find_profile_by_owner(account_id)
            .await?
            .ok_or(AccountError::ProfileNotFound)
    }

    /// Update an existing profile; absent profiles are not created here.
    pub async fn update_profile(
        &self,
        account_id: i64,
        request: ProfileRequest,
    ) -> Result<i64, AccountError> {
        let existing = self.get_profile(account_id).await?;

        let id = self
            .store
            .upsert_profile(&request.into_new_profile(existing.account_id))
            .await?;

        Ok(id)
    }
}
