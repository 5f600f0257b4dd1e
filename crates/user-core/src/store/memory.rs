//! In-memory identity store
//!
//! Test double for the `IdentityStore` trait. Upserts are keyed the same
//! way as the PostgreSQL implementation (account email, profile owner) and
//! run under a single lock, so the concurrency behavior of the upsert
//! contract can be exercised without a database.

use crate::store::{IdentityStore, StoreError};
use crate::{Account, NewAccount, NewProfile, Profile};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    accounts: HashMap<i64, Account>,
    /// Keyed by owning account id (one profile per account)
    profiles: HashMap<i64, Profile>,
    next_account_id: i64,
    next_profile_id: i64,
}

/// In-memory store, safe to share across tasks
#[derive(Default)]
pub struct MemoryIdentityStore {
    inner: Mutex<Inner>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove an account, returning whether it existed. Lets tests exercise
    /// token validation for accounts that disappeared after issuance.
    pub fn remove_account(&self, id: i64) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.accounts.remove(&id).is_some()
    }

    /// Number of stored accounts
    pub fn account_count(&self) -> usize {
        self.inner.lock().unwrap().accounts.len()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn upsert_account(&self, account: &NewAccount) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();

        if let Some(existing) = inner
            .accounts
            .values_mut()
            .find(|a| a.email == account.email)
        {
            existing.password_hash = account.password_hash.clone();
            existing.updated_at = now;
            return Ok(existing.id);
        }

        inner.next_account_id += 1;
        let id = inner.next_account_id;
        inner.accounts.insert(
            id,
            Account {
                id,
                email: account.email.clone(),
                password_hash: account.password_hash.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn upsert_profile(&self, profile: &NewProfile) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();

        if let Some(existing) = inner.profiles.get_mut(&profile.account_id) {
            existing.first_name = profile.first_name.clone();
            existing.last_name = profile.last_name.clone();
            existing.address = profile.address.clone();
            existing.district = profile.district.clone();
            existing.city = profile.city.clone();
            existing.state = profile.state.clone();
            existing.country = profile.country.clone();
            existing.region = profile.region.clone();
            existing.phone = profile.phone.clone();
            existing.personal_id = profile.personal_id.clone();
            existing.personal_id_type = profile.personal_id_type.clone();
            existing.updated_at = now;
            return Ok(existing.id);
        }

        inner.next_profile_id += 1;
        let id = inner.next_profile_id;
        inner.profiles.insert(
            profile.account_id,
            Profile {
                id,
                account_id: profile.account_id,
                first_name: profile.first_name.clone(),
                last_name: profile.last_name.clone(),
                address: profile.address.clone(),
                district: profile.district.clone(),
                city: profile.city.clone(),
                state: profile.state.clone(),
                country: profile.country.clone(),
                region: profile.region.clone(),
                phone: profile.phone.clone(),
                personal_id: profile.personal_id.clone(),
                personal_id_type: profile.personal_id_type.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.accounts.get(&id).cloned())
    }

    async fn find_profile_by_owner(&self, account_id: i64) -> Result<Option<Profile>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.profiles.get(&account_id).cloned())
    }
}
