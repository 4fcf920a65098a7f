//! Account storage and management

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::auth::{hash_password, is_strong_enough, verify_password, AuthError};
use super::types::{normalize_email, normalize_handle, AccountRecord, Profile};
use crate::config::AccountsConfig;
use crate::storage::{Storage, StorageError, ACCOUNTS_KEY, SCHEMA_VERSION};

/// Account store failures. The display text is shown to the user as-is.
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("An account with this email already exists.")]
    DuplicateEmail,
    #[error("This username is already taken.")]
    DuplicateHandle,
    #[error("Password must be at least {min_len} characters long.")]
    WeakPassword { min_len: usize },
    #[error("No account found for this email.")]
    AccountNotFound,
    #[error("Incorrect password.")]
    InvalidCredentials,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please enter a valid username.")]
    InvalidHandle,
    #[error("You cannot follow yourself.")]
    SelfFollow,
    #[error("Follower count cannot go below zero.")]
    CountUnderflow,
    #[error("Password hashing error: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<AuthError> for AccountError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidPassword => AccountError::InvalidCredentials,
            other => AccountError::PasswordHash(other.to_string()),
        }
    }
}

/// Persisted form of the whole table
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAccounts {
    schema_version: u32,
    accounts: Vec<AccountRecord>,
}

/// Durable registry of accounts, keyed by normalized email and handle.
///
/// Every mutation builds the next table, persists it in full, and only then
/// replaces the in-memory copy, so a failed call leaves nothing changed.
pub struct AccountStore {
    records: Vec<AccountRecord>,
    storage: Storage,
    settings: AccountsConfig,
}

impl AccountStore {
    /// Load the table from storage (empty if nothing was persisted yet)
    pub fn load(storage: Storage, settings: AccountsConfig) -> Result<Self, AccountError> {
        let records = match storage.get::<StoredAccounts>(ACCOUNTS_KEY)? {
            Some(stored) if stored.schema_version == SCHEMA_VERSION => stored.accounts,
            Some(stored) => {
                return Err(StorageError::UnsupportedSchema {
                    key: ACCOUNTS_KEY.to_string(),
                    found: stored.schema_version,
                    expected: SCHEMA_VERSION,
                }
                .into())
            }
            None => Vec::new(),
        };
        debug!("Loaded {} accounts", records.len());

        Ok(Self {
            records,
            storage,
            settings,
        })
    }

    /// Register a new account and return its fresh profile
    pub fn register(
        &mut self,
        email: &str,
        password: &str,
        display_name: &str,
        handle: &str,
    ) -> Result<Profile, AccountError> {
        let email = normalize_email(email)?;
        let handle = normalize_handle(handle)?;

        if self.records.iter().any(|r| r.email == email) {
            return Err(AccountError::DuplicateEmail);
        }
        if self.records.iter().any(|r| r.profile.handle == handle) {
            return Err(AccountError::DuplicateHandle);
        }
        if !is_strong_enough(password, self.settings.min_password_len) {
            return Err(AccountError::WeakPassword {
                min_len: self.settings.min_password_len,
            });
        }

        let password_hash = hash_password(password)?;

        let display_name = match display_name.trim() {
            "" => self.settings.default_display_name.clone(),
            name => name.to_string(),
        };

        let profile = Profile {
            id: Uuid::new_v4().to_string(),
            display_name,
            avatar_url: self.settings.avatar_url_for(&handle),
            cover_image_url: self.settings.cover_image_url.clone(),
            bio: self.settings.default_bio.clone(),
            handle,
            follower_count: 0,
            following_count: 0,
        };

        let mut next = self.records.clone();
        next.push(AccountRecord {
            email,
            password_hash,
            profile: profile.clone(),
            following: Default::default(),
            created_at: Utc::now(),
        });
        self.commit(next)?;

        info!("Registered account {} ({})", profile.handle, profile.id);
        Ok(profile)
    }

    /// Check credentials and return the stored profile. Never mutates.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Profile, AccountError> {
        let email = normalize_email(email).map_err(|_| AccountError::AccountNotFound)?;
        let record = self
            .records
            .iter()
            .find(|r| r.email == email)
            .ok_or(AccountError::AccountNotFound)?;

        verify_password(password, &record.password_hash)?;

        debug!("Authenticated {}", record.profile.handle);
        Ok(record.profile.clone())
    }

    /// Add `target_id` to the follower's following set.
    ///
    /// Returns false when already following. If the target is a stored
    /// account its follower count goes up too.
    pub fn follow(&mut self, follower_id: &str, target_id: &str) -> Result<bool, AccountError> {
        if follower_id == target_id {
            return Err(AccountError::SelfFollow);
        }
        let follower = self.index_of(follower_id)?;
        if self.records[follower].is_following(target_id) {
            return Ok(false);
        }

        let mut next = self.records.clone();
        next[follower].following.insert(target_id.to_string());
        next[follower].profile.following_count += 1;
        if let Some(target) = next.iter_mut().find(|r| r.profile.id == target_id) {
            target.profile.follower_count += 1;
        }
        self.commit(next)?;

        debug!("{} now follows {}", follower_id, target_id);
        Ok(true)
    }

    /// Inverse of [`follow`](Self::follow). Returns false when not following.
    pub fn unfollow(&mut self, follower_id: &str, target_id: &str) -> Result<bool, AccountError> {
        let follower = self.index_of(follower_id)?;
        if !self.records[follower].is_following(target_id) {
            return Ok(false);
        }

        let mut next = self.records.clone();
        let record = &mut next[follower];
        record.following.remove(target_id);
        record.profile.following_count = record
            .profile
            .following_count
            .checked_sub(1)
            .ok_or(AccountError::CountUnderflow)?;
        if let Some(target) = next.iter_mut().find(|r| r.profile.id == target_id) {
            target.profile.follower_count = target
                .profile
                .follower_count
                .checked_sub(1)
                .ok_or(AccountError::CountUnderflow)?;
        }
        self.commit(next)?;

        debug!("{} unfollowed {}", follower_id, target_id);
        Ok(true)
    }

    /// Get account by profile id
    pub fn get(&self, id: &str) -> Option<&AccountRecord> {
        self.records.iter().find(|r| r.profile.id == id)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&AccountRecord> {
        let email = normalize_email(email).ok()?;
        self.records.iter().find(|r| r.email == email)
    }

    /// Look up a profile by handle, with or without the `@`
    pub fn find_by_handle(&self, handle: &str) -> Option<&Profile> {
        let handle = normalize_handle(handle).ok()?;
        self.records
            .iter()
            .map(|r| &r.profile)
            .find(|p| p.handle == handle)
    }

    /// All profiles in registration order
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.records.iter().map(|r| &r.profile)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn index_of(&self, id: &str) -> Result<usize, AccountError> {
        self.records
            .iter()
            .position(|r| r.profile.id == id)
            .ok_or(AccountError::AccountNotFound)
    }

    // Full rewrite, then swap
    fn commit(&mut self, next: Vec<AccountRecord>) -> Result<(), AccountError> {
        let stored = StoredAccounts {
            schema_version: SCHEMA_VERSION,
            accounts: next,
        };
        self.storage.put(ACCOUNTS_KEY, &stored)?;
        self.records = stored.accounts;
        Ok(())
    }
}
