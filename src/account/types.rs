//! Account type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::store::AccountError;

/// Profile identifier (uuid v4 string)
pub type ProfileId = String;

/// Public-facing identity of an account
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: ProfileId,
    pub display_name: String,
    pub handle: String, // Always "@" + lowercase name
    pub avatar_url: String,
    pub cover_image_url: String,
    pub bio: String,
    pub follower_count: u64,
    pub following_count: u64,
}

/// One stored registrant
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub email: String,
    pub password_hash: String, // Argon2id PHC string (salt embedded)
    pub profile: Profile,

    #[serde(default)]
    pub following: BTreeSet<ProfileId>,
    pub created_at: DateTime<Utc>,
}

impl AccountRecord {
    pub fn is_following(&self, id: &str) -> bool {
        self.following.contains(id)
    }
}

/// Trim and lowercase an email, rejecting anything without a usable `local@domain` shape.
pub fn normalize_email(email: &str) -> Result<String, AccountError> {
    let email = email.trim().to_lowercase();
    let (local, domain) = email.split_once('@').ok_or(AccountError::InvalidEmail)?;
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
    {
        return Err(AccountError::InvalidEmail);
    }
    Ok(email)
}

/// Normalize a handle to `@name`: trimmed, lowercase, a single leading `@`.
pub fn normalize_handle(handle: &str) -> Result<String, AccountError> {
    let name = handle.trim().trim_start_matches('@').to_lowercase();
    if name.is_empty() || name.contains('@') || name.chars().any(char::is_whitespace) {
        return Err(AccountError::InvalidHandle);
    }
    Ok(format!("@{}", name))
}
