//! The currently signed-in identity, mirrored into storage so it survives a restart.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::account::Profile;
use crate::storage::{Storage, StorageError, AUTH_FLAG_KEY, SCHEMA_VERSION, SESSION_PROFILE_KEY};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("You are not signed in.")]
    NotAuthenticated,
    #[error("Following count cannot go below zero.")]
    CountUnderflow,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Unauthenticated,
    Authenticated(Profile),
}

/// Flat profile document plus its schema tag
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProfile {
    schema_version: u32,
    #[serde(flatten)]
    profile: Profile,
}

/// At most one active identity per process.
///
/// The profile is a snapshot; callers that mutate the backing account
/// re-sync it with [`Session::refresh`].
pub struct Session {
    state: SessionState,
    storage: Storage,
}

impl Session {
    /// An unauthenticated session over `storage`. Call [`restore`](Self::restore) to pick up a persisted one.
    pub fn new(storage: Storage) -> Self {
        Self {
            state: SessionState::Unauthenticated,
            storage,
        }
    }

    pub fn start(&mut self, profile: Profile) -> Result<(), SessionError> {
        self.persist(&profile)?;
        self.storage.put(AUTH_FLAG_KEY, &true)?;
        info!("Session started for {}", profile.handle);
        self.state = SessionState::Authenticated(profile);
        Ok(())
    }

    pub fn end(&mut self) -> Result<(), SessionError> {
        self.storage.remove(AUTH_FLAG_KEY)?;
        self.storage.remove(SESSION_PROFILE_KEY)?;
        if let SessionState::Authenticated(profile) = &self.state {
            info!("Session ended for {}", profile.handle);
        }
        self.state = SessionState::Unauthenticated;
        Ok(())
    }

    /// Reload a persisted session.
    ///
    /// Returns the profile only when the flag is `true` and the profile is
    /// well-formed with a known schema version; anything else leaves the
    /// session unauthenticated.
    pub fn restore(&mut self) -> Option<Profile> {
        match self.read_persisted() {
            Ok(Some(profile)) => {
                info!("Restored session for {}", profile.handle);
                self.state = SessionState::Authenticated(profile.clone());
                Some(profile)
            }
            Ok(None) => {
                debug!("No persisted session");
                self.state = SessionState::Unauthenticated;
                None
            }
            Err(e) => {
                warn!("Ignoring unreadable session: {}", e);
                self.state = SessionState::Unauthenticated;
                None
            }
        }
    }

    /// Add `delta` to the snapshot's following count and persist it
    pub fn adjust_following_count(&mut self, delta: i64) -> Result<(), SessionError> {
        let SessionState::Authenticated(current) = &self.state else {
            return Err(SessionError::NotAuthenticated);
        };

        let mut updated = current.clone();
        updated.following_count = updated
            .following_count
            .checked_add_signed(delta)
            .ok_or(SessionError::CountUnderflow)?;

        self.persist(&updated)?;
        self.state = SessionState::Authenticated(updated);
        Ok(())
    }

    /// Replace the snapshot with a newer copy of the same account
    pub fn refresh(&mut self, profile: Profile) -> Result<(), SessionError> {
        match &self.state {
            SessionState::Authenticated(current) if current.id == profile.id => {
                self.persist(&profile)?;
                self.state = SessionState::Authenticated(profile);
                Ok(())
            }
            _ => Err(SessionError::NotAuthenticated),
        }
    }

    pub fn current(&self) -> Option<&Profile> {
        match &self.state {
            SessionState::Authenticated(profile) => Some(profile),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    fn persist(&self, profile: &Profile) -> Result<(), StorageError> {
        let stored = StoredProfile {
            schema_version: SCHEMA_VERSION,
            profile: profile.clone(),
        };
        self.storage.put(SESSION_PROFILE_KEY, &stored)
    }

    fn read_persisted(&self) -> Result<Option<Profile>, StorageError> {
        if self.storage.get::<bool>(AUTH_FLAG_KEY)? != Some(true) {
            return Ok(None);
        }
        let Some(stored) = self.storage.get::<StoredProfile>(SESSION_PROFILE_KEY)? else {
            return Ok(None);
        };
        if stored.schema_version != SCHEMA_VERSION {
            return Err(StorageError::UnsupportedSchema {
                key: SESSION_PROFILE_KEY.to_string(),
                found: stored.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(Some(stored.profile))
    }
}
