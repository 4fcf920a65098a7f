//! Account System Module
//!
//! Local registry of identities used for sign-up and sign-in:
//! - Accounts keyed by normalized email and by `@handle`
//! - Argon2id password hashes (no plaintext is ever stored)
//! - Follow relationships owned by the follower's record

pub mod auth;
pub mod store;
pub mod types;

pub use store::{AccountError, AccountStore};
pub use types::{AccountRecord, Profile, ProfileId};
