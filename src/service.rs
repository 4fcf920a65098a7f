//! The account service handed to the CLI (or any other front end).
//!
//! Owns the storage handle, the account store and the session. The store is
//! the single mutable owner of account data; after every store mutation the
//! session snapshot is brought back in line with the stored record.

use tracing::{info, warn};

use crate::account::{AccountStore, Profile};
use crate::config::SinigangConfig;
use crate::error::{Result, SinigangError};
use crate::feed::{Comment, Feed, Post};
use crate::notifications::Notifications;
use crate::session::{Session, SessionError};
use crate::storage::Storage;

pub struct SocialService {
    storage: Storage,
    accounts: AccountStore,
    session: Session,
    // Not persisted
    feed: Feed,
    notifications: Notifications,
}

impl SocialService {
    /// Open the database named in the config and restore any persisted session
    pub fn open(config: &SinigangConfig) -> Result<Self> {
        info!("Opening account database at '{}'", config.storage.db_path);
        let storage = Storage::open(&config.storage.db_path)?;
        Self::with_storage(storage, config)
    }

    pub fn with_storage(storage: Storage, config: &SinigangConfig) -> Result<Self> {
        let accounts = AccountStore::load(storage.clone(), config.accounts.clone())?;
        let mut session = Session::new(storage.clone());

        if let Some(profile) = session.restore() {
            match accounts.get(&profile.id) {
                Some(record) if record.profile != profile => {
                    session.refresh(record.profile.clone())?;
                }
                Some(_) => {}
                None => {
                    warn!("Persisted session refers to unknown account {}", profile.id);
                    session.end()?;
                }
            }
        }

        Ok(Self {
            storage,
            accounts,
            session,
            feed: Feed::new(),
            notifications: Notifications::new(),
        })
    }

    /// Register and sign in as the new account
    pub fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        display_name: &str,
        handle: &str,
    ) -> Result<Profile> {
        let profile = self
            .accounts
            .register(email, password, display_name, handle)?;
        self.session.start(profile.clone())?;
        Ok(profile)
    }

    /// Authenticate and start a session, replacing any current one
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<Profile> {
        let profile = self.accounts.authenticate(email, password)?;
        self.session.start(profile.clone())?;
        Ok(profile)
    }

    pub fn sign_out(&mut self) -> Result<()> {
        self.session.end()?;
        Ok(())
    }

    /// Follow `target_id`. Returns false when already following.
    pub fn follow(&mut self, target_id: &str) -> Result<bool> {
        let me = self.require_current()?;
        let changed = self.accounts.follow(&me, target_id)?;
        if changed {
            self.session.adjust_following_count(1)?;
            self.resync(&me)?;
        }
        Ok(changed)
    }

    /// Unfollow `target_id`. Returns false when not following.
    pub fn unfollow(&mut self, target_id: &str) -> Result<bool> {
        let me = self.require_current()?;
        let changed = self.accounts.unfollow(&me, target_id)?;
        if changed {
            self.session.adjust_following_count(-1)?;
            self.resync(&me)?;
        }
        Ok(changed)
    }

    /// Publish a post as the signed-in user
    pub fn post(&mut self, content: &str, image: Option<String>) -> Result<Post> {
        let author = self.session.current().ok_or(SessionError::NotAuthenticated)?;
        Ok(self.feed.create_post(author, content, image)?)
    }

    pub fn toggle_like(&mut self, post_id: &str) -> Result<Post> {
        self.require_current()?;
        Ok(self.feed.toggle_like(post_id)?.clone())
    }

    pub fn comment(&mut self, post_id: &str, text: &str) -> Result<Comment> {
        let author = self.session.current().ok_or(SessionError::NotAuthenticated)?;
        Ok(self.feed.add_comment(post_id, author, text)?)
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn notifications(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    pub fn current_user(&self) -> Option<&Profile> {
        self.session.current()
    }

    pub fn is_following(&self, target_id: &str) -> bool {
        self.session
            .current()
            .and_then(|p| self.accounts.get(&p.id))
            .is_some_and(|r| r.is_following(target_id))
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Flush pending writes and release the database
    pub fn close(self) -> Result<()> {
        self.storage.flush()?;
        info!("Account database closed");
        Ok(())
    }

    fn require_current(&self) -> Result<String> {
        self.session
            .current()
            .map(|p| p.id.clone())
            .ok_or_else(|| SessionError::NotAuthenticated.into())
    }

    // The stored record also picks up follower-count changes made by other accounts
    fn resync(&mut self, id: &str) -> Result<()> {
        let record = self
            .accounts
            .get(id)
            .ok_or_else(|| SinigangError::MissingAccount(id.to_string()))?;
        self.session.refresh(record.profile.clone())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountError;

    fn service(storage: &Storage) -> SocialService {
        SocialService::with_storage(storage.clone(), &SinigangConfig::default()).unwrap()
    }

    #[test]
    fn test_sign_up_starts_session() {
        let storage = Storage::temporary().unwrap();
        let mut svc = service(&storage);

        let profile = svc.sign_up("u@x.com", "secret1", "Ann", "ann").unwrap();
        assert_eq!(svc.current_user(), Some(&profile));

        // Restart
        let svc = service(&storage);
        assert_eq!(svc.current_user(), Some(&profile));
    }

    #[test]
    fn test_failed_sign_in_stays_unauthenticated() {
        let storage = Storage::temporary().unwrap();
        let mut svc = service(&storage);
        svc.sign_up("u@x.com", "secret1", "Ann", "ann").unwrap();
        svc.sign_out().unwrap();

        let err = svc.sign_in("u@x.com", "wrongpass").unwrap_err();
        assert!(matches!(err, SinigangError::Account(AccountError::InvalidCredentials)));
        assert!(svc.current_user().is_none());

        let err = svc.sign_up("U@x.com", "secret1", "Ann", "other").unwrap_err();
        assert!(matches!(err, SinigangError::Account(AccountError::DuplicateEmail)));
        assert!(svc.current_user().is_none());
    }

    #[test]
    fn test_sign_out_survives_restart() {
        let storage = Storage::temporary().unwrap();
        let mut svc = service(&storage);
        svc.sign_up("u@x.com", "secret1", "Ann", "ann").unwrap();
        svc.sign_out().unwrap();

        let mut svc = service(&storage);
        assert!(svc.current_user().is_none());
        assert_eq!(svc.sign_in("U@X.com", "secret1").unwrap().handle, "@ann");
    }

    #[test]
    fn test_follow_keeps_session_and_store_in_sync() {
        let storage = Storage::temporary().unwrap();
        let mut svc = service(&storage);
        let bob = svc.sign_up("bob@x.com", "secret1", "Bob", "bob").unwrap();
        let ann = svc.sign_up("ann@x.com", "secret1", "Ann", "ann").unwrap();

        assert!(svc.follow(&bob.id).unwrap());
        assert!(!svc.follow(&bob.id).unwrap());
        assert!(svc.is_following(&bob.id));

        let snapshot = svc.current_user().unwrap().clone();
        assert_eq!(snapshot.following_count, 1);
        assert_eq!(svc.accounts().get(&ann.id).unwrap().profile, snapshot);
        assert_eq!(svc.accounts().get(&bob.id).unwrap().profile.follower_count, 1);

        // The stored record is authoritative after a restart as well
        let mut svc = service(&storage);
        assert_eq!(svc.current_user().unwrap().following_count, 1);
        assert_eq!(svc.sign_in("ann@x.com", "secret1").unwrap().following_count, 1);

        assert!(svc.unfollow(&bob.id).unwrap());
        assert_eq!(svc.current_user().unwrap().following_count, 0);
        assert_eq!(svc.accounts().get(&bob.id).unwrap().profile.follower_count, 0);
    }

    #[test]
    fn test_restored_snapshot_is_resynced_from_store() {
        let storage = Storage::temporary().unwrap();
        let bob = service(&storage)
            .sign_up("bob@x.com", "secret1", "Bob", "bob")
            .unwrap();

        // Someone else follows bob while his session sits on disk
        let mut store = AccountStore::load(storage.clone(), Default::default()).unwrap();
        let ann = store.register("ann@x.com", "secret1", "Ann", "ann").unwrap();
        store.follow(&ann.id, &bob.id).unwrap();

        let svc = service(&storage);
        assert_eq!(svc.current_user().unwrap().id, bob.id);
        assert_eq!(svc.current_user().unwrap().follower_count, 1);
    }

    #[test]
    fn test_follow_requires_session() {
        let storage = Storage::temporary().unwrap();
        let mut svc = service(&storage);

        let err = svc.follow("anyone").unwrap_err();
        assert!(matches!(err, SinigangError::Session(SessionError::NotAuthenticated)));
    }

    #[test]
    fn test_posting_needs_a_session() {
        let storage = Storage::temporary().unwrap();
        let mut svc = service(&storage);

        let err = svc.post("hello", None).unwrap_err();
        assert!(matches!(err, SinigangError::Session(SessionError::NotAuthenticated)));

        let ann = svc.sign_up("ann@x.com", "secret1", "Ann", "ann").unwrap();
        let post = svc.post("hello", None).unwrap();
        assert_eq!(post.user_id, ann.id);
        assert_eq!(post.user_handle, "@ann");

        assert_eq!(svc.toggle_like(&post.id).unwrap().likes, 1);
        svc.comment(&post.id, "first!").unwrap();
        assert_eq!(svc.feed().get(&post.id).unwrap().comments.len(), 1);

        svc.sign_out().unwrap();
        let err = svc.comment(&post.id, "again").unwrap_err();
        assert!(matches!(err, SinigangError::Session(SessionError::NotAuthenticated)));

        let err = svc.toggle_like(&post.id).unwrap_err();
        assert!(matches!(err, SinigangError::Session(SessionError::NotAuthenticated)));
        let post = svc.feed().get(&post.id).unwrap();
        assert_eq!(post.likes, 1);
        assert!(post.is_liked);
    }

    #[test]
    fn test_orphaned_session_is_dropped() {
        let storage = Storage::temporary().unwrap();
        let mut session = Session::new(storage.clone());
        session
            .start(Profile {
                id: "ghost".to_string(),
                display_name: "Ghost".to_string(),
                handle: "@ghost".to_string(),
                avatar_url: String::new(),
                cover_image_url: String::new(),
                bio: String::new(),
                follower_count: 0,
                following_count: 0,
            })
            .unwrap();

        let svc = service(&storage);
        assert!(svc.current_user().is_none());
        assert!(!svc.session().is_authenticated());
    }

    #[test]
    fn test_open_and_close_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SinigangConfig::default();
        config.storage.db_path = dir.path().join("db").to_string_lossy().into_owned();

        let mut svc = SocialService::open(&config).unwrap();
        let profile = svc.sign_up("u@x.com", "secret1", "Ann", "ann").unwrap();
        svc.close().unwrap();

        let svc = SocialService::open(&config).unwrap();
        assert_eq!(svc.current_user(), Some(&profile));
        assert_eq!(svc.accounts().len(), 1);
    }
}
