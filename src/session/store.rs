//! Durable `{token, user}` store with change notifications.
//!
//! The store is a cheap handle; clones share state. Every mutation is written
//! through to the session file (when one is configured) and published to all
//! subscribers, so a screen showing the user's score re-reads it on change
//! instead of polling the file.
//!
//! Other processes (a `quiz logout` in another terminal) share the file.
//! Profile and score updates re-read it first and are dropped when the session
//! on disk is no longer the one this store held.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::StoreError;
use crate::models::User;
use crate::quiz::ScoreLedger;

/// Persisted document: exactly the `token` and `user` keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub token: Option<String>,
    pub user: Option<User>,
}

impl SessionSnapshot {
    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }
}

struct Inner {
    path: Option<PathBuf>,
    state: watch::Sender<SessionSnapshot>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Open the store backed by `path`. A missing file is an empty session;
    /// an unreadable document is discarded with a warning.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = read_snapshot(&path)?;
        Ok(Self::with_snapshot(Some(path), snapshot))
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::with_snapshot(None, SessionSnapshot::default())
    }

    fn with_snapshot(path: Option<PathBuf>, snapshot: SessionSnapshot) -> Self {
        let (state, _) = watch::channel(snapshot);
        Self {
            inner: Arc::new(Inner { path, state }),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn get_token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    pub fn get_user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.state.borrow().is_signed_in()
    }

    /// Receive every subsequent change. The current value is marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn sign_in(&self, token: String, user: User) -> Result<(), StoreError> {
        debug!("Signing in user {}", user.id);
        self.update(|snapshot| {
            snapshot.token = Some(token);
            snapshot.user = Some(user);
        })
    }

    /// Replace the profile of the session this store holds. Skipped when the
    /// session was ended or replaced by another process in the meantime.
    pub fn set_user(&self, user: User) -> Result<(), StoreError> {
        if !self.refresh()? {
            warn!("Session changed on disk, not updating user {}", user.id);
            return Ok(());
        }
        self.update(|snapshot| snapshot.user = Some(user))
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        debug!("Clearing session");
        self.inner.state.send_replace(SessionSnapshot::default());
        match &self.inner.path {
            Some(path) => match fs::remove_file(path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(StoreError::Io {
                    path: path.clone(),
                    source,
                }),
            },
            None => Ok(()),
        }
    }

    fn update(&self, modify: impl FnOnce(&mut SessionSnapshot)) -> Result<(), StoreError> {
        self.inner.state.send_modify(modify);
        self.persist()
    }

    /// Adopt the session file if another process rewrote it, publishing the
    /// change. Returns false when the token this store held is no longer the
    /// one on disk.
    fn refresh(&self) -> Result<bool, StoreError> {
        let Some(path) = &self.inner.path else {
            return Ok(true);
        };
        let on_disk = read_snapshot(path)?;
        let same_session = on_disk.token == self.get_token();

        self.inner.state.send_if_modified(|current| {
            if *current == on_disk {
                false
            } else {
                debug!("Session file changed by another process");
                *current = on_disk;
                true
            }
        });
        Ok(same_session)
    }

    fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        let json = serde_json::to_vec_pretty(&*self.inner.state.borrow())
            .map_err(|err| io_err(io::Error::other(err)))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)
    }
}

/// Missing file is an empty session; an unreadable document is discarded with
/// a warning.
fn read_snapshot(path: &Path) -> Result<SessionSnapshot, StoreError> {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice::<SessionSnapshot>(&bytes) {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                warn!("Ignoring invalid session file {}: {}", path.display(), err);
                Ok(SessionSnapshot::default())
            }
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(SessionSnapshot::default()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl ScoreLedger for SessionStore {
    fn credit(&self, points: u32) -> Result<(), StoreError> {
        if !self.refresh()? {
            warn!("Session changed on disk, dropping {} points", points);
            return Ok(());
        }

        let mut credited = false;
        self.inner.state.send_if_modified(|snapshot| match &mut snapshot.user {
            Some(user) => {
                user.score = user.score.saturating_add(points);
                credited = true;
                true
            }
            None => false,
        });

        if credited {
            debug!("Credited {} points", points);
            self.persist()
        } else {
            warn!("No signed-in user to credit {} points to", points);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn user(score: u32) -> User {
        User {
            id: 1,
            email: "sam@example.com".to_string(),
            first_name: "Sam".to_string(),
            last_name: "Wilson".to_string(),
            roles: vec!["ROLE_USER".to_string()],
            score,
            avatar_color: None,
        }
    }

    fn temp_path() -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("quiz-session-{}-{}.json", std::process::id(), n))
    }

    #[test]
    fn test_round_trip_through_file() {
        let path = temp_path();
        let store = SessionStore::open(&path).unwrap();
        assert!(!store.is_signed_in());

        store.sign_in("token-1".to_string(), user(40)).unwrap();

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.get_token().as_deref(), Some("token-1"));
        assert_eq!(reopened.get_user().unwrap().score, 40);

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        let keys: Vec<_> = raw.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["token".to_string(), "user".to_string()]);

        reopened.clear().unwrap();
        assert!(!path.exists());
        assert!(SessionStore::open(&path).unwrap().get_user().is_none());
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let path = temp_path();
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::open(&path).unwrap();
        assert_eq!(store.snapshot(), SessionSnapshot::default());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_credit_adds_points() {
        let store = SessionStore::in_memory();
        store.credit(20).unwrap();
        assert!(store.get_user().is_none());

        store.sign_in("t".to_string(), user(100)).unwrap();
        store.credit(20).unwrap();
        assert_eq!(store.get_user().unwrap().score, 120);
    }

    #[test]
    fn test_set_user_keeps_token() {
        let store = SessionStore::in_memory();
        store.sign_in("t".to_string(), user(5)).unwrap();

        let mut renamed = user(5);
        renamed.first_name = "Samantha".to_string();
        store.set_user(renamed).unwrap();

        assert_eq!(store.get_token().as_deref(), Some("t"));
        assert_eq!(store.get_user().unwrap().display_name(), "Samantha Wilson");
    }

    #[test]
    fn test_credit_after_logout_elsewhere_keeps_logout() {
        let path = temp_path();
        let tui = SessionStore::open(&path).unwrap();
        tui.sign_in("tok".to_string(), user(10)).unwrap();
        let mut changes = tui.subscribe();

        SessionStore::open(&path).unwrap().clear().unwrap();
        tui.credit(20).unwrap();

        assert!(!path.exists());
        assert!(SessionStore::open(&path).unwrap().get_token().is_none());
        assert!(!tui.is_signed_in());
        assert!(changes.has_changed().unwrap());
    }

    #[test]
    fn test_credit_after_login_elsewhere_keeps_new_session() {
        let path = temp_path();
        let tui = SessionStore::open(&path).unwrap();
        tui.sign_in("tok".to_string(), user(10)).unwrap();

        let mut other = user(300);
        other.id = 2;
        SessionStore::open(&path)
            .unwrap()
            .sign_in("tok-2".to_string(), other)
            .unwrap();
        tui.credit(20).unwrap();

        let reopened = SessionStore::open(&path).unwrap();
        assert_eq!(reopened.get_token().as_deref(), Some("tok-2"));
        assert_eq!(reopened.get_user().unwrap().score, 300);
        assert_eq!(tui.get_user().unwrap().id, 2);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_credits_from_two_processes_add_up() {
        let path = temp_path();
        let first = SessionStore::open(&path).unwrap();
        first.sign_in("tok".to_string(), user(0)).unwrap();
        let second = SessionStore::open(&path).unwrap();

        second.credit(10).unwrap();
        first.credit(20).unwrap();

        assert_eq!(SessionStore::open(&path).unwrap().get_user().unwrap().score, 30);
        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = SessionStore::in_memory();
        let mut rx = store.subscribe();

        store.sign_in("t".to_string(), user(0)).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_signed_in());

        let other = store.clone();
        other.clear().unwrap();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_signed_in());
    }
}
