use super::model::Session;
use super::state::SessionState;
use crate::user::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

/// Exclusive handle on one user's session.
///
/// While a guard is alive no other event for the same user can read or
/// write that session. Guards for different users are independent.
pub type SessionGuard = OwnedMutexGuard<Session>;

/// In-memory store of per-user sessions.
///
/// The outer `RwLock` only guards the map shape; each session sits behind its
/// own mutex so handlers for different users never contend.
#[derive(Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<UserId, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    /// Creates a new empty SessionStore.
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, user_id: UserId) -> Arc<Mutex<Session>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(&user_id) {
                return session.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(Session::new())))
            .clone()
    }

    /// Locks the session of `user_id`, creating it in `Free` on first use.
    ///
    /// Waits for any other holder of the same user's session.
    pub async fn lock(&self, user_id: UserId) -> SessionGuard {
        self.entry(user_id).await.lock_owned().await
    }

    /// Returns the current state of `user_id`.
    pub async fn state(&self, user_id: UserId) -> SessionState {
        self.lock(user_id).await.state()
    }

    /// Returns a copy of the session of `user_id`.
    pub async fn snapshot(&self, user_id: UserId) -> Session {
        self.lock(user_id).await.clone()
    }

    /// Drops the session of `user_id` if it is idle and nobody else holds or
    /// waits for it. An idle session is indistinguishable from the one
    /// [`lock`](Self::lock) would create, so the map only keeps users that
    /// are mid-flow or have an active model.
    pub async fn evict_if_idle(&self, user_id: UserId) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get(&user_id) else {
            return false;
        };
        // Clones are only handed out under the map lock, so the count
        // cannot grow while we hold the write guard.
        if Arc::strong_count(session) > 1 {
            return false;
        }
        let idle = session.try_lock().is_ok_and(|s| s.is_idle());
        if idle {
            sessions.remove(&user_id);
            debug!(user_id = %user_id, live = sessions.len(), "Evicted idle session");
        }
        idle
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
