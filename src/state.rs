use crate::auth::{AuthProvider, AuthUser};
use crate::session::Session;
use crate::storage::Storage;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub auth: AuthProvider,
    pub session: Arc<Mutex<Option<Session>>>,
}

impl AppState {
    pub fn new(storage: Storage, auth: AuthProvider) -> Self {
        Self {
            storage,
            auth,
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// Opens a session for a newly reported user or drops the current one.
    pub async fn apply_user(&self, user: Option<AuthUser>) {
        let mut session = self.session.lock().await;
        match user {
            Some(user) => {
                if session.as_ref().is_some_and(|current| current.user() == &user) {
                    return;
                }
                *session = Some(self.storage.open_session(user).await);
            }
            None => {
                if let Some(closed) = session.take() {
                    info!(user = %closed.user().id, "session closed");
                }
            }
        }
    }

    /// Reacts to every session change reported by the auth provider until the
    /// provider goes away.
    pub async fn follow_auth(self, mut changes: watch::Receiver<Option<AuthUser>>) {
        while changes.changed().await.is_ok() {
            let user = changes.borrow_and_update().clone();
            self.apply_user(user).await;
        }
    }
}
