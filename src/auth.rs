use serde::{Deserialize, Serialize};
use std::{env, sync::Arc};
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

/// Session source. Sign-in happens in the browser; the page reports the
/// result here and subscribers are told whenever it changes.
#[derive(Clone)]
pub struct AuthProvider {
    sender: Arc<watch::Sender<Option<AuthUser>>>,
}

impl AuthProvider {
    pub fn new(initial: Option<AuthUser>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Reads `APP_USER` (and optionally `APP_USER_EMAIL`) as an already
    /// signed-in local user.
    pub fn from_env() -> Self {
        let user = env::var("APP_USER")
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .map(|id| AuthUser {
                id,
                email: env::var("APP_USER_EMAIL").ok().filter(|e| !e.trim().is_empty()),
            });
        Self::new(user)
    }

    pub fn current_session(&self) -> Option<AuthUser> {
        self.sender.borrow().clone()
    }

    /// Change stream for the lifetime of the provider. The value current at
    /// subscription time counts as already seen.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.sender.subscribe()
    }

    pub fn sign_in(&self, user: AuthUser) {
        self.publish(Some(user));
    }

    pub fn sign_out(&self) {
        self.publish(None);
    }

    fn publish(&self, next: Option<AuthUser>) {
        let changed = self.sender.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        if changed {
            info!("auth session changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_email() {
        let mut user = AuthUser::new("u-1");
        assert_eq!(user.display_name(), "u-1");
        user.email = Some("olena@example.com".to_string());
        assert_eq!(user.display_name(), "olena@example.com");
    }

    #[tokio::test]
    async fn subscribers_see_changes_only() {
        let provider = AuthProvider::new(None);
        let mut changes = provider.subscribe();
        assert!(!changes.has_changed().unwrap());

        provider.sign_in(AuthUser::new("u-1"));
        changes.changed().await.unwrap();
        assert_eq!(changes.borrow_and_update().clone(), Some(AuthUser::new("u-1")));

        provider.sign_in(AuthUser::new("u-1"));
        assert!(!changes.has_changed().unwrap());

        provider.sign_out();
        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), None);
        assert_eq!(provider.current_session(), None);
    }
}
