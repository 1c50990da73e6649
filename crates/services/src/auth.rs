//! Identity of the signed-in user, as seen by quiz sessions.

use tokio::sync::watch;

use quiz_core::model::UserId;

/// Source of the current user identity.
///
/// Sessions read it once at start and react to changes through
/// [`subscribe`](AuthProvider::subscribe) rather than polling.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<UserId>;

    fn subscribe(&self) -> watch::Receiver<Option<UserId>>;
}

/// `AuthProvider` backed by a watch channel; sign-in and sign-out notify subscribers.
#[derive(Debug)]
pub struct WatchAuth {
    tx: watch::Sender<Option<UserId>>,
}

impl WatchAuth {
    #[must_use]
    pub fn new(initial: Option<UserId>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(None)
    }

    #[must_use]
    pub fn signed_in(user: UserId) -> Self {
        Self::new(Some(user))
    }

    pub fn sign_in(&self, user: UserId) {
        self.tx.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl AuthProvider for WatchAuth {
    fn current_user(&self) -> Option<UserId> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserId>> {
        self.tx.subscribe()
    }
}

/// What a live session must do after the identity changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityTransition {
    Stay,
    /// Leave the quiz screen; the session must not write for another identity.
    Redirect,
}

/// Decide how a session bound to `bound` reacts to `current`.
#[must_use]
pub fn identity_transition(bound: &UserId, current: Option<&UserId>) -> IdentityTransition {
    match current {
        Some(user) if user == bound => IdentityTransition::Stay,
        _ => IdentityTransition::Redirect,
    }
}
