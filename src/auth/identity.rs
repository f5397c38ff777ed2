//! Identity provider adapter.
//!
//! The pool never manages credentials itself: an external provider yields
//! the current caller's stable identity (id + display name + email) or
//! "anonymous." [`LocalIdentityProvider`] is the in-process implementation
//! used by tests and local tooling.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// A signed-in caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identifier assigned by the provider.
    pub id: String,
    /// Human-readable label, snapshotted into claims at claim time.
    pub display_name: String,
    /// Email address, compared against the administrator policy.
    pub email: String,
}

impl Identity {
    /// Create an identity.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email: email.into(),
        }
    }
}

/// Current authentication state of a client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthState {
    /// No caller is signed in.
    #[default]
    Anonymous,
    /// A caller is signed in.
    SignedIn(Identity),
}

impl AuthState {
    /// The signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Anonymous => None,
            AuthState::SignedIn(identity) => Some(identity),
        }
    }
}

/// Sign-in failure from the external provider.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The provider rejected or aborted the sign-in attempt.
    #[error("sign-in failed: {0}")]
    SignInFailed(String),
}

/// Callback invoked with the new state whenever the identity changes.
pub type IdentityCallback = Box<dyn Fn(&AuthState) + Send + Sync>;

/// External identity provider.
///
/// Listeners registered via `on_identity_change` receive the current state
/// immediately and again after every change, mirroring the store adapter's
/// full-snapshot delivery.
pub trait IdentityProvider: Send + Sync {
    /// Sign the client in, returning the resulting identity.
    fn sign_in(&self) -> Result<Identity, AuthError>;

    /// Sign the client out. Signing out while anonymous is a no-op.
    fn sign_out(&self);

    /// The current authentication state.
    fn current(&self) -> AuthState;

    /// Register a listener for identity changes.
    fn on_identity_change(&self, callback: IdentityCallback);
}

type ListenerFn = dyn Fn(&AuthState) + Send + Sync;

struct LocalInner {
    state: AuthState,
    listeners: Vec<Arc<ListenerFn>>,
}

/// In-process provider backed by one fixed identity.
///
/// `sign_in` always succeeds with the configured identity; `sign_out`
/// returns to anonymous. Listeners fire on every state flip.
pub struct LocalIdentityProvider {
    identity: Identity,
    inner: Mutex<LocalInner>,
}

impl LocalIdentityProvider {
    /// Create a signed-out provider for `identity`.
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            inner: Mutex::new(LocalInner {
                state: AuthState::Anonymous,
                listeners: Vec::new(),
            }),
        }
    }

    /// Create a provider already signed in as `identity`.
    #[must_use]
    pub fn signed_in(identity: Identity) -> Self {
        let provider = Self::new(identity.clone());
        provider.lock().state = AuthState::SignedIn(identity);
        provider
    }

    fn lock(&self) -> MutexGuard<'_, LocalInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(&self, state: AuthState) {
        let (listeners, state) = {
            let mut inner = self.lock();
            if inner.state == state {
                return;
            }
            inner.state = state.clone();
            (inner.listeners.clone(), state)
        };
        for listener in &listeners {
            listener(&state);
        }
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn sign_in(&self) -> Result<Identity, AuthError> {
        self.transition(AuthState::SignedIn(self.identity.clone()));
        Ok(self.identity.clone())
    }

    fn sign_out(&self) {
        self.transition(AuthState::Anonymous);
    }

    fn current(&self) -> AuthState {
        self.lock().state.clone()
    }

    fn on_identity_change(&self, callback: IdentityCallback) {
        let callback: Arc<ListenerFn> = Arc::from(callback);
        let state = {
            let mut inner = self.lock();
            inner.listeners.push(Arc::clone(&callback));
            inner.state.clone()
        };
        callback(&state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn alice() -> Identity {
        Identity::new("u-alice", "Alice Johnson", "alice@example.com")
    }

    #[test]
    fn test_sign_in_and_out() {
        let provider = LocalIdentityProvider::new(alice());
        assert_eq!(provider.current(), AuthState::Anonymous);

        let identity = provider.sign_in().unwrap();
        assert_eq!(identity, alice());
        assert_eq!(provider.current(), AuthState::SignedIn(alice()));

        provider.sign_out();
        assert_eq!(provider.current(), AuthState::Anonymous);
    }

    #[test]
    fn test_listeners_get_initial_state_and_changes() {
        let provider = LocalIdentityProvider::new(alice());
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = Arc::clone(&fired);
            provider.on_identity_change(Box::new(move |_| {
                fired.fetch_add(1, Ordering::SeqCst);
            }));
        }
        assert_eq!(fired.load(Ordering::SeqCst), 1); // initial delivery

        provider.sign_in().unwrap();
        provider.sign_in().unwrap(); // no change, no delivery
        provider.sign_out();
        assert_eq!(fired.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_signed_in_constructor() {
        let provider = LocalIdentityProvider::signed_in(alice());
        assert_eq!(provider.current().identity(), Some(&alice()));
    }
}
