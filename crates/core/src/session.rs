//! Session abstractions
//!
//! The identity of the signed-in user is handed to whoever needs it
//! through a [`SessionProvider`], never read from global state.

use crate::models::Identity;

/// Supplies the identity of the current user, if any
pub trait SessionProvider: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;

    fn is_authenticated(&self) -> bool {
        self.current_identity().is_some()
    }
}

/// A fixed identity (or none), for flows that are handed one explicitly
#[derive(Debug, Clone, Default)]
pub struct FixedSession(pub Option<Identity>);

impl FixedSession {
    pub fn signed_in(identity: Identity) -> Self {
        Self(Some(identity))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl SessionProvider for FixedSession {
    fn current_identity(&self) -> Option<Identity> {
        self.0.clone()
    }
}
