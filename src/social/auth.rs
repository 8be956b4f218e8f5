//! Caller identity.
//!
//! Session tokens are handled elsewhere; the social layer only needs to
//! know who is calling.

use std::sync::RwLock;
use uuid::Uuid;

/// Source of the current caller's identity.
pub trait AuthContext: Send + Sync {
    /// The signed-in user, if any.
    fn current_user_id(&self) -> Option<Uuid>;
}

/// Auth context with a settable user, for embedding and tests.
#[derive(Debug, Default)]
pub struct StaticAuth {
    user: RwLock<Option<Uuid>>,
}

impl StaticAuth {
    /// Context signed in as `user`.
    pub fn signed_in(user: Uuid) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    /// Context with nobody signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: Uuid) {
        if let Ok(mut guard) = self.user.write() {
            *guard = Some(user);
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut guard) = self.user.write() {
            *guard = None;
        }
    }
}

impl AuthContext for StaticAuth {
    fn current_user_id(&self) -> Option<Uuid> {
        self.user.read().ok().and_then(|guard| *guard)
    }
}
