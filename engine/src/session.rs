//! Session context and the root entry gate.
//!
//! The identity provider is an external collaborator. Whatever it produced
//! reaches the engine as a [`Session`] value passed in explicitly; nothing in
//! the engine looks credentials up on its own.

use slate_types::{Credential, SubjectId};

use crate::route::Route;

/// Source of the caller's identity and bearer credential.
pub trait Session: Send + Sync {
    /// Authenticated user, or `None` when signed out.
    fn subject(&self) -> Option<&SubjectId>;

    /// Current bearer credential. Called once per request.
    fn credential(&self) -> Option<Credential>;

    fn is_signed_in(&self) -> bool {
        self.subject().is_some()
    }
}

/// Session fixed at startup, typically from config or environment.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    subject: Option<SubjectId>,
    credential: Option<Credential>,
}

impl StaticSession {
    #[must_use]
    pub fn new(subject: Option<SubjectId>, credential: Option<Credential>) -> Self {
        Self {
            subject,
            credential,
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl Session for StaticSession {
    fn subject(&self) -> Option<&SubjectId> {
        self.subject.as_ref()
    }

    fn credential(&self) -> Option<Credential> {
        self.credential.clone()
    }
}

/// Decide where a visit to the root lands.
///
/// Signed-in callers go to the project listing; everyone else goes to sign-in.
#[must_use]
pub fn bootstrap(session: &dyn Session) -> Route {
    if session.is_signed_in() {
        Route::Projects
    } else {
        Route::SignIn
    }
}
