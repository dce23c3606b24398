use super::user::User;

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// A persisted token was found at startup and its profile is being fetched.
    Resolving,
    /// A token was just handed to `login` and its profile has not arrived yet.
    Authenticating,
    /// Token and profile are both present.
    Authenticated,
    /// No token.
    Unauthenticated,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Resolving => write!(f, "Resolving"),
            SessionPhase::Authenticating => write!(f, "Authenticating"),
            SessionPhase::Authenticated => write!(f, "Authenticated"),
            SessionPhase::Unauthenticated => write!(f, "Unauthenticated"),
        }
    }
}

/// Snapshot of the client's identity and token state.
///
/// Invariant: `user.is_some()` implies `token.is_some()`.
/// `loading` is only true while the startup token is being resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
    pub loading: bool,
}

impl Session {
    /// Session with no identity and nothing pending.
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.token, &self.user, self.loading) {
            (_, _, true) => SessionPhase::Resolving,
            (None, _, false) => SessionPhase::Unauthenticated,
            (Some(_), Some(_), false) => SessionPhase::Authenticated,
            (Some(_), None, false) => SessionPhase::Authenticating,
        }
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase() == SessionPhase::Authenticated
    }
}
