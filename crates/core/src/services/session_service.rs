use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::http::JournalApi;
use crate::models::session::Session;
use crate::models::user::User;
use crate::storage::TokenStore;

/// Owns the client's identity: the persisted token and the profile fetched for it.
///
/// Lifecycle:
/// - construction reads the persisted token; with one present the session
///   starts `loading` until `restore` resolves it.
/// - `login` persists a token and fetches its profile.
/// - a failed profile fetch for the current token forces a logout; this is
///   the only automatic logout.
/// - `logout` clears everything immediately, without a server call.
///
/// Changes are published on a `watch` channel so route guards can follow them.
pub struct SessionStore {
    api: Arc<dyn JournalApi>,
    tokens: Arc<dyn TokenStore>,
    token_key: String,
    state: watch::Sender<Session>,
    on_sign_out: Option<SignOutHook>,
}

/// Runs after every logout, forced or not, once the session is cleared.
pub type SignOutHook = Box<dyn Fn() + Send + Sync>;

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.state.borrow();
        f.debug_struct("SessionStore")
            .field("phase", &session.phase())
            .field("token_key", &self.token_key)
            .finish()
    }
}

impl SessionStore {
    pub fn new(api: Arc<dyn JournalApi>, tokens: Arc<dyn TokenStore>, token_key: impl Into<String>) -> Self {
        let token_key = token_key.into();
        let persisted = tokens.get(&token_key).unwrap_or_else(|e| {
            warn!(error = %e, "could not read persisted token; starting signed out");
            None
        });
        let session = Session {
            user: None,
            loading: persisted.is_some(),
            token: persisted,
        };
        let (state, _) = watch::channel(session);
        Self {
            api,
            tokens,
            token_key,
            state,
            on_sign_out: None,
        }
    }

    /// Register `hook` to run after every logout, including the one forced
    /// by a failed profile fetch.
    pub fn with_sign_out_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_sign_out = Some(Box::new(hook));
        self
    }

    /// Current snapshot.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that sees every subsequent session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Resolve the token found at startup into a profile.
    ///
    /// A no-op when there was no persisted token or it was already resolved.
    pub async fn restore(&self) -> Session {
        let pending = {
            let session = self.state.borrow();
            match (&session.token, session.loading) {
                (Some(token), true) => Some(token.clone()),
                _ => None,
            }
        };
        if let Some(token) = pending {
            debug!("resolving persisted token");
            // Failure already reverted the session; the snapshot below shows it.
            let _ = self.resolve(&token).await;
        }
        self.session()
    }

    /// Persist `token`, make it current, then fetch its profile.
    ///
    /// The request for `/auth/me` carries the new token because it is
    /// persisted before the fetch starts.
    pub async fn login(&self, token: impl Into<String>) -> Result<User, CoreError> {
        let token = token.into();
        self.tokens.set(&self.token_key, &token)?;
        self.state.send_modify(|s| {
            s.token = Some(token.clone());
            s.user = None;
            s.loading = false;
        });
        self.resolve(&token).await
    }

    /// Clear user and token from memory and storage. Takes effect at once.
    pub fn logout(&self) {
        if let Err(e) = self.tokens.remove(&self.token_key) {
            warn!(error = %e, "could not remove persisted token");
        }
        self.state.send_modify(|s| *s = Session::unauthenticated());
        if let Some(hook) = &self.on_sign_out {
            hook();
        }
        info!("signed out");
    }

    /// Re-fetch the profile of the current token (manual refresh).
    pub async fn refresh_profile(&self) -> Result<User, CoreError> {
        let token = self.state.borrow().token.clone();
        match token {
            Some(token) => self.resolve(&token).await,
            None => Err(CoreError::Unauthorized),
        }
    }

    /// Fetch the profile for `token` and apply the outcome, unless a logout
    /// or another login replaced the token meanwhile.
    async fn resolve(&self, token: &str) -> Result<User, CoreError> {
        match self.api.current_user().await {
            Ok(user) => {
                let applied = self.state.send_if_modified(|s| {
                    if s.token.as_deref() != Some(token) {
                        return false;
                    }
                    s.user = Some(user.clone());
                    s.loading = false;
                    true
                });
                if applied {
                    info!(user = %user.username, "signed in");
                } else {
                    debug!("profile arrived for a replaced token; ignored");
                }
                Ok(user)
            }
            Err(e) => {
                let current = self.state.borrow().token.as_deref() == Some(token);
                if current {
                    warn!(error = %e, "profile fetch failed; signing out");
                    self.logout();
                } else {
                    debug!(error = %e, "profile fetch failed for a replaced token");
                }
                Err(e)
            }
        }
    }
}
