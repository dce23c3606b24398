pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod services;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use config::ClientConfig;
use errors::CoreError;
use http::{HttpClient, JournalApi, RestJournalApi};
use models::{notification::Notifier, session::Session, user::User};
use services::{
    mutation_service::MutationService,
    query_cache::QueryCache,
    route_guard::{GuardDecision, GuardWatcher, Route, RouteGuard},
    session_service::SessionStore,
    strategy_service::StrategyService,
    trade_service::TradeService,
};
use storage::TokenStore;

/// Main entry point for the Trade Journal client core.
/// Holds the session and every service a UI needs, all sharing one API
/// client, one query cache and one notifier.
#[must_use]
pub struct TradeJournal {
    session: SessionStore,
    trades: TradeService,
    strategies: StrategyService,
    cache: Arc<QueryCache>,
    mutations: Arc<MutationService>,
}

impl std::fmt::Debug for TradeJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeJournal")
            .field("session", &self.session)
            .field("cache", &self.cache)
            .field("mutations", &self.mutations)
            .finish()
    }
}

impl TradeJournal {
    /// Build a journal talking to the REST API described by `config`.
    pub fn connect(
        config: &ClientConfig,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        let http = HttpClient::new(config, tokens.clone())?;
        let api: Arc<dyn JournalApi> = Arc::new(RestJournalApi::new(http));
        Ok(Self::with_api(api, tokens, &config.token_key, notifier))
    }

    /// Build a journal over any `JournalApi` implementation.
    pub fn with_api(
        api: Arc<dyn JournalApi>,
        tokens: Arc<dyn TokenStore>,
        token_key: &str,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache = Arc::new(QueryCache::new());
        let mutations = Arc::new(MutationService::new(cache.clone(), notifier));
        let session = SessionStore::new(api.clone(), tokens, token_key).with_sign_out_hook({
            let cache = cache.clone();
            move || cache.clear()
        });
        Self {
            session,
            trades: TradeService::new(api.clone(), cache.clone(), mutations.clone()),
            strategies: StrategyService::new(api, cache.clone(), mutations.clone()),
            cache,
            mutations,
        }
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Resolve the persisted token, if any. Call once at startup.
    pub async fn start(&self) -> Session {
        self.session.restore().await
    }

    pub async fn login(&self, token: impl Into<String>) -> Result<User, CoreError> {
        self.session.login(token).await
    }

    /// Sign out. Every cached read of the previous user is forgotten, here
    /// and on a forced logout alike.
    pub fn logout(&self) {
        self.session.logout();
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // ── Navigation ──────────────────────────────────────────────────

    #[must_use]
    pub fn guard(&self, route: Route) -> GuardDecision {
        RouteGuard::check(route, &self.session.session())
    }

    pub fn watch_route(&self, route: Route) -> GuardWatcher {
        RouteGuard::watch(route, self.session.subscribe())
    }

    // ── Data ────────────────────────────────────────────────────────

    pub fn trades(&self) -> &TradeService {
        &self.trades
    }

    pub fn strategies(&self) -> &StrategyService {
        &self.strategies
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn mutations(&self) -> &MutationService {
        &self.mutations
    }
}
