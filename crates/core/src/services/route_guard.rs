use tokio::sync::watch;

use crate::models::session::Session;

/// Views of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Strategies,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/",
            Route::Strategies => "/strategies",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/" => Some(Route::Dashboard),
            "/strategies" => Some(Route::Strategies),
            _ => None,
        }
    }

    /// Protected views need a session token.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login | Route::Register)
    }
}

/// What to render for a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still resolving: show a neutral loading state, do not navigate.
    Loading,
    Allow,
    Redirect(Route),
}

/// Gates protected views on the session.
pub struct RouteGuard;

impl RouteGuard {
    pub fn check(route: Route, session: &Session) -> GuardDecision {
        if !route.is_protected() {
            return GuardDecision::Allow;
        }
        if session.loading {
            return GuardDecision::Loading;
        }
        if session.has_token() {
            GuardDecision::Allow
        } else {
            GuardDecision::Redirect(Route::Login)
        }
    }

    /// Follow `route`'s decision as the session changes.
    pub fn watch(route: Route, session: watch::Receiver<Session>) -> GuardWatcher {
        GuardWatcher { route, session }
    }
}

/// Re-evaluates one route's guard decision on every session change.
pub struct GuardWatcher {
    route: Route,
    session: watch::Receiver<Session>,
}

impl GuardWatcher {
    pub fn route(&self) -> Route {
        self.route
    }

    /// Decision for the latest session.
    pub fn current(&self) -> GuardDecision {
        RouteGuard::check(self.route, &self.session.borrow())
    }

    /// Wait for the next session change and return the new decision.
    /// `None` once the session store is gone.
    pub async fn changed(&mut self) -> Option<GuardDecision> {
        self.session.changed().await.ok()?;
        Some(RouteGuard::check(self.route, &self.session.borrow_and_update()))
    }
}
