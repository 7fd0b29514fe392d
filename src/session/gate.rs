// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session gate: token-refresh bootstrap, account loading and route redirects.
//!
//! The gate is the single owner of [`SessionState`]. It performs:
//! - exactly one token refresh per session (the bootstrap)
//! - the account fetch, whenever the session is authorized
//! - redirect evaluation after every change to authorization, account or route
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! `.await`. Guards are checked and set inside one critical section before the
//! first suspension point, so concurrent callers cannot both pass them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::Result;
use crate::models::Account;
use crate::services::api::AuthApi;
use crate::session::navigator::{Navigator, Notifier};
use crate::session::routes::{route_path, RoutePolicy};

/// Notice shown when the backend rejects a logout.
pub const LOGOUT_FAILED: &str = "Failed to logout - Please try again";

/// Progress of the one-time token refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BootstrapState {
    #[default]
    Unchecked,
    Checking,
    /// Terminal; never re-run within a session
    Checked { authorized: bool },
}

/// Cached account, as far as the gate knows it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AccountState {
    /// Not fetched (session not authorized)
    #[default]
    Idle,
    /// Fetch in flight; redirects wait for it
    Loading,
    /// Fetch finished; `None` when it failed
    Loaded(Option<Account>),
}

/// Process-local session state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub bootstrap: BootstrapState,
    pub is_authorized: bool,
    pub account: AccountState,
    /// Route the router currently shows
    pub route: String,
    evaluating: bool,
    rerun_requested: bool,
    account_generation: u64,
}

impl SessionState {
    /// Whether the bootstrap refresh has resolved.
    pub fn is_auth_checked(&self) -> bool {
        matches!(self.bootstrap, BootstrapState::Checked { .. })
    }

    pub fn is_account_loading(&self) -> bool {
        self.account == AccountState::Loading
    }

    pub fn account(&self) -> Option<&Account> {
        match &self.account {
            AccountState::Loaded(account) => account.as_ref(),
            _ => None,
        }
    }
}

/// Session gate shared by the whole portal.
pub struct SessionGate {
    api: Arc<dyn AuthApi>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    policy: RoutePolicy,
    state: Mutex<SessionState>,
}

/// Releases the evaluation guard when a pass ends, including on cancellation.
struct EvaluationGuard<'a> {
    gate: &'a SessionGate,
}

impl Drop for EvaluationGuard<'_> {
    fn drop(&mut self) {
        self.gate.state().evaluating = false;
    }
}

impl SessionGate {
    /// Create a gate for a visitor currently on `initial_route`.
    pub fn new(
        api: Arc<dyn AuthApi>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        policy: RoutePolicy,
        initial_route: impl Into<String>,
    ) -> Self {
        let state = SessionState {
            route: initial_route.into(),
            ..SessionState::default()
        };

        Self {
            api,
            navigator,
            notifier,
            policy,
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ─── Accessors ───────────────────────────────────────────────

    pub fn is_authorized(&self) -> bool {
        self.state().is_authorized
    }

    pub fn is_auth_checked(&self) -> bool {
        self.state().is_auth_checked()
    }

    pub fn account(&self) -> Option<Account> {
        self.state().account().cloned()
    }

    pub fn current_route(&self) -> String {
        self.state().route.clone()
    }

    /// Whether pages may render: bootstrap resolved and no account fetch in flight.
    pub fn is_ready(&self) -> bool {
        let state = self.state();
        state.is_auth_checked() && !state.is_account_loading()
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    // ─── Bootstrap ───────────────────────────────────────────────

    /// Run the one-time token refresh.
    ///
    /// Returns `false` without touching the network when the bootstrap has
    /// already started, no matter how many callers race here.
    pub async fn bootstrap(&self) -> bool {
        {
            let mut state = self.state();
            if state.bootstrap != BootstrapState::Unchecked {
                tracing::debug!(bootstrap = ?state.bootstrap, "Bootstrap already started");
                return false;
            }
            state.bootstrap = BootstrapState::Checking;
        }

        let authorized = match self.api.refresh_token().await {
            Ok(refresh) if refresh.grants_session() => true,
            Ok(_) => {
                tracing::info!("Token refresh returned no expiry, treating as signed out");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, treating as signed out");
                false
            }
        };

        let fetch = {
            let mut state = self.state();
            // A login that completed meanwhile keeps its authorization.
            state.is_authorized |= authorized;
            state.bootstrap = BootstrapState::Checked { authorized };
            self.begin_account_fetch(&mut state)
        };

        tracing::info!(authorized, "Session bootstrap complete");

        self.evaluate().await;
        if let Some(generation) = fetch {
            self.complete_account_fetch(generation).await;
            self.evaluate().await;
        }

        true
    }

    // ─── Authorization ───────────────────────────────────────────

    /// Mark the session authorized after a successful login and load the account.
    pub async fn handle_authorized(&self) {
        let fetch = {
            let mut state = self.state();
            state.is_authorized = true;
            self.begin_account_fetch(&mut state)
        };

        tracing::info!("Session authorized");

        if let Some(generation) = fetch {
            self.complete_account_fetch(generation).await;
            self.evaluate().await;
        }
    }

    /// Replace the cached account with a fresher copy (e.g. after a profile update).
    pub fn replace_account(&self, account: Account) {
        let mut state = self.state();
        if !state.is_authorized {
            tracing::debug!("Ignoring account update for unauthorized session");
            return;
        }
        state.account_generation += 1;
        state.account = AccountState::Loaded(Some(account));
    }

    /// Log out on the backend, then reload the login page from scratch.
    ///
    /// # Errors
    ///
    /// Returns the backend error after showing a retry notice; the session is
    /// left untouched in that case.
    pub async fn handle_logout(&self) -> Result<()> {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "Logout failed");
            self.notifier.notify(LOGOUT_FAILED);
            return Err(e);
        }

        {
            let mut state = self.state();
            state.is_authorized = false;
            state.account = AccountState::Idle;
            state.account_generation += 1;
            state.route = self.policy.login_path.clone();
        }

        tracing::info!("Logged out");
        self.navigator.assign_location(&self.policy.login_path);
        Ok(())
    }

    /// Start an account fetch if the session is authorized and none is
    /// loaded or in flight. Returns the fetch generation to complete.
    fn begin_account_fetch(&self, state: &mut SessionState) -> Option<u64> {
        if !state.is_authorized {
            return None;
        }
        if matches!(
            state.account,
            AccountState::Loading | AccountState::Loaded(Some(_))
        ) {
            return None;
        }

        state.account = AccountState::Loading;
        state.account_generation += 1;
        Some(state.account_generation)
    }

    async fn complete_account_fetch(&self, generation: u64) {
        let result = self.api.get_me().await;

        let mut state = self.state();
        if state.account_generation != generation {
            tracing::debug!(generation, "Discarding superseded account fetch");
            return;
        }

        state.account = match result {
            Ok(account) => {
                tracing::info!(account_id = %account.id, "Account loaded");
                AccountState::Loaded(Some(account))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Account fetch failed");
                if e.is_unauthorized() {
                    state.is_authorized = false;
                }
                AccountState::Loaded(None)
            }
        };
    }

    // ─── Routing ─────────────────────────────────────────────────

    /// Record a route change made by the router and re-evaluate.
    pub async fn set_route(&self, route: impl Into<String>) -> Option<String> {
        self.state().route = route.into();
        self.evaluate().await
    }

    /// Navigate in-app and re-evaluate on arrival.
    pub async fn navigate(&self, to: &str) -> Option<String> {
        self.navigator.navigate(to).await;
        self.set_route(to).await
    }

    /// Apply the redirect policy to the current state.
    ///
    /// At most one navigation is in flight at a time. A call arriving during a
    /// pass is folded into one extra pass after it. Returns the last redirect
    /// target, if any.
    pub async fn evaluate(&self) -> Option<String> {
        let mut redirected = None;

        loop {
            let (target, evaluated_route) = {
                let mut state = self.state();
                if state.evaluating {
                    state.rerun_requested = true;
                    return redirected;
                }
                state.evaluating = true;
                state.rerun_requested = false;
                (self.pending_redirect(&state), state.route.clone())
            };

            {
                let _guard = EvaluationGuard { gate: self };
                if let Some(target) = target {
                    tracing::info!(to = %target, "Session gate redirect");
                    self.navigator.navigate(&target).await;

                    // A route recorded while navigating is newer than the redirect.
                    let mut state = self.state();
                    if state.route == evaluated_route {
                        state.route = target.clone();
                    }
                    drop(state);

                    redirected = Some(target);
                }
            }

            if !self.state().rerun_requested {
                return redirected;
            }
        }
    }

    fn pending_redirect(&self, state: &SessionState) -> Option<String> {
        if !state.is_auth_checked() {
            return None;
        }

        let logged_in = match &state.account {
            AccountState::Loading => return None,
            AccountState::Loaded(Some(_)) => true,
            AccountState::Idle | AccountState::Loaded(None) => false,
        };

        let target = self.policy.redirect_for(logged_in, &state.route)?;
        if route_path(target) == route_path(&state.route) {
            return None;
        }
        Some(target.to_string())
    }
}
