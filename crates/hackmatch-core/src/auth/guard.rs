//! Per-navigation authorization decisions.
//!
//! A guard pass has two halves:
//!
//! 1. `evaluate`: a pure function of the stored tokens and the current time.
//!    It never touches the network and its result gates the first render.
//! 2. When the access token has already expired, a single refresh attempt
//!    using the stored refresh token.
//!
//! After the first render a screen may start a background revalidation
//! (`SessionGuard::spawn_revalidation`). It runs once after a short delay and
//! reports through a callback; the returned handle cancels it on drop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ApiError;

use super::jwt::{AccessClaims, TokenError};
use super::tokens::{TokenPair, TokenStore};

/// Default delay before the background revalidation pass
pub const DEFAULT_REVALIDATION_DELAY_MS: u64 = 100;

/// Exchanges a refresh token for a new access token.
pub trait TokenRefresher: Send + Sync {
    fn refresh(&self, refresh_token: &str) -> impl Future<Output = Result<String, ApiError>> + Send;
}

/// Outcome of evaluating a session, as seen by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Unauthenticated,
    Authenticated,
    /// The view is rendered and a background refresh is in flight
    PendingRevalidation,
}

impl AuthDecision {
    /// Protected content renders for `Authenticated` and
    /// `PendingRevalidation`, never for `Unauthenticated`.
    pub fn allows_render(&self) -> bool {
        !matches!(self, AuthDecision::Unauthenticated)
    }
}

/// Guard state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    CheckingSync,
    RefreshingFromExpired,
    Authenticated,
    Unauthenticated,
}

/// Why a session was rejected. Logged, never shown as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    MissingTokens,
    MalformedToken(TokenError),
    RefreshFailed(String),
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenyReason::MissingTokens => write!(f, "no stored session"),
            DenyReason::MalformedToken(e) => write!(f, "{}", e),
            DenyReason::RefreshFailed(e) => write!(f, "refresh failed: {}", e),
        }
    }
}

/// Result of the synchronous, storage-only check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Authenticated(AccessClaims),
    /// Access token expired; a refresh with the contained token is required
    Expired { refresh_token: String },
    Unauthenticated(DenyReason),
}

impl SyncOutcome {
    /// The decision that gates the first render. An expired token does not
    /// render until its refresh succeeds.
    pub fn decision(&self) -> AuthDecision {
        match self {
            SyncOutcome::Authenticated(_) => AuthDecision::Authenticated,
            SyncOutcome::Expired { .. } | SyncOutcome::Unauthenticated(_) => {
                AuthDecision::Unauthenticated
            }
        }
    }

    pub fn next_state(&self) -> GuardState {
        match self {
            SyncOutcome::Authenticated(_) => GuardState::Authenticated,
            SyncOutcome::Expired { .. } => GuardState::RefreshingFromExpired,
            SyncOutcome::Unauthenticated(_) => GuardState::Unauthenticated,
        }
    }
}

/// Decide from a token snapshot alone. No I/O.
pub fn evaluate(tokens: &TokenPair, now: DateTime<Utc>) -> SyncOutcome {
    let Some((access, refresh)) = tokens.halves() else {
        return SyncOutcome::Unauthenticated(DenyReason::MissingTokens);
    };

    match AccessClaims::decode(access) {
        Ok(claims) if claims.is_expired_at(now) => SyncOutcome::Expired {
            refresh_token: refresh.to_string(),
        },
        Ok(claims) => SyncOutcome::Authenticated(claims),
        Err(e) => SyncOutcome::Unauthenticated(DenyReason::MalformedToken(e)),
    }
}

/// Record of one complete guard pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPass {
    /// Decision that gated the first render
    pub initial: AuthDecision,
    /// Decision after any refresh completed
    pub decision: AuthDecision,
    /// States visited, in order, starting at `CheckingSync`
    pub trail: Vec<GuardState>,
    pub deny_reason: Option<DenyReason>,
}

impl GuardPass {
    pub fn final_state(&self) -> GuardState {
        self.trail.last().copied().unwrap_or(GuardState::Idle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardConfig {
    pub revalidation_delay: Duration,
    /// Whether a failed background revalidation demotes an already rendered
    /// view to `Unauthenticated`
    pub revalidation_demotes: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            revalidation_delay: Duration::from_millis(DEFAULT_REVALIDATION_DELAY_MS),
            revalidation_demotes: true,
        }
    }
}

/// Session guard bound to a token store and a refresher.
///
/// Cloning is cheap; clones share the store and refresher but track their
/// own state, so concurrent passes are independent.
pub struct SessionGuard<R> {
    store: Arc<dyn TokenStore>,
    refresher: Arc<R>,
    config: GuardConfig,
    state: GuardState,
}

impl<R> Clone for SessionGuard<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            refresher: Arc::clone(&self.refresher),
            config: self.config,
            state: self.state,
        }
    }
}

impl<R: TokenRefresher + 'static> SessionGuard<R> {
    pub fn new(store: Arc<dyn TokenStore>, refresher: Arc<R>, config: GuardConfig) -> Self {
        Self {
            store,
            refresher,
            config,
            state: GuardState::Idle,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn config(&self) -> GuardConfig {
        self.config
    }

    /// Synchronous half of a pass: read the store and decide.
    pub fn check_sync(&mut self, now: DateTime<Utc>) -> SyncOutcome {
        self.state = GuardState::CheckingSync;
        let outcome = evaluate(&self.store.get(), now);
        self.state = outcome.next_state();
        debug!(state = ?self.state, "Synchronous session check");
        outcome
    }

    /// Exchange `refresh_token` for a new access token and store it.
    /// Failures are not retried and do not clear the store.
    pub async fn refresh_expired(&mut self, refresh_token: &str) -> Result<(), DenyReason> {
        self.state = GuardState::RefreshingFromExpired;
        match refresh_and_store(self.store.as_ref(), self.refresher.as_ref(), refresh_token).await {
            Ok(()) => {
                self.state = GuardState::Authenticated;
                Ok(())
            }
            Err(reason) => {
                self.state = GuardState::Unauthenticated;
                Err(reason)
            }
        }
    }

    /// Full pass: synchronous decision, then a refresh if the access token
    /// had expired.
    pub async fn check(&mut self, now: DateTime<Utc>) -> GuardPass {
        let outcome = self.check_sync(now);
        let initial = outcome.decision();
        let mut trail = vec![GuardState::CheckingSync, outcome.next_state()];

        match outcome {
            SyncOutcome::Authenticated(_) => GuardPass {
                initial,
                decision: AuthDecision::Authenticated,
                trail,
                deny_reason: None,
            },
            SyncOutcome::Unauthenticated(reason) => GuardPass {
                initial,
                decision: AuthDecision::Unauthenticated,
                trail,
                deny_reason: Some(reason),
            },
            SyncOutcome::Expired { refresh_token } => {
                let result = self.refresh_expired(&refresh_token).await;
                trail.push(self.state);
                match result {
                    Ok(()) => GuardPass {
                        initial,
                        decision: AuthDecision::Authenticated,
                        trail,
                        deny_reason: None,
                    },
                    Err(reason) => GuardPass {
                        initial,
                        decision: AuthDecision::Unauthenticated,
                        trail,
                        deny_reason: Some(reason),
                    },
                }
            }
        }
    }

    /// Schedule the best-effort revalidation pass for an already rendered
    /// view. `notify` receives every decision change; nothing is reported
    /// when the token is still valid. Dropping the handle cancels the pass.
    pub fn spawn_revalidation<F>(&self, notify: F) -> RevalidationHandle
    where
        F: Fn(AuthDecision) + Send + Sync + 'static,
    {
        let store = Arc::clone(&self.store);
        let refresher = Arc::clone(&self.refresher);
        let config = self.config;

        let task = tokio::spawn(async move {
            tokio::time::sleep(config.revalidation_delay).await;
            revalidate(store.as_ref(), refresher.as_ref(), config, Utc::now(), notify).await;
        });

        RevalidationHandle { task }
    }
}

async fn refresh_and_store<R: TokenRefresher>(
    store: &dyn TokenStore,
    refresher: &R,
    refresh_token: &str,
) -> Result<(), DenyReason> {
    match refresher.refresh(refresh_token).await {
        Ok(access) => {
            store.set_access(&access);
            info!("Access token refreshed");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Token refresh failed");
            Err(DenyReason::RefreshFailed(e.to_string()))
        }
    }
}

async fn revalidate<R, F>(
    store: &dyn TokenStore,
    refresher: &R,
    config: GuardConfig,
    now: DateTime<Utc>,
    notify: F,
) where
    R: TokenRefresher,
    F: Fn(AuthDecision),
{
    // With demotion disabled a failure restores the decision the view was
    // rendered under.
    let on_failure = if config.revalidation_demotes {
        AuthDecision::Unauthenticated
    } else {
        AuthDecision::Authenticated
    };

    match evaluate(&store.get(), now) {
        SyncOutcome::Authenticated(_) => {
            debug!("Revalidation: access token still valid");
        }
        SyncOutcome::Expired { refresh_token } => {
            notify(AuthDecision::PendingRevalidation);
            match refresh_and_store(store, refresher, &refresh_token).await {
                Ok(()) => notify(AuthDecision::Authenticated),
                Err(reason) => {
                    warn!(%reason, demote = config.revalidation_demotes, "Revalidation failed");
                    notify(on_failure);
                }
            }
        }
        SyncOutcome::Unauthenticated(reason) => {
            warn!(%reason, demote = config.revalidation_demotes, "Revalidation found no usable session");
            if config.revalidation_demotes {
                notify(AuthDecision::Unauthenticated);
            }
        }
    }
}

/// Owns a scheduled revalidation. Dropping it aborts the pass if it has not
/// finished yet.
#[derive(Debug)]
pub struct RevalidationHandle {
    task: JoinHandle<()>,
}

impl RevalidationHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RevalidationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
