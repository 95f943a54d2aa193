//! Post-authentication destination choice.
//!
//! This is the only place that maps profile existence/type to a first
//! screen. The `/` route, password login and code login all delegate here.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::models::{Profile, ProfileKind};
use crate::route::Route;

use super::tokens::TokenStore;

/// Fetches the current user's profile.
pub trait ProfileSource: Send + Sync {
    fn fetch_profile(&self) -> impl Future<Output = Result<Profile, ApiError>> + Send;
}

/// Where to go, plus what was learned on the way.
#[derive(Debug, Clone)]
pub struct Landing {
    pub route: Route,
    pub kind: Option<ProfileKind>,
    /// Present when the profile fetch succeeded, so the destination screen
    /// does not need to fetch it again
    pub profile: Option<Profile>,
}

impl Landing {
    fn login() -> Self {
        Self {
            route: Route::Login,
            kind: None,
            profile: None,
        }
    }
}

pub struct LandingRouter<P> {
    store: Arc<dyn TokenStore>,
    source: Arc<P>,
}

impl<P> Clone for LandingRouter<P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            source: Arc::clone(&self.source),
        }
    }
}

impl<P: ProfileSource> LandingRouter<P> {
    pub fn new(store: Arc<dyn TokenStore>, source: Arc<P>) -> Self {
        Self { store, source }
    }

    /// Choose the single navigation target for the current session.
    pub async fn resolve(&self) -> Landing {
        if !self.store.get().is_complete() {
            debug!("Landing: no session, routing to login");
            return Landing::login();
        }

        match self.source.fetch_profile().await {
            Ok(profile) => {
                let kind = profile.kind();
                let route = match kind {
                    ProfileKind::StandardUser => Route::Home,
                    ProfileKind::ExternalIdentityUser | ProfileKind::ProfileMissing => Route::Profile,
                };
                info!(?kind, %route, "Landing resolved");
                Landing {
                    route,
                    kind: Some(kind),
                    profile: Some(profile),
                }
            }
            Err(e) if e.is_not_found() => {
                // New external-identity accounts have no profile yet
                info!("Landing: profile not found, assuming new external-identity user");
                Landing {
                    route: Route::Profile,
                    kind: Some(ProfileKind::ProfileMissing),
                    profile: None,
                }
            }
            Err(e) if e.is_auth_error() => {
                info!(error = %e, "Landing: profile fetch unauthorized, routing to login");
                Landing::login()
            }
            Err(e) => {
                warn!(error = %e, "Landing: profile fetch failed, routing to login");
                Landing::login()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::auth::tokens::{MemoryTokenStore, TokenPair};

    struct FakeProfiles {
        calls: AtomicUsize,
        result: Result<Profile, u16>,
    }

    impl FakeProfiles {
        fn profile(is_telegram_user: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Ok(Profile {
                    username: "ann".to_string(),
                    is_telegram_user,
                    ..Default::default()
                }),
            })
        }

        fn status(status: u16) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                result: Err(status),
            })
        }
    }

    impl ProfileSource for FakeProfiles {
        async fn fetch_profile(&self) -> Result<Profile, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(p) => Ok(p.clone()),
                Err(status) => Err(ApiError::Http {
                    status: *status,
                    body: String::new(),
                }),
            }
        }
    }

    fn signed_in() -> Arc<MemoryTokenStore> {
        Arc::new(MemoryTokenStore::with_tokens("access", "refresh"))
    }

    #[tokio::test]
    async fn test_no_session_routes_to_login_without_fetch() {
        let source = FakeProfiles::profile(false);
        let router = LandingRouter::new(Arc::new(MemoryTokenStore::new()), Arc::clone(&source));

        let landing = router.resolve().await;
        assert_eq!(landing.route, Route::Login);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_half_session_routes_to_login() {
        let store = Arc::new(MemoryTokenStore::new());
        store.set_access("access");
        assert_eq!(
            store.get(),
            TokenPair {
                access: Some("access".into()),
                refresh: None
            }
        );
        let router = LandingRouter::new(store, FakeProfiles::profile(false));
        assert_eq!(router.resolve().await.route, Route::Login);
    }

    #[tokio::test]
    async fn test_standard_user_routes_home() {
        let router = LandingRouter::new(signed_in(), FakeProfiles::profile(false));
        let landing = router.resolve().await;
        assert_eq!(landing.route, Route::Home);
        assert_eq!(landing.kind, Some(ProfileKind::StandardUser));
        assert!(landing.profile.is_some());
    }

    #[tokio::test]
    async fn test_external_identity_user_routes_to_profile() {
        let router = LandingRouter::new(signed_in(), FakeProfiles::profile(true));
        let landing = router.resolve().await;
        assert_eq!(landing.route, Route::Profile);
        assert_eq!(landing.kind, Some(ProfileKind::ExternalIdentityUser));
    }

    #[tokio::test]
    async fn test_missing_profile_routes_to_profile() {
        let router = LandingRouter::new(signed_in(), FakeProfiles::status(404));
        let landing = router.resolve().await;
        assert_eq!(landing.route, Route::Profile);
        assert_eq!(landing.kind, Some(ProfileKind::ProfileMissing));
        assert!(landing.profile.is_none());
    }

    #[tokio::test]
    async fn test_auth_errors_route_to_login() {
        for status in [401, 403] {
            let router = LandingRouter::new(signed_in(), FakeProfiles::status(status));
            assert_eq!(router.resolve().await.route, Route::Login);
        }
    }

    #[tokio::test]
    async fn test_server_error_routes_to_login() {
        let router = LandingRouter::new(signed_in(), FakeProfiles::status(500));
        assert_eq!(router.resolve().await.route, Route::Login);
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        for source in [
            FakeProfiles::profile(false),
            FakeProfiles::profile(true),
            FakeProfiles::status(404),
            FakeProfiles::status(401),
        ] {
            let router = LandingRouter::new(signed_in(), source);
            let first = router.resolve().await.route;
            let second = router.resolve().await.route;
            assert_eq!(first, second);
        }
    }
}
