//! Route guard: per-navigation access decisions.
//!
//! The guard reads the session store to decide whether a requested view
//! may render, and asks its identity provider to fill in the profile when
//! a session is authenticated but the identity has not been fetched yet.
//! It never performs navigation itself; callers act on the returned
//! outcome.

use tracing::{debug, instrument};

use wms_core::error::Error;

use crate::pipeline::IdentityProvider;
use crate::store::SessionStore;

/// Classification of a navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewClass {
    /// Requires an authenticated session.
    Protected,
    /// Login, registration, landing: shown only to signed-out visitors.
    Public,
}

/// The synchronous access decision for a navigation.
///
/// `FetchIdentity` is the loading state: the host renders its loading
/// indicator and awaits [`RouteGuard::resolve`], which performs the fetch
/// and lands on a terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested view immediately.
    Render,
    /// Authenticated but the identity record is missing; fetch it first.
    FetchIdentity,
    /// Send the visitor to the login view.
    RedirectToLogin,
    /// Already signed in; send the visitor to the default landing view.
    RedirectToHome,
}

/// Terminal outcome of a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The requested view rendered.
    Rendered,
    /// Redirected to login, preserving the originally requested location
    /// for post-login return.
    RedirectedToLogin { return_to: Option<String> },
    /// Redirected to the default authenticated landing view.
    RedirectedHome,
}

/// Per-navigation access gate over an injected store and identity source.
#[derive(Debug, Clone)]
pub struct RouteGuard<P> {
    store: SessionStore,
    identities: P,
}

impl<P: IdentityProvider> RouteGuard<P> {
    /// Create a guard over the given store and identity provider.
    pub fn new(store: SessionStore, identities: P) -> Self {
        Self { store, identities }
    }

    /// Classify a navigation without performing any I/O.
    pub fn classify(&self, view: ViewClass) -> GuardDecision {
        let authenticated = self.store.is_authenticated();
        match view {
            ViewClass::Protected if !authenticated => GuardDecision::RedirectToLogin,
            ViewClass::Protected if self.store.identity().is_none() => {
                GuardDecision::FetchIdentity
            }
            ViewClass::Protected => GuardDecision::Render,
            ViewClass::Public if authenticated => GuardDecision::RedirectToHome,
            ViewClass::Public => GuardDecision::Render,
        }
    }

    /// Drive a navigation to a terminal outcome.
    ///
    /// `requested` is the originally requested location, carried into the
    /// login redirect so the host can return there after sign-in.
    ///
    /// An identity-fetch failure whose recovery cleared the session lands
    /// on the login redirect; any other fetch error propagates to the
    /// caller.
    #[instrument(skip(self, requested))]
    pub async fn resolve(
        &self,
        view: ViewClass,
        requested: Option<&str>,
    ) -> Result<GuardOutcome, Error> {
        loop {
            match self.classify(view) {
                GuardDecision::Render => return Ok(GuardOutcome::Rendered),
                GuardDecision::RedirectToLogin => {
                    return Ok(GuardOutcome::RedirectedToLogin {
                        return_to: requested.map(str::to_string),
                    });
                }
                GuardDecision::RedirectToHome => return Ok(GuardOutcome::RedirectedHome),
                GuardDecision::FetchIdentity => {
                    debug!("Session authenticated without identity, fetching profile");
                    match self.identities.fetch_identity().await {
                        Ok(identity) => {
                            self.store.set_identity(Some(identity))?;
                            // Re-classify; the next pass renders.
                        }
                        Err(err) if !self.store.is_authenticated() => {
                            // The pipeline exhausted recovery and cleared
                            // the session; the next pass redirects.
                            debug!(error = %err, "Identity fetch ended the session");
                        }
                        Err(err) => return Err(err),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;
    use wms_core::error::{ApiError, AuthError};
    use wms_core::{AccessToken, RefreshToken, TenantSlug, UserIdentity};

    use crate::store::MemoryStorage;

    fn identity() -> UserIdentity {
        let now = Utc::now();
        UserIdentity {
            id: Uuid::new_v4(),
            email: "alice@acme.test".to_string(),
            username: "alice".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            full_name: "Alice Smith".to_string(),
            display_name: None,
            is_active: true,
            is_superuser: false,
            last_login: None,
            roles: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Identity provider returning a scripted sequence of results.
    struct FakeProvider {
        calls: AtomicUsize,
        outcome: Mutex<Option<Result<UserIdentity, Error>>>,
        clears_session: Option<SessionStore>,
    }

    impl FakeProvider {
        fn returning(identity: UserIdentity) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Mutex::new(Some(Ok(identity))),
                clears_session: None,
            }
        }

        fn failing(err: Error) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Mutex::new(Some(Err(err))),
                clears_session: None,
            }
        }

        /// Simulate the pipeline clearing the store on terminal failure.
        fn failing_and_expiring(err: Error, store: SessionStore) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome: Mutex::new(Some(Err(err))),
                clears_session: Some(store),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn fetch_identity(&self) -> Result<UserIdentity, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(store) = &self.clears_session {
                store.expire().unwrap();
            }
            self.outcome
                .lock()
                .unwrap()
                .take()
                .expect("unexpected extra identity fetch")
        }
    }

    fn authenticated_store() -> SessionStore {
        let store = SessionStore::new(MemoryStorage::new());
        store
            .set_credentials(Some(AccessToken::new("A1")), Some(RefreshToken::new("R1")))
            .unwrap();
        store
            .set_tenant(Some(TenantSlug::new("acme").unwrap()))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn protected_view_redirects_when_signed_out() {
        let store = SessionStore::new(MemoryStorage::new());
        let guard = RouteGuard::new(store, FakeProvider::returning(identity()));

        assert_eq!(
            guard.classify(ViewClass::Protected),
            GuardDecision::RedirectToLogin
        );
        let outcome = guard
            .resolve(ViewClass::Protected, Some("/inventory"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            GuardOutcome::RedirectedToLogin {
                return_to: Some("/inventory".to_string())
            }
        );
        assert_eq!(guard.identities.call_count(), 0);
    }

    #[tokio::test]
    async fn protected_view_loads_identity_then_renders() {
        let store = authenticated_store();
        let guard = RouteGuard::new(store.clone(), FakeProvider::returning(identity()));

        // Loading state is observable before the fetch resolves.
        assert_eq!(
            guard.classify(ViewClass::Protected),
            GuardDecision::FetchIdentity
        );

        let outcome = guard.resolve(ViewClass::Protected, None).await.unwrap();
        assert_eq!(outcome, GuardOutcome::Rendered);
        assert_eq!(guard.identities.call_count(), 1);
        assert!(store.identity().is_some());

        // Once ready, subsequent navigations render without suspension.
        assert_eq!(guard.classify(ViewClass::Protected), GuardDecision::Render);
    }

    #[tokio::test]
    async fn public_view_redirects_home_when_signed_in() {
        let store = authenticated_store();
        let guard = RouteGuard::new(store, FakeProvider::returning(identity()));

        let outcome = guard.resolve(ViewClass::Public, None).await.unwrap();
        assert_eq!(outcome, GuardOutcome::RedirectedHome);
    }

    #[tokio::test]
    async fn public_view_renders_when_signed_out() {
        let store = SessionStore::new(MemoryStorage::new());
        let guard = RouteGuard::new(store, FakeProvider::returning(identity()));

        let outcome = guard.resolve(ViewClass::Public, None).await.unwrap();
        assert_eq!(outcome, GuardOutcome::Rendered);
    }

    #[tokio::test]
    async fn fetch_failure_that_ends_session_redirects_to_login() {
        let store = authenticated_store();
        let provider = FakeProvider::failing_and_expiring(
            AuthError::RefreshFailed {
                reason: "HTTP 401".to_string(),
            }
            .into(),
            store.clone(),
        );
        let guard = RouteGuard::new(store, provider);

        let outcome = guard
            .resolve(ViewClass::Protected, Some("/inbound"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            GuardOutcome::RedirectedToLogin {
                return_to: Some("/inbound".to_string())
            }
        );
    }

    #[tokio::test]
    async fn fetch_failure_with_session_intact_propagates() {
        let store = authenticated_store();
        let guard = RouteGuard::new(
            store,
            FakeProvider::failing(Error::Api(ApiError::new(500, None, None))),
        );

        let err = guard
            .resolve(ViewClass::Protected, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(api) if api.status == 500));
    }
}
