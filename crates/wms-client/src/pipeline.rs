//! Request pipeline: credential injection and one-shot 401 recovery.
//!
//! Every outbound call reads its credentials from the [`SessionStore`]
//! immediately before sending. A 401 on a credentialed request triggers at
//! most one token refresh and one retry; the refresh call itself goes out
//! as a bare request, so a 401 from it can never trigger further refresh
//! attempts. Concurrent 401s coalesce onto a single refresh through the
//! refresh gate.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use wms_core::error::{AuthError, Error, InvalidInputError};
use wms_core::{AccessToken, ApiUrl, Credentials, RefreshToken, TenantSlug, UserIdentity};

use crate::http::endpoints::{
    CHANGE_PASSWORD, ChangePasswordRequest, LOGIN, LOGOUT, LoginRequest, ME, Message, REFRESH,
    REGISTER, RefreshRequest, RegistrationOutput, TenantRegistration, TokenResponse,
};
use crate::http::{HttpClient, decode};
use crate::store::SessionStore;

/// Supplies the identity record for an authenticated session.
///
/// The route guard depends on this seam rather than on the concrete
/// client, so hosts can inject a fake when testing navigation.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch the current user's profile.
    async fn fetch_identity(&self) -> Result<UserIdentity, Error>;
}

/// The authenticated request pipeline.
///
/// Clients are cheap to clone (they use internal `Arc`) and are safe to
/// share across tasks. Token refresh is handled internally with
/// appropriate synchronization.
///
/// # Example
///
/// ```no_run
/// use wms_client::{ApiClient, MemoryStorage, SessionStore};
/// use wms_core::{ApiUrl, Credentials, TenantSlug};
///
/// # async fn example() -> Result<(), wms_core::Error> {
/// let base = ApiUrl::new("https://wms.acme.example")?;
/// let store = SessionStore::new(MemoryStorage::new());
/// let api = ApiClient::new(base, store);
///
/// let creds = Credentials::new("alice", "app-password")
///     .with_tenant(TenantSlug::new("acme")?);
/// let identity = api.login(&creds).await?;
/// println!("Signed in as: {}", identity.preferred_name());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    store: SessionStore,
    // Single-flight gate: at most one refresh call is ever in flight, so
    // server-side refresh-token rotation is safe under concurrent 401s.
    refresh_gate: Mutex<()>,
}

impl ApiClient {
    /// Create a new client over an injected session store.
    pub fn new(base: ApiUrl, store: SessionStore) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http: HttpClient::new(base),
                store,
                refresh_gate: Mutex::new(()),
            }),
        }
    }

    /// Returns the session store this client reads and writes.
    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    // ========================================================================
    // Generic requests
    // ========================================================================

    /// Make a credentialed GET request.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, Error> {
        self.request(Method::GET, path, None).await
    }

    /// Make a credentialed POST request.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("unserializable request body: {}", e),
        })?;
        self.request(Method::POST, path, Some(body)).await
    }

    /// The per-request recovery path.
    ///
    /// The access token captured before the send is the one the stale
    /// check compares against: if another task rotated the tokens while
    /// this request was in flight, the retry simply reuses the rotation.
    async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<R, Error> {
        let sent_token = self.inner.store.access_token();
        match self
            .send_once(method.clone(), path, body.as_ref(), sent_token.as_ref())
            .await
        {
            Ok(value) => decode(value),
            Err(Error::Api(api)) if api.is_unauthorized() => {
                debug!(path, "Credential rejected, attempting recovery");

                if self.inner.store.refresh_token().is_none() {
                    // Nothing to recover with; the session is gone and the
                    // original failure is what the caller sees.
                    self.inner.store.expire()?;
                    return Err(Error::Api(api));
                }

                self.refresh_after_unauthorized(sent_token).await?;

                // Exactly one retry, carrying the rotated token; its
                // outcome is final even if it is another 401.
                let rotated = self.inner.store.access_token();
                let value = self
                    .send_once(method, path, body.as_ref(), rotated.as_ref())
                    .await?;
                decode(value)
            }
            Err(err) => Err(err),
        }
    }

    /// Send one request with the given credential snapshot.
    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        token: Option<&AccessToken>,
    ) -> Result<serde_json::Value, Error> {
        let tenant = self.inner.store.tenant();
        self.inner
            .http
            .send_value(
                method,
                path,
                body,
                token.filter(|t| !t.is_empty()).map(|t| t.as_str()),
                tenant.as_ref().map(|t| t.as_str()),
            )
            .await
    }

    // ========================================================================
    // Token refresh
    // ========================================================================

    /// Coalesce concurrent 401s onto a single refresh.
    ///
    /// `stale` is the access token the failing request carried. A caller
    /// that acquires the gate after the store has already moved past that
    /// token skips the network call and reuses the rotation.
    async fn refresh_after_unauthorized(&self, stale: Option<AccessToken>) -> Result<(), Error> {
        let _flight = self.inner.refresh_gate.lock().await;
        if self.inner.store.access_token() != stale {
            debug!("Tokens already rotated by a concurrent request");
            return Ok(());
        }
        self.rotate_tokens().await
    }

    /// Force a token rotation, regardless of the current token's state.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), Error> {
        let _flight = self.inner.refresh_gate.lock().await;
        self.rotate_tokens().await
    }

    /// Issue the refresh call and commit the rotated pair.
    ///
    /// Callers hold the refresh gate. The call goes out bare: a 401 here
    /// is a terminal failure, never a trigger for another refresh.
    async fn rotate_tokens(&self) -> Result<(), Error> {
        info!("Refreshing session");

        let refresh_token = self
            .inner
            .store
            .refresh_token()
            .ok_or(AuthError::RefreshTokenMissing)?;

        let request = RefreshRequest {
            refresh_token: refresh_token.as_str(),
        };

        match self
            .inner
            .http
            .post::<_, TokenResponse>(REFRESH, &request)
            .await
        {
            Ok(tokens) => {
                self.inner.store.set_credentials(
                    Some(AccessToken::new(tokens.access_token)),
                    Some(RefreshToken::new(tokens.refresh_token)),
                )?;
                debug!("Session refreshed successfully");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Session refresh failed, clearing session");
                self.inner.store.expire()?;
                Err(AuthError::RefreshFailed {
                    reason: err.to_string(),
                }
                .into())
            }
        }
    }

    // ========================================================================
    // Auth operations
    // ========================================================================

    /// Authenticate and establish a session.
    ///
    /// The profile is fetched with the fresh token before the session is
    /// committed, so a successful login always leaves the store with both
    /// credentials and identity populated in one step.
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<UserIdentity, Error> {
        info!("Creating new session");

        let request = LoginRequest {
            username: credentials.username(),
            password: credentials.password(),
            tenant_slug: credentials.tenant().map(|t| t.as_str()),
        };

        let tokens: TokenResponse = match self.inner.http.post(LOGIN, &request).await {
            Ok(tokens) => tokens,
            Err(Error::Api(api)) if api.is_unauthorized() => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(err) => return Err(err),
        };

        let tenant = credentials.tenant().cloned();
        let identity = self
            .fetch_identity_with(&tokens.access_token, tenant.as_ref())
            .await?;

        self.inner.store.login(
            identity.clone(),
            AccessToken::new(tokens.access_token),
            RefreshToken::new(tokens.refresh_token),
            tenant,
        )?;

        debug!(username = %identity.username, "Session created successfully");
        Ok(identity)
    }

    /// Register a new tenant with its admin user, and sign in as that user.
    #[instrument(skip(self, registration), fields(tenant = %registration.tenant_slug))]
    pub async fn register(
        &self,
        registration: &TenantRegistration,
    ) -> Result<RegistrationOutput, Error> {
        info!("Registering tenant");

        let output: RegistrationOutput = self.inner.http.post(REGISTER, registration).await?;

        let tenant = TenantSlug::new(&output.tenant.slug)?;
        self.inner.store.login(
            output.user.clone(),
            AccessToken::new(output.tokens.access_token.clone()),
            RefreshToken::new(output.tokens.refresh_token.clone()),
            Some(tenant),
        )?;

        Ok(output)
    }

    /// End the session.
    ///
    /// The server side of logout is stateless cleanup, so a failed call is
    /// logged and the local session is cleared regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), Error> {
        let token = self
            .inner
            .store
            .access_token()
            .filter(|token| !token.is_empty());
        if let Some(token) = token {
            let tenant = self.inner.store.tenant();
            if let Err(err) = self
                .inner
                .http
                .send_value(
                    Method::POST,
                    LOGOUT,
                    None,
                    Some(token.as_str()),
                    tenant.as_ref().map(|t| t.as_str()),
                )
                .await
            {
                debug!(error = %err, "Server-side logout failed; clearing local session anyway");
            }
        }
        self.inner.store.logout()
    }

    /// Change the current user's password.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<Message, Error> {
        let request = ChangePasswordRequest {
            current_password: current,
            new_password: new,
        };
        self.post(CHANGE_PASSWORD, &request).await
    }

    /// Fetch the profile with an explicit token, outside the session.
    async fn fetch_identity_with(
        &self,
        access_token: &str,
        tenant: Option<&TenantSlug>,
    ) -> Result<UserIdentity, Error> {
        let value = self
            .inner
            .http
            .send_value(
                Method::GET,
                ME,
                None,
                Some(access_token),
                tenant.map(|t| t.as_str()),
            )
            .await?;
        decode(value)
    }
}

#[async_trait]
impl IdentityProvider for ApiClient {
    /// Fetch the current user's profile through the recovery pipeline.
    async fn fetch_identity(&self) -> Result<UserIdentity, Error> {
        self.get(ME).await
    }
}

// Custom Debug impl that hides the session store's credential material
// behind the store's own redacting Debug.
impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", self.inner.http.base())
            .field("store", &self.inner.store)
            .finish()
    }
}
