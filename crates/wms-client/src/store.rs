//! Session store: the single source of truth for auth state.
//!
//! All credential reads and writes elsewhere in the crate go through
//! [`SessionStore`]. Every mutating operation commits the durable subset
//! of the state (tokens, tenant, authenticated flag) to its storage
//! backend before returning; the identity record lives only in memory and
//! is refetched after rehydration.

use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info, instrument, warn};

use wms_core::error::Error;
use wms_core::{
    ADMIN_ROLE, AccessToken, PersistedSession, RefreshToken, SessionEvent, SessionStorage,
    TenantSlug, UserIdentity,
};

type Observer = Box<dyn Fn(SessionEvent) + Send + Sync>;

/// In-memory session state.
#[derive(Debug, Clone, Default)]
struct SessionState {
    identity: Option<UserIdentity>,
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
    tenant: Option<TenantSlug>,
    authenticated: bool,
}

impl SessionState {
    fn derive_authenticated(&mut self) {
        self.authenticated = self
            .access_token
            .as_ref()
            .is_some_and(|token| !token.is_empty());
    }

    fn durable_subset(&self) -> PersistedSession {
        PersistedSession {
            access_token: self.access_token.as_ref().map(|t| t.as_str().to_string()),
            refresh_token: self.refresh_token.as_ref().map(|t| t.as_str().to_string()),
            tenant_slug: self.tenant.as_ref().map(|t| t.as_str().to_string()),
            is_authenticated: self.authenticated,
        }
    }
}

/// The single source of truth for client auth state.
///
/// Stores are cheap to clone (they use internal `Arc`) and are safe to
/// share across tasks. Mutations are serialized by an internal lock, so
/// each operation is atomic with respect to observers.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: RwLock<SessionState>,
    storage: Box<dyn SessionStorage>,
    observers: Mutex<Vec<Observer>>,
}

impl SessionStore {
    /// Create an empty store over the given storage backend.
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(SessionState::default()),
                storage: Box::new(storage),
                observers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Open a store, rehydrating the durable subset if one was persisted.
    ///
    /// The identity record is never persisted; callers that need it after
    /// rehydration fetch it through the request pipeline (the route guard
    /// does this on first protected navigation).
    pub fn open(storage: impl SessionStorage + 'static) -> Result<Self, Error> {
        let store = Self::new(storage);

        if let Some(persisted) = store.inner.storage.load()? {
            debug!("Rehydrating persisted session");
            let mut state = store.inner.state.write().unwrap();
            state.access_token = persisted.access_token.map(AccessToken::new);
            state.refresh_token = persisted.refresh_token.map(RefreshToken::new);
            state.tenant = persisted
                .tenant_slug
                .and_then(|slug| match TenantSlug::new(&slug) {
                    Ok(tenant) => Some(tenant),
                    Err(err) => {
                        warn!(error = %err, "Dropping invalid persisted tenant slug");
                        None
                    }
                });
            // The flag is re-derived rather than trusted, keeping the
            // authenticated-implies-token invariant across restarts.
            state.derive_authenticated();
        }

        Ok(store)
    }

    /// Register an observer for terminal session-loss events.
    pub fn subscribe(&self, observer: impl Fn(SessionEvent) + Send + Sync + 'static) {
        self.inner
            .observers
            .lock()
            .unwrap()
            .push(Box::new(observer));
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Replace both credential fields.
    ///
    /// `authenticated` becomes true iff the access token is present and
    /// non-empty. Token contents are not validated; semantic validity is
    /// determined by server response codes at call time.
    pub fn set_credentials(
        &self,
        access: Option<AccessToken>,
        refresh: Option<RefreshToken>,
    ) -> Result<(), Error> {
        let mut state = self.inner.state.write().unwrap();
        state.access_token = access;
        state.refresh_token = refresh;
        state.derive_authenticated();
        self.persist(&state)
    }

    /// Replace the tenant selector, independent of credential state.
    pub fn set_tenant(&self, tenant: Option<TenantSlug>) -> Result<(), Error> {
        let mut state = self.inner.state.write().unwrap();
        state.tenant = tenant;
        self.persist(&state)
    }

    /// Replace the identity record without touching credentials.
    pub fn set_identity(&self, identity: Option<UserIdentity>) -> Result<(), Error> {
        let mut state = self.inner.state.write().unwrap();
        state.identity = identity;
        self.persist(&state)
    }

    /// Establish a full session in one atomic step.
    ///
    /// This is the only operation that authenticates and populates the
    /// identity record at the same time.
    #[instrument(skip_all, fields(username = %identity.username))]
    pub fn login(
        &self,
        identity: UserIdentity,
        access: AccessToken,
        refresh: RefreshToken,
        tenant: Option<TenantSlug>,
    ) -> Result<(), Error> {
        info!("Session established");
        let mut state = self.inner.state.write().unwrap();
        state.identity = Some(identity);
        state.access_token = Some(access);
        state.refresh_token = Some(refresh);
        state.tenant = tenant;
        state.derive_authenticated();
        self.persist(&state)
    }

    /// Clear the session entirely. Idempotent, callable at any time.
    pub fn logout(&self) -> Result<(), Error> {
        self.clear(SessionEvent::LoggedOut)
    }

    /// Clear the session after an unrecoverable credential failure.
    ///
    /// Identical to [`SessionStore::logout`] except for the event emitted,
    /// so subscribers can distinguish a user-initiated sign-out from a
    /// forced one.
    pub fn expire(&self) -> Result<(), Error> {
        self.clear(SessionEvent::Expired)
    }

    fn clear(&self, event: SessionEvent) -> Result<(), Error> {
        {
            let mut state = self.inner.state.write().unwrap();
            *state = SessionState::default();
            self.inner.storage.clear()?;
        }
        debug!(?event, "Session cleared");
        self.notify(event);
        Ok(())
    }

    /// Commit the durable subset. Callers hold the state write lock, so a
    /// crash after any operation loses nothing beyond the last transition.
    fn persist(&self, state: &SessionState) -> Result<(), Error> {
        self.inner.storage.save(&state.durable_subset())?;
        Ok(())
    }

    fn notify(&self, event: SessionEvent) {
        let observers = self.inner.observers.lock().unwrap();
        for observer in observers.iter() {
            observer(event);
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Whether an access credential is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.read().unwrap().authenticated
    }

    /// The current identity record, if fetched.
    pub fn identity(&self) -> Option<UserIdentity> {
        self.inner.state.read().unwrap().identity.clone()
    }

    /// The current access token, if any.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.inner.state.read().unwrap().access_token.clone()
    }

    /// The current refresh token, if any.
    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.inner.state.read().unwrap().refresh_token.clone()
    }

    /// The current tenant selector, if any.
    pub fn tenant(&self) -> Option<TenantSlug> {
        self.inner.state.read().unwrap().tenant.clone()
    }

    /// True iff an identity is present and carries a role with this code.
    pub fn has_role(&self, code: &str) -> bool {
        self.inner
            .state
            .read()
            .unwrap()
            .identity
            .as_ref()
            .is_some_and(|identity| identity.has_role(code))
    }

    /// Permission check: `admin` holders pass everything.
    ///
    /// Role-to-permission expansion is not wired up; non-admin callers are
    /// denied regardless of `code`.
    // TODO: expand permissions from role assignments once the profile
    // payload includes per-role permission sets.
    pub fn has_permission(&self, _code: &str) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

// Custom Debug impl that hides credential material
impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read().unwrap();
        f.debug_struct("SessionStore")
            .field("authenticated", &state.authenticated)
            .field("tenant", &state.tenant)
            .field("identity", &state.identity.as_ref().map(|i| &i.username))
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

/// In-memory storage backend.
///
/// Useful for tests and for embedders that manage durability themselves.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    record: Mutex<Option<PersistedSession>>,
}

impl MemoryStorage {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-loaded with a persisted record.
    pub fn with_record(record: PersistedSession) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    /// The currently stored record, if any.
    pub fn record(&self) -> Option<PersistedSession> {
        self.record.lock().unwrap().clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn save(&self, session: &PersistedSession) -> Result<(), wms_core::error::StorageError> {
        *self.record.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<PersistedSession>, wms_core::error::StorageError> {
        Ok(self.record.lock().unwrap().clone())
    }

    fn clear(&self) -> Result<(), wms_core::error::StorageError> {
        *self.record.lock().unwrap() = None;
        Ok(())
    }
}
