//! Session context: the per-page-load view of who is signed in.
//!
//! SYSTEM CONTEXT
//! ==============
//! Created once per page load and passed explicitly to the rendering layer.
//! [`SessionContext::mount`] initializes it from the stores, starts the expiry
//! watchdog and registers the unauthorized interceptor; the returned
//! [`MountedSession`] tears both down when dropped.
//!
//! ERROR HANDLING
//! ==============
//! Forced logouts (expired token, `401`) are recovered locally: the stores are
//! cleared, the user is told once, and the page reloads onto `/login`.

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::http::{ApiError, HttpClient, InterceptorRegistration};
use crate::navigate::{NavigationKind, Navigator};
use crate::notify::{NoticeLevel, Notifier, SESSION_EXPIRED_MESSAGE};
use crate::profile::{LoginResponse, UserProfile};
use crate::role::RedirectTarget;
use crate::store::{SessionRepository, StoreError};
use crate::token;
use crate::watchdog::Watchdog;

pub const DEFAULT_WATCHDOG_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("login rejected: {0}")]
    Rejected(String),
    #[error("login response missing {0}")]
    Incomplete(&'static str),
    #[error("failed to store session: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Derived, read-only session state consumed by pages and guards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub has_address: bool,
}

impl SessionState {
    fn signed_in(user: UserProfile) -> Self {
        let has_address = user.address_complete();
        Self { user: Some(user), is_authenticated: true, has_address }
    }
}

pub struct SessionContext {
    repository: SessionRepository,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    state: RwLock<SessionState>,
    /// Token whose expiry was already announced.
    announced: Mutex<Option<String>>,
}

impl SessionContext {
    #[must_use]
    pub fn new(repository: SessionRepository, navigator: Arc<dyn Navigator>, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        Self::with_clock(repository, navigator, notifier, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(
        repository: SessionRepository,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new(Self {
            repository,
            navigator,
            notifier,
            clock,
            state: RwLock::new(SessionState::default()),
            announced: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn repository(&self) -> &SessionRepository {
        &self.repository
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.state().user
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).is_authenticated
    }

    #[must_use]
    pub fn has_address(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).has_address
    }

    fn set_state(&self, next: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Load the session from the stores. An expired token forces a logout.
    pub fn initialize(&self) {
        if let Some(stored_token) = self.repository.stored_token() {
            if token::is_expired_at(&stored_token, self.clock.now_ms()) {
                self.expire_session(&stored_token);
                return;
            }
        }
        match self.repository.read() {
            Some(stored) => {
                info!(user_id = %stored.user.id, role = %stored.user.role, "session restored");
                self.set_state(SessionState::signed_in(stored.user));
            }
            None => self.set_state(SessionState::default()),
        }
    }

    /// Initialize, then start the watchdog and the `401` interceptor for the
    /// lifetime of the returned handle. Must be called inside a tokio runtime.
    pub fn mount(self: &Arc<Self>, http: &HttpClient, watchdog_interval: Duration) -> MountedSession {
        self.initialize();
        let watchdog = Watchdog::spawn(Arc::clone(self), watchdog_interval);
        let weak = Arc::downgrade(self);
        let interceptor = http.on_unauthorized(move || {
            if let Some(ctx) = weak.upgrade() {
                ctx.handle_unauthorized();
            }
        });
        MountedSession { watchdog: Some(watchdog), interceptor: Some(interceptor) }
    }

    /// Store a successful login and mark the context authenticated.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend reported failure, omitted the token or
    /// user, or the stores could not be written.
    pub fn login(&self, response: LoginResponse) -> Result<UserProfile, LoginError> {
        if !response.success {
            return Err(LoginError::Rejected(
                response.message.unwrap_or_else(|| "invalid credentials".to_owned()),
            ));
        }
        let token = response
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(LoginError::Incomplete("token"))?;
        let user = response.user.ok_or(LoginError::Incomplete("user"))?;

        self.repository.write(&token, &user)?;
        *self.announced.lock().unwrap_or_else(PoisonError::into_inner) = None;
        info!(user_id = %user.id, role = %user.role, "signed in");
        self.set_state(SessionState::signed_in(user.clone()));
        Ok(user)
    }

    /// Clear both stores, reset state, and reload onto `/login`.
    pub fn logout(&self) {
        self.repository.clear();
        self.set_state(SessionState::default());
        info!("signed out");
        self.navigator.navigate(RedirectTarget::Login, NavigationKind::Full);
    }

    /// Watchdog tick: force a logout if the stored token has expired.
    /// Returns whether a logout happened.
    pub fn check_expiry(&self) -> bool {
        let Some(stored_token) = self.repository.stored_token() else {
            return false;
        };
        if !token::is_expired_at(&stored_token, self.clock.now_ms()) {
            return false;
        }
        self.expire_session(&stored_token);
        true
    }

    /// Interceptor reaction to a `401`. A session that is already gone is left
    /// alone so concurrent failures produce one logout.
    pub fn handle_unauthorized(&self) {
        match self.repository.stored_token() {
            Some(stored_token) => self.expire_session(&stored_token),
            None if self.is_authenticated() => self.expire_session(""),
            None => {}
        }
    }

    fn expire_session(&self, expired_token: &str) {
        let first_time = {
            let mut announced = self.announced.lock().unwrap_or_else(PoisonError::into_inner);
            let first = announced.as_deref() != Some(expired_token);
            *announced = Some(expired_token.to_owned());
            first
        };
        warn!(first_time, "session terminated; forcing logout");
        self.logout();
        if first_time {
            self.notifier.notify(NoticeLevel::Error, SESSION_EXPIRED_MESSAGE);
        }
    }
}

/// Lifetime of a mounted context. Dropping it stops the watchdog and
/// deregisters the interceptor.
pub struct MountedSession {
    watchdog: Option<Watchdog>,
    interceptor: Option<InterceptorRegistration>,
}

impl MountedSession {
    #[must_use]
    pub fn watchdog_running(&self) -> bool {
        self.watchdog.as_ref().is_some_and(Watchdog::is_running)
    }

    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.stop();
        }
        self.interceptor.take();
    }
}

impl Drop for MountedSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
