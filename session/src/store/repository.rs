use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    CookieStore, JarCookies, LocalStore, MemoryStorage, StoreError, TOKEN_COOKIE, TOKEN_KEY, USER_COOKIE, USER_KEY,
};
use crate::profile::UserProfile;

/// A session pair that passed every consistency check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub user: UserProfile,
}

/// Why a stored pair was rejected. Only used for logging.
#[derive(Debug, thiserror::Error)]
enum Divergence {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("unparsable {0}")]
    Unparsable(&'static str),
    #[error("local and cookie copies disagree")]
    Mismatch,
}

/// Single writer of both session stores.
///
/// Every operation fans out to the local store and the cookie store together;
/// there is no way to touch one without the other.
#[derive(Clone)]
pub struct SessionRepository {
    local: Arc<dyn LocalStore>,
    cookies: Arc<dyn CookieStore>,
}

impl SessionRepository {
    #[must_use]
    pub fn new(local: Arc<dyn LocalStore>, cookies: Arc<dyn CookieStore>) -> Self {
        Self { local, cookies }
    }

    /// Repository over a [`MemoryStorage`] and a fresh [`JarCookies`].
    #[must_use]
    pub fn in_memory() -> (Self, Arc<JarCookies>) {
        let cookies = Arc::new(JarCookies::new());
        let repo = Self::new(Arc::new(MemoryStorage::new()), cookies.clone());
        (repo, cookies)
    }

    /// Persist `token` and `user` to both stores.
    ///
    /// # Errors
    ///
    /// Returns the first store error. Whatever was already written is cleared
    /// before returning, so a failed write leaves no session behind.
    pub fn write(&self, token: &str, user: &UserProfile) -> Result<(), StoreError> {
        let user_json = user.to_json()?;
        let result = self.write_all(token, &user_json);
        if let Err(e) = &result {
            warn!(error = %e, "session write failed; clearing partial state");
            self.clear();
        }
        result
    }

    fn write_all(&self, token: &str, user_json: &str) -> Result<(), StoreError> {
        self.local.set(TOKEN_KEY, token)?;
        self.local.set(USER_KEY, user_json)?;
        self.cookies.set(TOKEN_COOKIE, token)?;
        self.cookies.set(USER_COOKIE, user_json)?;
        Ok(())
    }

    /// Remove the session from both stores. Failures are logged; every half
    /// is attempted regardless.
    pub fn clear(&self) {
        let results = [
            ("local token", self.local.remove(TOKEN_KEY)),
            ("local user", self.local.remove(USER_KEY)),
            ("token cookie", self.cookies.remove(TOKEN_COOKIE)),
            ("user cookie", self.cookies.remove(USER_COOKIE)),
        ];
        for (half, result) in results {
            if let Err(e) = result {
                warn!(half, error = %e, "failed to clear session half");
            }
        }
    }

    /// Read the stored pair, or `None` if any half is missing, unparsable, or
    /// disagrees with its mirror. A rejected pair is cleared before returning.
    #[must_use]
    pub fn read(&self) -> Option<StoredSession> {
        let halves = [
            self.local.get(TOKEN_KEY),
            self.local.get(USER_KEY),
            self.cookies.get(TOKEN_COOKIE),
            self.cookies.get(USER_COOKIE),
        ];
        if halves.iter().all(Option::is_none) {
            return None;
        }
        let [local_token, local_user, cookie_token, cookie_user] = halves;

        match check_pair(local_token, local_user, cookie_token, cookie_user) {
            Ok(session) => Some(session),
            Err(reason) => {
                warn!(%reason, "discarding inconsistent session state");
                self.clear();
                None
            }
        }
    }

    /// Raw token from whichever store still holds one, without validating the
    /// pair. Expiry checks use this so a stale token is found even when its
    /// mirror is gone.
    #[must_use]
    pub fn stored_token(&self) -> Option<String> {
        let token = non_empty(self.local.get(TOKEN_KEY)).or_else(|| non_empty(self.cookies.get(TOKEN_COOKIE)));
        if token.is_none() {
            debug!("no stored session token");
        }
        token
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn check_pair(
    local_token: Option<String>,
    local_user: Option<String>,
    cookie_token: Option<String>,
    cookie_user: Option<String>,
) -> Result<StoredSession, Divergence> {
    let local_token = non_empty(local_token).ok_or(Divergence::Missing("local token"))?;
    let local_user = non_empty(local_user).ok_or(Divergence::Missing("local user"))?;
    let cookie_token = non_empty(cookie_token).ok_or(Divergence::Missing("token cookie"))?;
    let cookie_user = non_empty(cookie_user).ok_or(Divergence::Missing("user cookie"))?;

    let user = UserProfile::from_json(&local_user).map_err(|_| Divergence::Unparsable("local user"))?;
    let mirrored = UserProfile::from_json(&cookie_user).map_err(|_| Divergence::Unparsable("user cookie"))?;

    if local_token != cookie_token || user != mirrored {
        return Err(Divergence::Mismatch);
    }
    Ok(StoredSession { token: local_token, user })
}

#[cfg(test)]
#[path = "repository_test.rs"]
mod tests;
