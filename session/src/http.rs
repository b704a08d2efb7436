//! Shared HTTP client with the unauthorized-response interceptor.
//!
//! DESIGN
//! ======
//! Observers register a hook and hold the returned [`InterceptorRegistration`];
//! dropping it deregisters the hook. On a `401` every live hook runs
//! synchronously before the original error is handed back to the caller, so
//! the interceptor is a side channel and never swallows the failure.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::store::SessionRepository;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, decode).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("request returned status {status}")]
    Status { status: u16, body: String },
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }
}

type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct HookTable {
    next_id: u64,
    hooks: Vec<(u64, UnauthorizedHook)>,
}

/// Live interceptor hook. Dropping it deregisters the hook.
#[must_use = "dropping the registration removes the hook immediately"]
pub struct InterceptorRegistration {
    id: u64,
    table: Weak<Mutex<HookTable>>,
}

impl Drop for InterceptorRegistration {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            let mut table = table.lock().unwrap_or_else(PoisonError::into_inner);
            table.hooks.retain(|(id, _)| *id != self.id);
            debug!(hook = self.id, "unauthorized hook deregistered");
        }
    }
}

/// The one client every outbound backend call goes through.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    hooks: Arc<Mutex<HookTable>>,
    session: Option<SessionRepository>,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let inner = reqwest::Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            inner,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            hooks: Arc::new(Mutex::new(HookTable::default())),
            session: None,
        })
    }

    /// Attach the stored session token as a bearer credential on every request.
    #[must_use]
    pub fn with_session(mut self, repository: SessionRepository) -> Self {
        self.session = Some(repository);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Register `hook` to run on every unauthorized response.
    pub fn on_unauthorized<F>(&self, hook: F) -> InterceptorRegistration
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut table = self.hooks.lock().unwrap_or_else(PoisonError::into_inner);
        let id = table.next_id;
        table.next_id += 1;
        table.hooks.push((id, Arc::new(hook)));
        debug!(hook = id, "unauthorized hook registered");
        InterceptorRegistration { id, table: Arc::downgrade(&self.hooks) }
    }

    #[must_use]
    pub fn hook_count(&self) -> usize {
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner).hooks.len()
    }

    /// React to a response status. Runs every hook on `401`.
    pub fn observe(&self, status: StatusCode) {
        if status != StatusCode::UNAUTHORIZED {
            return;
        }
        // Snapshot so a hook may deregister itself without deadlocking.
        let hooks: Vec<UnauthorizedHook> = {
            let table = self.hooks.lock().unwrap_or_else(PoisonError::into_inner);
            table.hooks.iter().map(|(_, hook)| Arc::clone(hook)).collect()
        };
        warn!(hooks = hooks.len(), "unauthorized response from backend");
        for hook in hooks {
            hook();
        }
    }

    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.inner.request(method, self.url(path));
        match self.session.as_ref().and_then(SessionRepository::read) {
            Some(stored) => builder.header(AUTHORIZATION, format!("Bearer {}", stored.token)),
            None => builder,
        }
    }

    /// Send `request`, running the interceptor before any error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if no response arrives and
    /// [`ApiError::Status`] for any non-success status, `401` included.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        self.observe(status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(response)
    }

    /// # Errors
    ///
    /// See [`HttpClient::send`]; also fails if the body is not valid JSON for `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json::<T>().await?)
    }

    /// # Errors
    ///
    /// See [`HttpClient::send`]; also fails if the body is not valid JSON for `T`.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
