//! Session persistence across the two mirrored stores.
//!
//! ARCHITECTURE
//! ============
//! A client-only persistent key/value store holds `token` + `user`; an
//! HTTP-visible cookie pair holds `token` + `userData` for the edge guard.
//! [`SessionRepository`] is the only writer of either, so the pair is always
//! written and cleared together.

pub mod cookies;
pub mod local;
mod repository;

pub use cookies::JarCookies;
pub use local::{FileStorage, MemoryStorage};
pub use repository::{SessionRepository, StoredSession};

/// Local-store key for the raw session token.
pub const TOKEN_KEY: &str = "token";
/// Local-store key for the serialized user profile.
pub const USER_KEY: &str = "user";
/// Cookie carrying the raw session token.
pub const TOKEN_COOKIE: &str = "token";
/// Cookie carrying the serialized user profile.
pub const USER_COOKIE: &str = "userData";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Client-local persistent key/value store, invisible to server requests.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Cookie store readable by the edge guard on the next navigation.
///
/// Cookies are written with `path=/` and no expiry (session length).
pub trait CookieStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    /// # Errors
    ///
    /// Returns an error if the cookie cannot be written.
    fn set(&self, name: &str, value: &str) -> Result<(), StoreError>;
    /// # Errors
    ///
    /// Returns an error if the cookie cannot be removed.
    fn remove(&self, name: &str) -> Result<(), StoreError>;
}
