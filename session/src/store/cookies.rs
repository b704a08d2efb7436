//! In-process cookie jar mirroring what the browser would send.
//!
//! The jar is rendered into a `Cookie:` request header so the edge guard reads
//! exactly the pair the session layer wrote.

use std::sync::{Mutex, PoisonError};

use axum_extra::extract::cookie::{Cookie, CookieJar};

use super::{CookieStore, StoreError};

#[derive(Debug, Default)]
pub struct JarCookies {
    jar: Mutex<CookieJar>,
}

impl JarCookies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Percent-encoded `name=value` pairs joined for a `Cookie:` header.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        let jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        let pairs: Vec<String> = jar
            .iter()
            .map(|cookie| cookie.encoded().stripped().to_string())
            .collect();
        if pairs.is_empty() { None } else { Some(pairs.join("; ")) }
    }
}

impl CookieStore for JarCookies {
    fn get(&self, name: &str) -> Option<String> {
        let jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        jar.get(name).map(|cookie| cookie.value().to_owned())
    }

    fn set(&self, name: &str, value: &str) -> Result<(), StoreError> {
        let cookie = Cookie::build((name.to_owned(), value.to_owned())).path("/");
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        *jar = jar.clone().add(cookie);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StoreError> {
        let cookie = Cookie::build((name.to_owned(), String::new())).path("/");
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        *jar = jar.clone().remove(cookie);
        Ok(())
    }
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;
