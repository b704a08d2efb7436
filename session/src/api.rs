//! Backend calls owned by the session layer.

use serde::Serialize;

use crate::context::{LoginError, SessionContext};
use crate::http::HttpClient;
use crate::profile::{LoginResponse, UserProfile};

pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Authenticate against the backend and store the resulting session.
///
/// # Errors
///
/// Returns an error if the request fails, the backend rejects the
/// credentials, or the session cannot be stored.
pub async fn login(http: &HttpClient, ctx: &SessionContext, email: &str, password: &str) -> Result<UserProfile, LoginError> {
    let response: LoginResponse = http
        .post_json(LOGIN_PATH, &Credentials { email: email.trim(), password })
        .await?;
    ctx.login(response)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
