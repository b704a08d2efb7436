//! Edge guard middleware.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs before every page handler. It reads the `token` and `userData`
//! cookies written by the session layer and either lets the request through
//! or answers with a temporary redirect. Page code never runs for a
//! redirected request.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use session::EdgeDecision;
use session::store::{TOKEN_COOKIE, USER_COOKIE};
use tracing::info;

use crate::state::AppState;

pub async fn edge_guard(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let decision = state.guard.evaluate(
        &path,
        jar.get(TOKEN_COOKIE).map(Cookie::value),
        jar.get(USER_COOKIE).map(Cookie::value),
    );
    match decision {
        EdgeDecision::Allow => next.run(request).await,
        EdgeDecision::Redirect(target) => {
            info!(%path, %target, "edge guard redirect");
            Redirect::temporary(target.path()).into_response()
        }
    }
}

#[cfg(test)]
#[path = "middleware_test.rs"]
mod tests;
