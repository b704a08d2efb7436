//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every page route sits behind the edge guard layer; only `/healthz` is
//! mounted outside it. Pages render placeholder documents: their content is
//! owned by the storefront frontend, this server only decides who may load
//! them.

pub mod pages;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::middleware::edge_guard;
use crate::state::AppState;

/// Fixed pages: `(path, title)`.
const PAGES: [(&str, &str); 15] = [
    ("/", "Home"),
    ("/login", "Login"),
    ("/register", "Register"),
    ("/access-denied", "Access denied"),
    ("/about", "About"),
    ("/business", "Business"),
    ("/contact", "Contact"),
    ("/marketplace", "Marketplace"),
    ("/address-completed", "Complete your address"),
    ("/admin", "Admin dashboard"),
    ("/seller", "Seller dashboard"),
    ("/cart", "Cart"),
    ("/checkout", "Checkout"),
    ("/orders", "Orders"),
    ("/profile", "Profile"),
];

pub fn app(state: AppState) -> Router {
    let mut router = Router::new();
    for (path, title) in PAGES {
        router = router.route(path, get(move || async move { pages::render(title) }));
    }

    router
        .route("/admin/{*rest}", get(pages::admin_section))
        .route("/seller/{*rest}", get(pages::seller_section))
        .route("/orders/{id}", get(pages::order))
        .fallback(pages::not_found)
        .layer(from_fn_with_state(state, edge_guard))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
