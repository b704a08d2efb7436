//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into the edge middleware via the `State` extractor.
//! It holds the immutable guard built at startup; nothing in it is mutated
//! while serving.

use std::sync::Arc;

use session::EdgeGuard;

#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<EdgeGuard>,
}

impl AppState {
    #[must_use]
    pub fn new(guard: EdgeGuard) -> Self {
        Self { guard: Arc::new(guard) }
    }
}
