//! Navigation seam between the session layer and the page host.

use std::sync::{Mutex, PoisonError};

use crate::role::RedirectTarget;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationKind {
    /// Client-side route transition; page state survives.
    Push,
    /// Full document load; all in-flight page state is discarded.
    Full,
}

/// Performs redirects requested by guards and the session context.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: RedirectTarget, kind: NavigationKind);
}

/// Navigator that records requests for the host to apply.
#[derive(Debug, Default)]
pub struct NavigationLog {
    entries: Mutex<Vec<(RedirectTarget, NavigationKind)>>,
}

impl NavigationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<(RedirectTarget, NavigationKind)> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<(RedirectTarget, NavigationKind)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }

    /// Drain pending navigations.
    pub fn take(&self) -> Vec<(RedirectTarget, NavigationKind)> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Navigator for NavigationLog {
    fn navigate(&self, target: RedirectTarget, kind: NavigationKind) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((target, kind));
    }
}

#[cfg(test)]
#[path = "navigate_test.rs"]
mod tests;
