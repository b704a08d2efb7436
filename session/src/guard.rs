//! Page-level role guard used by role-specific dashboard layouts.
//!
//! Runs after the edge guard has already let the page through and re-checks
//! the locally stored session. It never fails: every problem resolves to a
//! redirect.

use tracing::debug;

use crate::navigate::{NavigationKind, Navigator};
use crate::role::{RedirectTarget, Role};
use crate::store::{SessionRepository, StoredSession};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoleGuardState {
    pub is_loading: bool,
    pub is_authenticated: bool,
}

impl RoleGuardState {
    /// State before the check has run.
    pub const LOADING: Self = Self { is_loading: true, is_authenticated: false };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Authenticated,
    Redirect(RedirectTarget),
}

/// Decide what a layout requiring `required` should do with `stored`.
///
/// The address gate is checked before the role, so a buyer without an address
/// is sent to complete it even on their own pages.
#[must_use]
pub fn evaluate_role_guard(stored: Option<&StoredSession>, required: Option<Role>) -> GuardOutcome {
    let Some(stored) = stored else {
        return GuardOutcome::Redirect(RedirectTarget::Login);
    };
    let user = &stored.user;
    if !user.address_complete() {
        return GuardOutcome::Redirect(RedirectTarget::AddressCompleted);
    }
    match required {
        Some(role) if role != user.role => GuardOutcome::Redirect(user.role.home()),
        _ => GuardOutcome::Authenticated,
    }
}

/// Run the guard on mount: read the stores, redirect if needed, and report
/// the resulting state.
pub fn use_role_guard(
    repository: &SessionRepository,
    navigator: &dyn Navigator,
    required: Option<Role>,
) -> RoleGuardState {
    let stored = repository.read();
    match evaluate_role_guard(stored.as_ref(), required) {
        GuardOutcome::Authenticated => RoleGuardState { is_loading: false, is_authenticated: true },
        GuardOutcome::Redirect(target) => {
            debug!(?required, %target, "role guard redirect");
            navigator.navigate(target, NavigationKind::Push);
            RoleGuardState { is_loading: false, is_authenticated: false }
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
