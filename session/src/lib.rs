//! Session and access control for the storefront.
//!
//! SYSTEM CONTEXT
//! ==============
//! Decides on every navigation whether a visitor is signed in, which role they
//! hold, and where they must be redirected. The edge guard ([`access`]) runs
//! server-side on the cookie pair before a page is served; the session
//! context ([`context`]) and page guard ([`guard`]) then re-validate on the
//! client side against the same stores, while the watchdog and the `401`
//! interceptor can end the session at any time.
//!
//! Every failure mode fails closed: corrupt, partial, or expired state is
//! treated as signed out.

pub mod access;
pub mod api;
pub mod clock;
pub mod config;
pub mod context;
pub mod guard;
pub mod http;
pub mod navigate;
pub mod notify;
pub mod profile;
pub mod role;
pub mod store;
pub mod token;
pub mod watchdog;

pub use access::{EdgeDecision, EdgeGuard, EdgeOptions, ProtectedRoute, RouteClass, RouteTable, RouteTableError};
pub use context::{LoginError, MountedSession, SessionContext, SessionState};
pub use guard::{GuardOutcome, RoleGuardState, use_role_guard};
pub use http::{ApiError, HttpClient, InterceptorRegistration};
pub use navigate::{NavigationKind, Navigator};
pub use notify::{Notice, NoticeLevel, Notifier, SESSION_EXPIRED_MESSAGE};
pub use profile::{LoginResponse, UserProfile};
pub use role::{RedirectTarget, Role};
pub use store::{SessionRepository, StoreError, StoredSession};
pub use token::{TokenClaims, TokenError};

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use crate::clock::Clock;
    use crate::notify::{NoticeLevel, Notifier};
    use crate::profile::UserProfile;
    use crate::role::Role;

    /// Unsigned token whose payload segment is `payload` verbatim.
    pub fn token_with_payload(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{header}.{body}.signature")
    }

    pub fn token_with_exp(exp_secs: i64) -> String {
        token_with_payload(&format!(r#"{{"user_id":1,"email":"a@example.com","role":"user","exp":{exp_secs}}}"#))
    }

    pub fn sample_user(role: Role, has_address: bool) -> UserProfile {
        UserProfile {
            id: "17".to_owned(),
            name: "Sam".to_owned(),
            email: "sam@example.com".to_owned(),
            role,
            has_address,
        }
    }

    /// Clock the test moves by hand.
    #[derive(Debug)]
    pub struct ManualClock(AtomicI64);

    impl ManualClock {
        pub fn at(now_ms: i64) -> Self {
            Self(AtomicI64::new(now_ms))
        }

        pub fn set(&self, now_ms: i64) {
            self.0.store(now_ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    /// Notifier that keeps every message it was given.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        messages: Mutex<Vec<(NoticeLevel, String)>>,
    }

    impl RecordingNotifier {
        pub fn messages(&self) -> Vec<(NoticeLevel, String)> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: NoticeLevel, message: &str) {
            self.messages.lock().unwrap().push((level, message.to_owned()));
        }
    }
}
