use super::*;
use crate::navigate::NavigationLog;
use crate::role::Role;
use crate::store::{CookieStore, JarCookies};
use crate::test_helpers::{ManualClock, RecordingNotifier, sample_user, token_with_exp};

const NOW_MS: i64 = 1_700_000_000_000;
const FRESH_EXP: i64 = 1_700_003_600;
const STALE_EXP: i64 = 1_699_999_000;

struct Harness {
    ctx: Arc<SessionContext>,
    nav: Arc<NavigationLog>,
    notes: Arc<RecordingNotifier>,
    clock: Arc<ManualClock>,
    cookies: Arc<JarCookies>,
}

fn harness() -> Harness {
    let (repo, cookies) = SessionRepository::in_memory();
    let nav = Arc::new(NavigationLog::new());
    let notes = Arc::new(RecordingNotifier::default());
    let clock = Arc::new(ManualClock::at(NOW_MS));
    let ctx = SessionContext::with_clock(repo, nav.clone(), notes.clone(), clock.clone());
    Harness { ctx, nav, notes, clock, cookies }
}

fn accepted(token: &str, role: Role, has_address: bool) -> LoginResponse {
    LoginResponse {
        success: true,
        token: Some(token.to_owned()),
        user: Some(sample_user(role, has_address)),
        message: None,
    }
}

fn expired_notices(notes: &RecordingNotifier) -> usize {
    notes
        .messages()
        .iter()
        .filter(|(level, msg)| *level == NoticeLevel::Error && msg == SESSION_EXPIRED_MESSAGE)
        .count()
}

// =============================================================================
// initial state
// =============================================================================

#[test]
fn starts_unauthenticated() {
    let h = harness();
    assert_eq!(h.ctx.state(), SessionState::default());
    assert!(h.ctx.user().is_none());
    assert!(!h.ctx.is_authenticated());
}

#[test]
fn initialize_with_empty_stores_stays_signed_out() {
    let h = harness();
    h.ctx.initialize();
    assert!(!h.ctx.is_authenticated());
    assert!(h.nav.entries().is_empty());
    assert!(h.notes.messages().is_empty());
}

#[test]
fn initialize_restores_a_valid_session() {
    let h = harness();
    let token = token_with_exp(FRESH_EXP);
    h.ctx.repository().write(&token, &sample_user(Role::Seller, false)).unwrap();

    h.ctx.initialize();

    assert!(h.ctx.is_authenticated());
    assert!(h.ctx.has_address());
    assert_eq!(h.ctx.user().map(|u| u.role), Some(Role::Seller));
}

#[test]
fn initialize_with_expired_token_logs_out_and_notifies_once() {
    let h = harness();
    let token = token_with_exp(STALE_EXP);
    h.ctx.repository().write(&token, &sample_user(Role::Admin, true)).unwrap();

    h.ctx.initialize();

    assert!(!h.ctx.is_authenticated());
    assert!(h.ctx.repository().stored_token().is_none());
    assert_eq!(h.nav.entries(), vec![(RedirectTarget::Login, NavigationKind::Full)]);
    assert_eq!(expired_notices(&h.notes), 1);
}

#[test]
fn initialize_with_undecodable_token_is_treated_as_expired() {
    let h = harness();
    h.ctx.repository().write("garbage", &sample_user(Role::User, true)).unwrap();

    h.ctx.initialize();

    assert!(!h.ctx.is_authenticated());
    assert!(h.cookies.get(crate::store::TOKEN_COOKIE).is_none());
    assert_eq!(expired_notices(&h.notes), 1);
}

// =============================================================================
// login / logout
// =============================================================================

#[test]
fn login_writes_both_stores_and_derives_address_flag() {
    let h = harness();
    let token = token_with_exp(FRESH_EXP);

    let user = h.ctx.login(accepted(&token, Role::User, false)).unwrap();

    assert_eq!(user.role, Role::User);
    assert!(h.ctx.is_authenticated());
    assert!(!h.ctx.has_address());
    assert_eq!(h.cookies.get(crate::store::TOKEN_COOKIE).as_deref(), Some(token.as_str()));
    assert_eq!(h.ctx.repository().read().map(|s| s.token), Some(token));
}

#[test]
fn login_rejected_response_is_an_error() {
    let h = harness();
    let response = LoginResponse {
        success: false,
        token: None,
        user: None,
        message: Some("bad password".to_owned()),
    };
    let err = h.ctx.login(response).unwrap_err();
    assert!(matches!(err, LoginError::Rejected(ref m) if m == "bad password"));
    assert!(!h.ctx.is_authenticated());
}

#[test]
fn login_without_token_or_user_is_incomplete() {
    let h = harness();
    let mut response = accepted("", Role::User, true);
    assert!(matches!(h.ctx.login(response.clone()), Err(LoginError::Incomplete("token"))));
    response.token = Some("h.p.s".to_owned());
    response.user = None;
    assert!(matches!(h.ctx.login(response), Err(LoginError::Incomplete("user"))));
    assert!(h.ctx.repository().stored_token().is_none());
}

#[test]
fn logout_clears_everything_and_reloads_login() {
    let h = harness();
    h.ctx.login(accepted(&token_with_exp(FRESH_EXP), Role::Admin, true)).unwrap();

    h.ctx.logout();

    assert_eq!(h.ctx.state(), SessionState::default());
    assert!(h.ctx.repository().read().is_none());
    assert!(h.cookies.header_value().is_none());
    assert_eq!(h.nav.last(), Some((RedirectTarget::Login, NavigationKind::Full)));
    assert!(h.notes.messages().is_empty());
}

// =============================================================================
// expiry checks
// =============================================================================

#[test]
fn check_expiry_is_a_noop_without_token() {
    let h = harness();
    assert!(!h.ctx.check_expiry());
    assert!(h.nav.entries().is_empty());
}

#[test]
fn check_expiry_keeps_a_fresh_session() {
    let h = harness();
    h.ctx.login(accepted(&token_with_exp(FRESH_EXP), Role::Admin, true)).unwrap();
    assert!(!h.ctx.check_expiry());
    assert!(h.ctx.is_authenticated());
}

#[test]
fn check_expiry_logs_out_once_the_clock_passes_exp() {
    let h = harness();
    h.ctx.login(accepted(&token_with_exp(FRESH_EXP), Role::Admin, true)).unwrap();
    h.clock.set(FRESH_EXP * 1000);

    assert!(h.ctx.check_expiry());
    assert!(!h.ctx.check_expiry());

    assert!(!h.ctx.is_authenticated());
    assert_eq!(expired_notices(&h.notes), 1);
}

#[test]
fn same_token_reinjected_does_not_notify_twice() {
    let h = harness();
    let token = token_with_exp(STALE_EXP);
    h.ctx.repository().write(&token, &sample_user(Role::Admin, true)).unwrap();
    assert!(h.ctx.check_expiry());

    h.ctx.repository().write(&token, &sample_user(Role::Admin, true)).unwrap();
    assert!(h.ctx.check_expiry());

    assert_eq!(expired_notices(&h.notes), 1);
}

#[test]
fn a_new_login_rearms_the_notification() {
    let h = harness();
    let token = token_with_exp(STALE_EXP);
    h.ctx.repository().write(&token, &sample_user(Role::Admin, true)).unwrap();
    h.ctx.check_expiry();

    h.ctx.login(accepted(&token, Role::Admin, true)).unwrap();
    h.ctx.check_expiry();

    assert_eq!(expired_notices(&h.notes), 2);
}

// =============================================================================
// unauthorized handling
// =============================================================================

#[test]
fn unauthorized_on_seller_page_signs_out_with_notice() {
    let h = harness();
    h.ctx.login(accepted(&token_with_exp(FRESH_EXP), Role::Seller, true)).unwrap();

    h.ctx.handle_unauthorized();

    assert!(!h.ctx.is_authenticated());
    assert!(h.ctx.repository().read().is_none());
    assert!(h.cookies.get(crate::store::USER_COOKIE).is_none());
    assert_eq!(h.nav.last(), Some((RedirectTarget::Login, NavigationKind::Full)));
    assert_eq!(expired_notices(&h.notes), 1);
}

#[test]
fn repeated_unauthorized_responses_log_out_once() {
    let h = harness();
    h.ctx.login(accepted(&token_with_exp(FRESH_EXP), Role::Seller, true)).unwrap();

    h.ctx.handle_unauthorized();
    h.ctx.handle_unauthorized();
    h.ctx.handle_unauthorized();

    assert_eq!(h.nav.entries().len(), 1);
    assert_eq!(expired_notices(&h.notes), 1);
}

#[test]
fn unauthorized_while_signed_out_does_nothing() {
    let h = harness();
    h.ctx.handle_unauthorized();
    assert!(h.nav.entries().is_empty());
    assert!(h.notes.messages().is_empty());
}

// =============================================================================
// mount
// =============================================================================

#[tokio::test]
async fn mount_registers_and_unmount_releases_the_interceptor() {
    let h = harness();
    let http = HttpClient::new("http://127.0.0.1:9").unwrap();

    let mounted = h.ctx.mount(&http, Duration::from_secs(60));
    assert_eq!(http.hook_count(), 1);
    assert!(mounted.watchdog_running());

    mounted.unmount();
    assert_eq!(http.hook_count(), 0);
}

#[tokio::test]
async fn mounted_interceptor_forces_logout_on_401() {
    let h = harness();
    h.ctx.login(accepted(&token_with_exp(FRESH_EXP), Role::Seller, true)).unwrap();
    let http = HttpClient::new("http://127.0.0.1:9").unwrap();
    let _mounted = h.ctx.mount(&http, Duration::from_secs(60));

    http.observe(reqwest::StatusCode::UNAUTHORIZED);

    assert!(!h.ctx.is_authenticated());
    assert_eq!(expired_notices(&h.notes), 1);
}

#[tokio::test]
async fn dropped_mount_no_longer_reacts_to_401() {
    let h = harness();
    h.ctx.login(accepted(&token_with_exp(FRESH_EXP), Role::Seller, true)).unwrap();
    let http = HttpClient::new("http://127.0.0.1:9").unwrap();
    drop(h.ctx.mount(&http, Duration::from_secs(60)));

    http.observe(reqwest::StatusCode::UNAUTHORIZED);

    assert!(h.ctx.is_authenticated());
    assert!(h.notes.messages().is_empty());
}
