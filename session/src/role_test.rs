use super::*;

#[test]
fn role_homes_match_dashboards() {
    assert_eq!(Role::Admin.home().path(), "/admin");
    assert_eq!(Role::Seller.home().path(), "/seller");
    assert_eq!(Role::User.home().path(), "/");
}

#[test]
fn only_user_role_requires_address() {
    assert!(Role::User.requires_address());
    assert!(!Role::Admin.requires_address());
    assert!(!Role::Seller.requires_address());
}

#[test]
fn role_parses_case_insensitively() {
    assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
    assert_eq!(" seller ".parse::<Role>(), Ok(Role::Seller));
    assert_eq!("USER".parse::<Role>(), Ok(Role::User));
}

#[test]
fn unknown_role_is_rejected() {
    assert_eq!("buyer".parse::<Role>(), Err(UnknownRole("buyer".to_owned())));
}

#[test]
fn role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Seller).unwrap(), "\"seller\"");
    let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
    assert_eq!(parsed, Role::Admin);
    assert!(serde_json::from_str::<Role>("\"Admin\"").is_err());
}

#[test]
fn redirect_targets_are_the_fixed_route_set() {
    let paths: Vec<&str> = RedirectTarget::ALL.iter().map(|t| t.path()).collect();
    assert_eq!(paths, ["/login", "/access-denied", "/address-completed", "/admin", "/seller", "/"]);
}
