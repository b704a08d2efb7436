use super::*;

#[test]
fn cli_parses_check_flags() {
    let cli = Cli::try_parse_from([
        "storefront-cli",
        "check",
        "/admin/products/42",
        "--token",
        "a.b.c",
        "--user",
        r#"{"id":1,"name":"S","email":"s@x.io","role":"seller"}"#,
        "--reject-expired",
    ])
    .unwrap();
    let Command::Check(args) = cli.command else {
        panic!("expected check command");
    };
    assert_eq!(args.path, "/admin/products/42");
    assert!(args.reject_expired);
}

#[test]
fn describe_protected_class() {
    let table = RouteTable::storefront();
    let value = describe_class("/admin/products/7", &table.classify("/admin/products/7"));
    assert_eq!(value["class"], "protected");
    assert_eq!(value["role"], "admin");
    assert_eq!(value["prefix"], "/admin");
    assert_eq!(value["known"], true);
}

#[test]
fn describe_redirect_decision() {
    let guard = EdgeGuard::new(RouteTable::storefront(), EdgeOptions::default());
    let user = r#"{"id":1,"name":"S","email":"s@x.io","role":"seller"}"#;
    let decision = guard.evaluate("/admin/products/42", Some("a.b.c"), Some(user));
    let value = describe_decision("/admin/products/42", decision);
    assert_eq!(value["decision"], "redirect");
    assert_eq!(value["location"], "/access-denied");
}

#[test]
fn describe_allow_decision() {
    let guard = EdgeGuard::new(RouteTable::storefront(), EdgeOptions::default());
    let value = describe_decision("/about", guard.evaluate("/about", None, None));
    assert_eq!(value["decision"], "allow");
}
