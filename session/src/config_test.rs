use super::*;

// Unique variable names keep these tests independent of each other.

#[test]
fn env_parse_reads_valid_values() {
    let key = "__TEST_SESSION_PARSE_OK_311__";
    unsafe { std::env::set_var(key, " 15 ") };
    assert_eq!(env_parse(key, 60_u64), 15);
    unsafe { std::env::remove_var(key) };
}

#[test]
fn env_parse_falls_back_on_garbage() {
    let key = "__TEST_SESSION_PARSE_BAD_312__";
    unsafe { std::env::set_var(key, "soon") };
    assert_eq!(env_parse(key, 60_u64), 60);
    unsafe { std::env::remove_var(key) };
    assert_eq!(env_parse("__TEST_SESSION_PARSE_UNSET_313__", 7_u16), 7);
}

#[test]
fn env_bool_variants() {
    for (i, (val, expected)) in [("1", Some(true)), ("On", Some(true)), ("no", Some(false)), ("maybe", None)]
        .iter()
        .enumerate()
    {
        let key = format!("__TEST_SESSION_BOOL_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), *expected, "for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
    assert_eq!(env_bool("__TEST_SESSION_BOOL_UNSET__"), None);
}

#[test]
fn default_config_uses_sixty_second_watchdog() {
    let config = SessionConfig::default();
    assert_eq!(config.watchdog_interval, Duration::from_secs(60));
    assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    assert!(config.storage_path.is_none());
}
