use super::*;

#[test]
fn parses_login_user_with_numeric_id() {
    let raw = r#"{"id":42,"name":"Ada","email":"ada@example.com","role":"seller","has_address":false}"#;
    let user = UserProfile::from_json(raw).unwrap();
    assert_eq!(user.id, "42");
    assert_eq!(user.role, Role::Seller);
    assert!(!user.has_address);
}

#[test]
fn parses_string_id() {
    let raw = r#"{"id":"u-7","name":"Bo","email":"bo@example.com","role":"user","has_address":true}"#;
    assert_eq!(UserProfile::from_json(raw).unwrap().id, "u-7");
}

#[test]
fn missing_has_address_defaults_to_false() {
    let raw = r#"{"id":1,"name":"Cy","email":"cy@example.com","role":"user"}"#;
    assert!(!UserProfile::from_json(raw).unwrap().has_address);
}

#[test]
fn rejects_unknown_role_and_wrong_shapes() {
    assert!(UserProfile::from_json(r#"{"id":1,"name":"x","email":"x","role":"owner"}"#).is_err());
    assert!(UserProfile::from_json(r#"{"id":null,"name":"x","email":"x","role":"user"}"#).is_err());
    assert!(UserProfile::from_json(r#"{"id":[1],"name":"x","email":"x","role":"user"}"#).is_err());
    assert!(UserProfile::from_json("not json").is_err());
    assert!(UserProfile::from_json("[]").is_err());
}

#[test]
fn address_gate_applies_only_to_buyers() {
    let mut user = UserProfile {
        id: "1".to_owned(),
        name: "Dee".to_owned(),
        email: "dee@example.com".to_owned(),
        role: Role::User,
        has_address: false,
    };
    assert!(!user.address_complete());
    user.has_address = true;
    assert!(user.address_complete());

    user.has_address = false;
    user.role = Role::Admin;
    assert!(user.address_complete());
    user.role = Role::Seller;
    assert!(user.address_complete());
}

#[test]
fn serialized_profile_parses_back_identically() {
    let user = UserProfile {
        id: "99".to_owned(),
        name: "Eve".to_owned(),
        email: "eve@example.com".to_owned(),
        role: Role::Admin,
        has_address: true,
    };
    assert_eq!(UserProfile::from_json(&user.to_json().unwrap()).unwrap(), user);
}

#[test]
fn login_response_tolerates_failure_shape() {
    let resp: LoginResponse = serde_json::from_str(r#"{"success":false,"message":"Invalid credentials"}"#).unwrap();
    assert!(!resp.success);
    assert!(resp.token.is_none());
    assert!(resp.user.is_none());
    assert_eq!(resp.message.as_deref(), Some("Invalid credentials"));
}
