//! Unit tests for token entities

use chrono::{Duration, TimeZone, Utc};

use crate::domain::entities::{Identity, Role, TokenKind, TokenPair, JWT_ISSUER};

fn issued_at() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

#[test]
fn test_identity_claims() {
    let identity = Identity::new(
        "user-1",
        Role::Doctor,
        TokenKind::Access,
        "session-1",
        issued_at(),
        Duration::minutes(15),
        JWT_ISSUER,
    );

    assert_eq!(identity.sub, "user-1");
    assert_eq!(identity.role, Role::Doctor);
    assert_eq!(identity.kind, TokenKind::Access);
    assert_eq!(identity.sid, "session-1");
    assert_eq!(identity.iss, JWT_ISSUER);
    assert_eq!(identity.exp - identity.iat, 900);
    assert!(!identity.jti.is_empty());
}

#[test]
fn test_each_identity_gets_a_fresh_jti() {
    let a = Identity::new("u", Role::Admin, TokenKind::Access, "s", issued_at(), Duration::minutes(1), JWT_ISSUER);
    let b = Identity::new("u", Role::Admin, TokenKind::Access, "s", issued_at(), Duration::minutes(1), JWT_ISSUER);
    assert_ne!(a.jti, b.jti);
}

#[test]
fn test_expiry_boundary() {
    let identity = Identity::new(
        "user-1",
        Role::Hospital,
        TokenKind::Refresh,
        "session-1",
        issued_at(),
        Duration::seconds(10),
        JWT_ISSUER,
    );

    assert!(!identity.is_expired_at(issued_at() + Duration::seconds(9)));
    assert!(identity.is_expired_at(issued_at() + Duration::seconds(10)));
    assert!(identity.is_expired_at(issued_at() + Duration::seconds(11)));
}

#[test]
fn test_remaining_ttl_saturates_at_zero() {
    let identity = Identity::new(
        "user-1",
        Role::Hospital,
        TokenKind::Refresh,
        "session-1",
        issued_at(),
        Duration::seconds(10),
        JWT_ISSUER,
    );

    assert_eq!(
        identity.remaining_ttl(issued_at() + Duration::seconds(4)),
        std::time::Duration::from_secs(6)
    );
    assert_eq!(
        identity.remaining_ttl(issued_at() + Duration::seconds(60)),
        std::time::Duration::ZERO
    );
    assert_eq!(
        identity.expires_at(),
        Some(issued_at() + Duration::seconds(10))
    );
}

#[test]
fn test_token_kind_serialization() {
    assert_eq!(serde_json::to_string(&TokenKind::Access).unwrap(), "\"access\"");
    assert_eq!(TokenKind::Refresh.to_string(), "refresh");
}

#[test]
fn test_token_pair_creation() {
    let pair = TokenPair::new(
        "access".to_string(),
        "refresh".to_string(),
        900,
        604800,
        "session-1".to_string(),
    );

    assert_eq!(pair.token_type, "Bearer");
    assert_eq!(pair.access_expires_in, 900);
    assert_eq!(pair.refresh_expires_in, 604800);
    assert_eq!(pair.session_id, "session-1");
}

#[test]
fn test_sub_second_issue_rounds_expiry_up() {
    let issued = Utc.timestamp_opt(1_700_000_000, 999_000_000).unwrap();
    let identity = Identity::new(
        "user-1",
        Role::Doctor,
        TokenKind::Access,
        "session-1",
        issued,
        Duration::seconds(1),
        JWT_ISSUER,
    );

    assert_eq!(identity.iat, 1_700_000_000);
    assert_eq!(identity.exp, 1_700_000_002);
    assert!(!identity.is_expired_at(issued + Duration::milliseconds(1)));
    assert!(!identity.is_expired_at(issued + Duration::milliseconds(999)));
    assert!(identity.is_expired_at(issued + Duration::seconds(2)));
}
