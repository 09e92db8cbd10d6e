//! Tests for bcrypt credential verification

use tw_core::domain::entities::Role;
use tw_core::services::credentials::CredentialVerifier;

use crate::services::credentials::InMemoryCredentialVerifier;

fn hash(password: &str) -> String {
    bcrypt::hash(password, 4).unwrap()
}

#[tokio::test]
async fn test_valid_credentials_yield_principal() {
    let verifier = InMemoryCredentialVerifier::new().with_user(
        "doctor@example.com",
        Role::Doctor,
        "user-1",
        hash("correct horse"),
    );

    let principal = verifier
        .verify("Doctor@Example.com", "correct horse")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(principal.subject_id, "user-1");
    assert_eq!(principal.role, Role::Doctor);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let verifier = InMemoryCredentialVerifier::new().with_user(
        "doctor@example.com",
        Role::Doctor,
        "user-1",
        hash("correct horse"),
    );

    assert!(verifier
        .verify("doctor@example.com", "battery staple")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_unknown_email_is_rejected() {
    let verifier = InMemoryCredentialVerifier::new();

    assert!(verifier
        .verify("nobody@example.com", "anything")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_parse_bootstrap_records() {
    let raw = format!(
        "admin@example.com:ADMIN:admin-1:{};hospital@example.com:hospital:h-1:{}",
        hash("admin-pass"),
        hash("hospital-pass")
    );

    let verifier = InMemoryCredentialVerifier::parse(&raw).unwrap();
    assert_eq!(verifier.len(), 2);

    let principal = verifier
        .verify("hospital@example.com", "hospital-pass")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(principal.role, Role::Hospital);
    assert_eq!(principal.subject_id, "h-1");
}

#[test]
fn test_parse_rejects_unknown_role() {
    let raw = format!("x@example.com:NURSE:n-1:{}", hash("pw"));
    let err = InMemoryCredentialVerifier::parse(&raw).unwrap_err();
    assert_eq!(err.index, 0);
}

#[test]
fn test_parse_rejects_short_record() {
    assert!(InMemoryCredentialVerifier::parse("x@example.com:ADMIN").is_err());
}

#[test]
fn test_parse_rejects_non_bcrypt_hash() {
    assert!(InMemoryCredentialVerifier::parse("x@example.com:ADMIN:a-1:plaintext").is_err());
}

#[test]
fn test_parse_empty_input() {
    let verifier = InMemoryCredentialVerifier::parse(" ; ").unwrap();
    assert!(verifier.is_empty());
}
