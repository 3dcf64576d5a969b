//! Unit tests for transfer token entities

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::{IssuedTransferToken, SanitizedTransferToken, TransferToken};

fn sample_token() -> TransferToken {
    let now = Utc::now();
    TransferToken {
        id: Uuid::new_v4(),
        name: "ci-push".to_string(),
        description: "Pushes from CI".to_string(),
        access_key_hash: "a".repeat(128),
        lifespan: Some(Duration::days(7).num_milliseconds()),
        expires_at: Some(now + Duration::days(7)),
        last_used_at: None,
        created_at: now,
        updated_at: now,
        permissions: vec!["push".to_string()],
    }
}

#[test]
fn test_is_expired() {
    let token = sample_token();
    let expires_at = token.expires_at.unwrap();

    assert!(!token.is_expired(expires_at - Duration::seconds(1)));
    assert!(token.is_expired(expires_at));
    assert!(token.is_expired(expires_at + Duration::days(1)));
}

#[test]
fn test_unlimited_token_never_expires() {
    let mut token = sample_token();
    token.lifespan = None;
    token.expires_at = None;

    assert!(!token.is_expired(Utc::now() + Duration::days(36_500)));
}

#[test]
fn test_sanitized_json_has_no_secret_fields() {
    let sanitized: SanitizedTransferToken = sample_token().sanitize();
    let json = serde_json::to_value(&sanitized).unwrap();

    assert!(json.get("accessKeyHash").is_none());
    assert!(json.get("accessKey").is_none());
    assert_eq!(json["name"], "ci-push");
    assert_eq!(json["permissions"], serde_json::json!(["push"]));
    assert!(json.get("expiresAt").is_some());
    assert!(json.get("lastUsedAt").is_some());
}

#[test]
fn test_issued_token_flattens_and_exposes_access_key() {
    let issued = IssuedTransferToken {
        token: sample_token().sanitize(),
        access_key: "plaintext-access-key".to_string(),
    };
    let json = serde_json::to_value(&issued).unwrap();

    assert_eq!(json["accessKey"], "plaintext-access-key");
    assert_eq!(json["name"], "ci-push");
    assert!(json.get("token").is_none());
}
