//! Unit tests for lifespan policy and expiration derivation

use chrono::{Duration, TimeZone, Utc};
use transfer_shared::config::transfer::DAY_MS;

use crate::errors::ValidationError;
use crate::services::transfer::{resolve_expiration_at, LifespanPolicy};

#[test]
fn test_unlimited_lifespan_has_no_expiration() {
    let now = Utc::now();
    let fields = resolve_expiration_at(None, now).unwrap();
    assert_eq!(fields.lifespan, None);
    assert_eq!(fields.expires_at, None);
}

#[test]
fn test_expiration_is_creation_plus_lifespan() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let fields = resolve_expiration_at(Some(7 * DAY_MS), now).unwrap();

    assert_eq!(fields.lifespan, Some(7 * DAY_MS));
    assert_eq!(fields.expires_at, Some(now + Duration::days(7)));
}

#[test]
fn test_non_positive_lifespan_rejected() {
    let now = Utc::now();
    for value in [0, -1, -DAY_MS] {
        assert_eq!(
            resolve_expiration_at(Some(value), now).unwrap_err(),
            ValidationError::InvalidLifespan { value }
        );
    }
}

#[test]
fn test_overflowing_lifespan_rejected() {
    let now = Utc::now();
    assert!(matches!(
        resolve_expiration_at(Some(i64::MAX), now),
        Err(ValidationError::InvalidLifespan { .. })
    ));
}

#[test]
fn test_default_policy_allows_standard_lifespans() {
    let policy = LifespanPolicy::default();
    assert!(policy.assert_valid_lifespan(None).is_ok());
    assert!(policy.assert_valid_lifespan(Some(7 * DAY_MS)).is_ok());
    assert!(policy.assert_valid_lifespan(Some(30 * DAY_MS)).is_ok());
    assert!(policy.assert_valid_lifespan(Some(90 * DAY_MS)).is_ok());
}

#[test]
fn test_policy_rejects_other_values() {
    let policy = LifespanPolicy::default();
    let err = policy.assert_valid_lifespan(Some(DAY_MS)).unwrap_err();
    assert!(matches!(err, ValidationError::DisallowedLifespan { value, .. } if value == DAY_MS));
}

#[test]
fn test_custom_policy() {
    let policy = LifespanPolicy::new([DAY_MS]);
    assert_eq!(policy.allowed(), &[DAY_MS]);
    assert!(policy.assert_valid_lifespan(Some(DAY_MS)).is_ok());
    assert!(policy.assert_valid_lifespan(Some(7 * DAY_MS)).is_err());
}

#[test]
fn test_resolve_expiration_uses_current_time() {
    let before = Utc::now();
    let fields = crate::services::transfer::resolve_expiration(Some(30 * DAY_MS)).unwrap();
    let after = Utc::now();

    let expires_at = fields.expires_at.unwrap();
    assert!(expires_at >= before + Duration::days(30));
    assert!(expires_at <= after + Duration::days(30));
}
