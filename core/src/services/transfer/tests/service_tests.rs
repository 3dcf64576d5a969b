//! Unit tests for TransferTokenService

use chrono::{Duration, Utc};
use transfer_shared::config::transfer::DAY_MS;
use transfer_shared::config::TransferTokenConfig;
use uuid::Uuid;

use crate::domain::value_objects::{CreateTransferToken, TokenFilter, UpdateTransferToken};
use crate::errors::{ConfigurationError, DomainError, ValidationError};
use crate::repositories::{InMemoryTransferTokenRepository, TransferTokenRepository};
use crate::services::transfer::{
    hash_access_key, AccessKeyHasher, LifespanPolicy, StaticPermissionRegistry,
    TransferTokenService, TransferTokenServiceConfig, ACCESS_KEY_LENGTH,
};

const SALT: &str = "test-salt";

type TestService = TransferTokenService<InMemoryTransferTokenRepository, StaticPermissionRegistry>;

fn service_with(repo: InMemoryTransferTokenRepository) -> TestService {
    TransferTokenService::from_config(
        repo,
        StaticPermissionRegistry::default(),
        &TransferTokenConfig::new(SALT),
    )
}

fn create_service() -> (TestService, InMemoryTransferTokenRepository) {
    let repo = InMemoryTransferTokenRepository::new();
    (service_with(repo.clone()), repo)
}

fn attrs(name: &str, permissions: &[&str]) -> CreateTransferToken {
    CreateTransferToken::new(name, permissions.iter().copied())
}

#[tokio::test]
async fn test_create_generates_key_and_stores_hash() {
    let (service, repo) = create_service();

    let issued = service.create(attrs("ci", &["push"])).await.unwrap();

    assert_eq!(issued.access_key.len(), ACCESS_KEY_LENGTH);
    assert_eq!(issued.token.name, "ci");
    assert_eq!(issued.token.permissions, vec!["push"]);

    let stored = repo.find_by_id(issued.token.id).await.unwrap().unwrap();
    assert_eq!(
        stored.access_key_hash,
        hash_access_key(&issued.access_key, SALT).unwrap()
    );
    assert_ne!(stored.access_key_hash, issued.access_key);
}

#[tokio::test]
async fn test_create_with_supplied_key() {
    let (service, repo) = create_service();

    let issued = service
        .create(attrs("ci", &["pull"]).with_access_key("my-access-key-123"))
        .await
        .unwrap();

    assert_eq!(issued.access_key, "my-access-key-123");
    let stored = repo.find_by_id(issued.token.id).await.unwrap().unwrap();
    assert_eq!(
        stored.access_key_hash,
        hash_access_key("my-access-key-123", SALT).unwrap()
    );
}

#[tokio::test]
async fn test_create_rejects_short_key_without_writes() {
    let (service, repo) = create_service();

    let err = service
        .create(attrs("ci", &["push"]).with_access_key("short"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::InvalidAccessKey { .. })
    ));
    assert_eq!(repo.transactions_started(), 0);
    assert_eq!(repo.token_count().await, 0);
}

#[tokio::test]
async fn test_create_deduplicates_permissions() {
    let (service, repo) = create_service();

    let issued = service
        .create(attrs("ci", &["push", "push", "pull"]))
        .await
        .unwrap();

    assert_eq!(issued.token.permissions, vec!["pull", "push"]);
    assert_eq!(repo.permission_count().await, 2);
}

#[tokio::test]
async fn test_create_with_unknown_permission_writes_nothing() {
    let (service, repo) = create_service();

    let err = service
        .create(attrs("ci", &["push", "admin", "delete"]))
        .await
        .unwrap_err();

    match err {
        DomainError::Validation(ValidationError::UnknownActions { actions }) => {
            assert_eq!(actions, vec!["admin", "delete"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(repo.token_count().await, 0);
    assert_eq!(repo.writes(), 0);
}

#[tokio::test]
async fn test_create_requires_name() {
    let (service, repo) = create_service();

    let err = service.create(attrs("   ", &["push"])).await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::RequiredField { ref field }) if field == "name"
    ));
    assert_eq!(repo.token_count().await, 0);
}

#[tokio::test]
async fn test_create_sets_expiration_from_lifespan() {
    let (service, _repo) = create_service();
    let before = Utc::now();

    let issued = service
        .create(attrs("ci", &["push"]).with_lifespan(Some(7 * DAY_MS)))
        .await
        .unwrap();

    let token = issued.token;
    assert_eq!(token.lifespan, Some(7 * DAY_MS));
    assert_eq!(token.expires_at, Some(token.created_at + Duration::days(7)));
    assert!(token.created_at >= before);
}

#[tokio::test]
async fn test_create_unlimited_lifespan() {
    let (service, _repo) = create_service();

    let issued = service.create(attrs("ci", &["push"])).await.unwrap();

    assert_eq!(issued.token.lifespan, None);
    assert_eq!(issued.token.expires_at, None);
}

#[tokio::test]
async fn test_create_rejects_disallowed_lifespan() {
    let (service, repo) = create_service();

    let err = service
        .create(attrs("ci", &["push"]).with_lifespan(Some(DAY_MS)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::DisallowedLifespan { .. })
    ));
    assert_eq!(repo.transactions_started(), 0);
}

#[tokio::test]
async fn test_create_without_salt_fails() {
    let repo = InMemoryTransferTokenRepository::new();
    let service = TransferTokenService::from_config(
        repo.clone(),
        StaticPermissionRegistry::default(),
        &TransferTokenConfig::default(),
    );

    let err = service.create(attrs("ci", &["push"])).await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::Configuration(ConfigurationError::MissingSalt)
    ));
    assert_eq!(repo.token_count().await, 0);
}

#[tokio::test]
async fn test_create_with_blank_salt_fails() {
    let repo = InMemoryTransferTokenRepository::new();
    let service = TransferTokenService::from_config(
        repo.clone(),
        StaticPermissionRegistry::default(),
        &TransferTokenConfig::new("  "),
    );

    assert!(!service.is_enabled());
    let err = service.create(attrs("ci", &["push"])).await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::Configuration(ConfigurationError::InvalidSalt)
    ));
    assert_eq!(repo.token_count().await, 0);
}

#[tokio::test]
async fn test_create_rolls_back_when_permission_insert_fails() {
    let repo = InMemoryTransferTokenRepository::new().with_failing_action("pull");
    let service = service_with(repo.clone());

    let err = service
        .create(attrs("ci", &["push", "pull"]))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Storage { .. }));
    assert_eq!(repo.token_count().await, 0);
    assert_eq!(repo.permission_count().await, 0);
    assert_eq!(repo.commits(), 0);
}

#[tokio::test]
async fn test_update_missing_token_makes_no_writes() {
    let (service, repo) = create_service();

    let err = service
        .update(Uuid::new_v4(), UpdateTransferToken::default().with_name("x"))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound { .. }));
    assert_eq!(repo.transactions_started(), 0);
    assert_eq!(repo.writes(), 0);
}

#[tokio::test]
async fn test_update_scalar_fields_keeps_permissions() {
    let (service, _repo) = create_service();
    let issued = service.create(attrs("ci", &["push"])).await.unwrap();

    let updated = service
        .update(
            issued.token.id,
            UpdateTransferToken::default()
                .with_name("deploy")
                .with_description("deploy pipeline"),
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "deploy");
    assert_eq!(updated.description, "deploy pipeline");
    assert_eq!(updated.permissions, vec!["push"]);
    assert!(updated.updated_at >= issued.token.updated_at);
}

#[tokio::test]
async fn test_update_replaces_permissions() {
    let (service, repo) = create_service();
    let issued = service.create(attrs("ci", &["push"])).await.unwrap();

    let updated = service
        .update(
            issued.token.id,
            UpdateTransferToken::default().with_permissions(["pull"]),
        )
        .await
        .unwrap();

    assert_eq!(updated.permissions, vec!["pull"]);
    assert_eq!(repo.permission_count().await, 1);
}

#[tokio::test]
async fn test_update_with_empty_permissions_removes_all() {
    let (service, repo) = create_service();
    let issued = service.create(attrs("ci", &["push", "pull"])).await.unwrap();

    let updated = service
        .update(
            issued.token.id,
            UpdateTransferToken::default().with_permissions(Vec::<String>::new()),
        )
        .await
        .unwrap();

    assert!(updated.permissions.is_empty());
    assert_eq!(repo.permission_count().await, 0);
}

#[tokio::test]
async fn test_update_with_unknown_permission_changes_nothing() {
    let (service, repo) = create_service();
    let issued = service.create(attrs("ci", &["push"])).await.unwrap();
    let writes_before = repo.writes();

    let err = service
        .update(
            issued.token.id,
            UpdateTransferToken::default()
                .with_name("renamed")
                .with_permissions(["admin"]),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Validation(ValidationError::UnknownActions { .. })
    ));
    assert_eq!(repo.writes(), writes_before);
    let stored = repo.find_by_id(issued.token.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "ci");
}

#[tokio::test]
async fn test_update_lifespan_keeps_expiration() {
    let (service, _repo) = create_service();
    let issued = service
        .create(attrs("ci", &["push"]).with_lifespan(Some(7 * DAY_MS)))
        .await
        .unwrap();

    let updated = service
        .update(
            issued.token.id,
            UpdateTransferToken::default().with_lifespan(Some(30 * DAY_MS)),
        )
        .await
        .unwrap();

    assert_eq!(updated.lifespan, Some(30 * DAY_MS));
    assert_eq!(updated.expires_at, issued.token.expires_at);
}

#[tokio::test]
async fn test_update_rejects_non_positive_lifespan_like_create() {
    let repo = InMemoryTransferTokenRepository::new();
    let service = TransferTokenService::new(
        repo.clone(),
        StaticPermissionRegistry::default(),
        AccessKeyHasher::new(Some(SALT.to_string())),
        LifespanPolicy::new([0, 7 * DAY_MS]),
        TransferTokenServiceConfig::default(),
    );

    let create_err = service
        .create(attrs("zero", &["push"]).with_lifespan(Some(0)))
        .await
        .unwrap_err();
    assert!(matches!(
        create_err,
        DomainError::Validation(ValidationError::InvalidLifespan { value: 0 })
    ));

    let issued = service
        .create(attrs("ci", &["push"]).with_lifespan(Some(7 * DAY_MS)))
        .await
        .unwrap();
    let writes = repo.commits();

    let update_err = service
        .update(
            issued.token.id,
            UpdateTransferToken::default().with_lifespan(Some(0)),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        update_err,
        DomainError::Validation(ValidationError::InvalidLifespan { value: 0 })
    ));

    assert_eq!(repo.commits(), writes);
    let stored = repo.find_by_id(issued.token.id).await.unwrap().unwrap();
    assert_eq!(stored.lifespan, Some(7 * DAY_MS));
}

#[tokio::test]
async fn test_create_timestamps_have_microsecond_precision() {
    let (service, repo) = create_service();
    let issued = service
        .create(attrs("ci", &["push"]).with_lifespan(Some(7 * DAY_MS)))
        .await
        .unwrap();

    assert_eq!(issued.token.created_at.timestamp_subsec_nanos() % 1_000, 0);
    let expires_at = issued.token.expires_at.unwrap();
    assert_eq!(expires_at.timestamp_subsec_nanos() % 1_000, 0);

    let stored = repo.find_by_id(issued.token.id).await.unwrap().unwrap();
    assert_eq!(stored.created_at, issued.token.created_at);
    assert_eq!(stored.expires_at, issued.token.expires_at);
}

#[tokio::test]
async fn test_update_rolls_back_when_permission_insert_fails() {
    let repo = InMemoryTransferTokenRepository::new().with_failing_action("pull");
    let service = service_with(repo.clone());
    let issued = service.create(attrs("ci", &["push"])).await.unwrap();

    let err = service
        .update(
            issued.token.id,
            UpdateTransferToken::default()
                .with_name("renamed")
                .with_permissions(["pull"]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Storage { .. }));
    let stored = repo.find_by_id(issued.token.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "ci");
    assert_eq!(stored.permissions, vec!["push"]);
}

#[tokio::test]
async fn test_revoke_removes_token_and_permissions() {
    let (service, repo) = create_service();
    let issued = service.create(attrs("ci", &["push", "pull"])).await.unwrap();

    let revoked = service.revoke(issued.token.id).await.unwrap().unwrap();

    assert_eq!(revoked.id, issued.token.id);
    assert_eq!(revoked.permissions, vec!["pull", "push"]);
    assert_eq!(repo.token_count().await, 0);
    assert_eq!(repo.permission_count().await, 0);
}

#[tokio::test]
async fn test_revoke_unknown_token_returns_none() {
    let (service, _repo) = create_service();
    assert!(service.revoke(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_regenerate_replaces_key_only() {
    let (service, repo) = create_service();
    let issued = service
        .create(attrs("ci", &["push"]).with_lifespan(Some(7 * DAY_MS)))
        .await
        .unwrap();

    let regenerated = service.regenerate(issued.token.id).await.unwrap();

    assert_ne!(regenerated.access_key, issued.access_key);
    assert_eq!(regenerated.access_key.len(), ACCESS_KEY_LENGTH);
    assert_eq!(regenerated.token.name, issued.token.name);
    assert_eq!(regenerated.token.lifespan, issued.token.lifespan);
    assert_eq!(regenerated.token.expires_at, issued.token.expires_at);
    assert_eq!(regenerated.token.permissions, vec!["push"]);

    let stored = repo.find_by_id(issued.token.id).await.unwrap().unwrap();
    assert_eq!(
        stored.access_key_hash,
        hash_access_key(&regenerated.access_key, SALT).unwrap()
    );
    assert!(service
        .get_by_access_key(&issued.access_key)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_regenerate_unknown_token() {
    let (service, _repo) = create_service();
    let err = service.regenerate(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_list_orders_by_name() {
    let (service, _repo) = create_service();
    for name in ["gamma", "alpha", "beta"] {
        service.create(attrs(name, &["pull"])).await.unwrap();
    }

    let names: Vec<String> = service
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|token| token.name)
        .collect();

    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
}

#[tokio::test]
async fn test_list_serialization_has_no_secrets() {
    let (service, _repo) = create_service();
    service.create(attrs("ci", &["push"])).await.unwrap();

    let json = serde_json::to_value(service.list().await.unwrap()).unwrap();
    let token = &json[0];

    assert!(token.get("accessKeyHash").is_none());
    assert!(token.get("accessKey").is_none());
    assert_eq!(token["name"], "ci");
}

#[tokio::test]
async fn test_issued_token_serializes_access_key() {
    let (service, _repo) = create_service();
    let issued = service.create(attrs("ci", &["push"])).await.unwrap();

    let json = serde_json::to_value(&issued).unwrap();

    assert_eq!(json["accessKey"], issued.access_key.as_str());
    assert_eq!(json["name"], "ci");
    assert!(json.get("accessKeyHash").is_none());
}

#[tokio::test]
async fn test_get_by_lookups() {
    let (service, _repo) = create_service();
    let issued = service
        .create(attrs("ci", &["push"]).with_access_key("my-access-key-123"))
        .await
        .unwrap();

    let by_id = service.get_by_id(issued.token.id).await.unwrap().unwrap();
    let by_name = service.get_by_name("ci").await.unwrap().unwrap();
    let by_key = service
        .get_by_access_key("my-access-key-123")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(by_id.id, issued.token.id);
    assert_eq!(by_name.id, issued.token.id);
    assert_eq!(by_key.id, issued.token.id);
    assert!(service.get_by_name("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_empty_filter_finds_nothing() {
    let (service, _repo) = create_service();
    service.create(attrs("ci", &["push"])).await.unwrap();

    assert!(service.get_by(&TokenFilter::default()).await.unwrap().is_none());
    assert!(!service.exists(&TokenFilter::default()).await.unwrap());
    assert!(service.exists(&TokenFilter::by_name("ci")).await.unwrap());
}

#[tokio::test]
async fn test_mark_used_sets_last_used_at() {
    let (service, _repo) = create_service();
    let issued = service.create(attrs("ci", &["push"])).await.unwrap();
    let at = Utc::now();

    let used = service.mark_used(issued.token.id, at).await.unwrap().unwrap();

    assert_eq!(used.last_used_at, Some(at));
    assert!(service
        .mark_used(Uuid::new_v4(), at)
        .await
        .unwrap()
        .is_none());
}

#[test]
fn test_enabled_requires_salt_and_flag() {
    let repo = InMemoryTransferTokenRepository::new();
    let registry = StaticPermissionRegistry::default();

    let salted = TransferTokenService::from_config(
        repo.clone(),
        registry.clone(),
        &TransferTokenConfig::new(SALT),
    );
    assert!(salted.is_enabled());
    assert!(salted.check_salt_configured());

    let unsalted = TransferTokenService::from_config(
        repo.clone(),
        registry.clone(),
        &TransferTokenConfig::default(),
    );
    assert!(!unsalted.is_enabled());
    assert!(!unsalted.check_salt_configured());

    let disabled = TransferTokenService::from_config(
        repo,
        registry,
        &TransferTokenConfig::new(SALT).disabled(),
    );
    assert!(!disabled.is_enabled());
}
