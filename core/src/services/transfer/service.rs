//! Main transfer token service implementation

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use transfer_shared::config::TransferTokenConfig;

use crate::domain::entities::{IssuedTransferToken, SanitizedTransferToken, TransferToken};
use crate::domain::value_objects::{
    CreateTransferToken, NewTransferToken, TokenChanges, TokenFilter, TokenOrder,
    UpdateTransferToken,
};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::{TransferTokenRepository, TransferTokenTransaction};

use super::config::TransferTokenServiceConfig;
use super::hasher::AccessKeyHasher;
use super::lifespan::{resolve_expiration_at, LifespanPolicy};
use super::permissions::{diff_permissions, validate_permissions, PermissionRegistry};
use super::secret::{generate_access_key, validate_access_key};

/// Service issuing and administering transfer tokens
///
/// Stateless apart from its collaborators: every mutation runs inside one
/// store transaction, and every validation happens before that transaction
/// opens.
pub struct TransferTokenService<R: TransferTokenRepository, P: PermissionRegistry> {
    repository: R,
    registry: P,
    hasher: AccessKeyHasher,
    lifespans: LifespanPolicy,
    config: TransferTokenServiceConfig,
}

impl<R: TransferTokenRepository, P: PermissionRegistry> TransferTokenService<R, P> {
    /// Creates a service from explicit collaborators
    ///
    /// # Arguments
    ///
    /// * `repository` - Token store
    /// * `registry` - Source of valid action names
    /// * `hasher` - Salted access key hasher
    /// * `lifespans` - Allowed lifespan values
    /// * `config` - Service configuration
    pub fn new(
        repository: R,
        registry: P,
        hasher: AccessKeyHasher,
        lifespans: LifespanPolicy,
        config: TransferTokenServiceConfig,
    ) -> Self {
        Self {
            repository,
            registry,
            hasher,
            lifespans,
            config,
        }
    }

    /// Creates a service whose hasher, lifespan policy and flags come from `config`
    pub fn from_config(repository: R, registry: P, config: &TransferTokenConfig) -> Self {
        Self::new(
            repository,
            registry,
            AccessKeyHasher::from_config(config),
            LifespanPolicy::from_config(config),
            TransferTokenServiceConfig::from(config),
        )
    }

    /// Whether transfer tokens can be issued: not disabled and salted
    pub fn is_enabled(&self) -> bool {
        !self.config.disabled && self.hasher.has_valid_salt()
    }

    /// Startup probe for the hashing salt
    ///
    /// Logs a warning when the salt is missing unless the feature is
    /// disabled. Never fails.
    ///
    /// # Returns
    ///
    /// `true` when a usable salt is configured
    pub fn check_salt_configured(&self) -> bool {
        if self.hasher.has_valid_salt() {
            return true;
        }
        if !self.config.disabled {
            warn!(
                "Missing transfer token salt. Transfer tokens cannot be issued until \
                 TRANSFER_TOKEN_SALT is set; set TRANSFER_TOKENS_DISABLED=true to silence this warning"
            );
        }
        false
    }

    /// Lists every token ordered by name, without secrets
    pub async fn list(&self) -> DomainResult<Vec<SanitizedTransferToken>> {
        let tokens = self
            .repository
            .find_many(&TokenFilter::default(), TokenOrder::NameAsc)
            .await?;
        Ok(tokens.into_iter().map(TransferToken::sanitize).collect())
    }

    /// Issues a new transfer token
    ///
    /// # Arguments
    ///
    /// * `attrs` - Name, description, optional access key, lifespan and permissions
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedTransferToken)` - The token with its plaintext access key
    /// * `Err(DomainError::Validation)` - Invalid key, name, permissions or lifespan
    /// * `Err(DomainError::Configuration)` - No salt configured
    pub async fn create(&self, attrs: CreateTransferToken) -> DomainResult<IssuedTransferToken> {
        // The supplied key goes no further than this binding
        let CreateTransferToken {
            name,
            description,
            access_key,
            lifespan,
            permissions,
        } = attrs;

        let access_key = match access_key {
            Some(candidate) => validate_access_key(&candidate)?,
            None => generate_access_key(),
        };
        let name = require_name(name)?;
        let actions = validate_permissions(&self.registry, &permissions)?;
        self.lifespans.assert_valid_lifespan(lifespan)?;

        // Stores keep microseconds
        let now = Utc::now().trunc_subsecs(6);
        let expiration = resolve_expiration_at(lifespan, now)?;
        let access_key_hash = self.hasher.hash(&access_key)?;

        let mut tx = self.repository.begin().await?;
        let mut token = tx
            .insert_token(NewTransferToken {
                name,
                description,
                access_key_hash,
                lifespan: expiration.lifespan,
                expires_at: expiration.expires_at,
                created_at: now,
            })
            .await?;
        for action in &actions {
            tx.insert_permission(token.id, action).await?;
        }
        token.permissions = permission_actions(&mut tx, token.id).await?;
        tx.commit().await?;

        info!(
            token_id = %token.id,
            permissions = ?token.permissions,
            expires_at = ?token.expires_at,
            "Transfer token created"
        );

        Ok(IssuedTransferToken {
            token: token.sanitize(),
            access_key,
        })
    }

    /// Updates name, description, lifespan and permissions of a token
    ///
    /// `expires_at` keeps the value fixed at creation even when the lifespan
    /// changes. Permissions are reconciled only when `attrs.permissions` is
    /// present; an empty list removes every permission.
    ///
    /// # Returns
    ///
    /// * `Ok(SanitizedTransferToken)` - The updated token
    /// * `Err(DomainError::NotFound)` - No token has this id
    /// * `Err(DomainError::Validation)` - Invalid name, permissions or lifespan
    pub async fn update(
        &self,
        id: Uuid,
        attrs: UpdateTransferToken,
    ) -> DomainResult<SanitizedTransferToken> {
        if self.repository.find_by_id(id).await?.is_none() {
            return Err(DomainError::token_not_found(id));
        }

        let UpdateTransferToken {
            name,
            description,
            lifespan,
            permissions,
        } = attrs;

        let name = name.map(require_name).transpose()?;
        let desired = permissions
            .as_ref()
            .map(|requested| validate_permissions(&self.registry, requested))
            .transpose()?;
        if let Some(lifespan) = lifespan {
            self.lifespans.assert_valid_lifespan(lifespan)?;
            // Same bounds as create; the stored expiration is left alone
            resolve_expiration_at(lifespan, Utc::now())?;
        }

        let changes = TokenChanges {
            name,
            description,
            lifespan,
            ..Default::default()
        };

        let mut tx = self.repository.begin().await?;
        let mut token = tx
            .update_token(id, &changes)
            .await?
            .ok_or_else(|| DomainError::token_not_found(id))?;

        if let Some(desired) = desired {
            let current = permission_actions(&mut tx, id).await?;
            let diff = diff_permissions(&current, &desired);
            for action in &diff.to_remove {
                tx.delete_permission(id, action).await?;
            }
            for action in &diff.to_add {
                tx.insert_permission(id, action).await?;
            }
            debug!(
                token_id = %id,
                added = ?diff.to_add,
                removed = ?diff.to_remove,
                "Reconciled transfer token permissions"
            );
        }

        token.permissions = permission_actions(&mut tx, id).await?;
        tx.commit().await?;

        info!(token_id = %id, "Transfer token updated");
        Ok(token.sanitize())
    }

    /// Deletes a token together with its permissions
    ///
    /// # Returns
    ///
    /// * `Ok(Some(SanitizedTransferToken))` - Snapshot of the revoked token
    /// * `Ok(None)` - No token had this id; nothing changed
    pub async fn revoke(&self, id: Uuid) -> DomainResult<Option<SanitizedTransferToken>> {
        let mut tx = self.repository.begin().await?;
        let deleted = tx.delete_token(id).await?;
        tx.commit().await?;

        match &deleted {
            Some(_) => info!(token_id = %id, "Transfer token revoked"),
            None => debug!(token_id = %id, "Revoke requested for unknown transfer token"),
        }
        Ok(deleted.map(TransferToken::sanitize))
    }

    /// Replaces the access key of a token
    ///
    /// Lifespan, expiration, name and permissions are left as they were.
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedTransferToken)` - The token with its new plaintext access key
    /// * `Err(DomainError::NotFound)` - No token has this id
    pub async fn regenerate(&self, id: Uuid) -> DomainResult<IssuedTransferToken> {
        let access_key = generate_access_key();
        let changes = TokenChanges::access_key_hash(self.hasher.hash(&access_key)?);

        let mut tx = self.repository.begin().await?;
        let token = tx
            .update_token(id, &changes)
            .await?
            .ok_or_else(|| DomainError::token_not_found(id))?;
        tx.commit().await?;

        info!(token_id = %id, "Transfer token access key regenerated");
        Ok(IssuedTransferToken {
            token: token.sanitize(),
            access_key,
        })
    }

    /// Records that a token authorized a transfer
    ///
    /// # Returns
    ///
    /// * `Ok(Some(SanitizedTransferToken))` - The token with `last_used_at` set
    /// * `Ok(None)` - No token has this id
    pub async fn mark_used(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> DomainResult<Option<SanitizedTransferToken>> {
        let mut tx = self.repository.begin().await?;
        let token = tx.update_token(id, &TokenChanges::last_used_at(at)).await?;
        tx.commit().await?;
        Ok(token.map(TransferToken::sanitize))
    }

    /// Looks up a single token; an empty filter finds nothing
    pub async fn get_by(&self, filter: &TokenFilter) -> DomainResult<Option<SanitizedTransferToken>> {
        if filter.is_empty() {
            return Ok(None);
        }
        let token = self.repository.find_one(filter).await?;
        Ok(token.map(TransferToken::sanitize))
    }

    pub async fn get_by_id(&self, id: Uuid) -> DomainResult<Option<SanitizedTransferToken>> {
        self.get_by(&TokenFilter::by_id(id)).await
    }

    pub async fn get_by_name(&self, name: &str) -> DomainResult<Option<SanitizedTransferToken>> {
        self.get_by(&TokenFilter::by_name(name)).await
    }

    /// Looks up the token owning a plaintext access key
    pub async fn get_by_access_key(
        &self,
        access_key: &str,
    ) -> DomainResult<Option<SanitizedTransferToken>> {
        let hash = self.hasher.hash(access_key)?;
        self.get_by(&TokenFilter::by_access_key_hash(hash)).await
    }

    /// Whether a token matches `filter`
    pub async fn exists(&self, filter: &TokenFilter) -> DomainResult<bool> {
        Ok(self.get_by(filter).await?.is_some())
    }
}

/// Reads the action names currently granted to a token
async fn permission_actions<T: TransferTokenTransaction>(
    tx: &mut T,
    token_id: Uuid,
) -> DomainResult<Vec<String>> {
    let mut actions: Vec<String> = tx
        .load_permissions(token_id)
        .await?
        .into_iter()
        .map(|permission| permission.action)
        .collect();
    actions.sort();
    Ok(actions)
}

fn require_name(name: String) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "name".to_string(),
        });
    }
    Ok(trimmed.to_string())
}
