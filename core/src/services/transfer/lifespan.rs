//! Token lifespan policy and expiration derivation

use chrono::{DateTime, Duration, Utc};
use transfer_shared::config::transfer::DEFAULT_ALLOWED_LIFESPANS_MS;
use transfer_shared::config::TransferTokenConfig;

use crate::errors::ValidationError;

/// Lifespan and the expiration derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationFields {
    pub lifespan: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Derives expiration fields relative to the current time
pub fn resolve_expiration(lifespan: Option<i64>) -> Result<ExpirationFields, ValidationError> {
    resolve_expiration_at(lifespan, Utc::now())
}

/// Derives expiration fields relative to `now`
pub fn resolve_expiration_at(
    lifespan: Option<i64>,
    now: DateTime<Utc>,
) -> Result<ExpirationFields, ValidationError> {
    let Some(value) = lifespan else {
        return Ok(ExpirationFields {
            lifespan: None,
            expires_at: None,
        });
    };

    let expires_at = (value > 0)
        .then(|| Duration::try_milliseconds(value))
        .flatten()
        .and_then(|duration| now.checked_add_signed(duration))
        .ok_or(ValidationError::InvalidLifespan { value })?;

    Ok(ExpirationFields {
        lifespan: Some(value),
        expires_at: Some(expires_at),
    })
}

/// Closed set of lifespans administrators may choose from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifespanPolicy {
    allowed: Vec<i64>,
}

impl Default for LifespanPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_LIFESPANS_MS)
    }
}

impl LifespanPolicy {
    pub fn new(allowed: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn from_config(config: &TransferTokenConfig) -> Self {
        Self::new(config.allowed_lifespans_ms.iter().copied())
    }

    /// Allowed values in milliseconds (unlimited is implied)
    pub fn allowed(&self) -> &[i64] {
        &self.allowed
    }

    /// Accepts `None` (unlimited) or a member of the allowed set
    pub fn assert_valid_lifespan(&self, lifespan: Option<i64>) -> Result<(), ValidationError> {
        match lifespan {
            None => Ok(()),
            Some(value) if self.allowed.contains(&value) => Ok(()),
            Some(value) => Err(ValidationError::DisallowedLifespan {
                value,
                allowed: self.allowed.clone(),
            }),
        }
    }
}
