//! Transfer token entities.
//!
//! A transfer token authorizes push/pull data transfers. Only the salted hash
//! of its access key is persisted; the plaintext key leaves the service exactly
//! once, wrapped in an [`IssuedTransferToken`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted transfer token, including the access key hash.
///
/// Not `Serialize`: anything crossing the API boundary goes through
/// [`SanitizedTransferToken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferToken {
    /// Identifier assigned by the store
    pub id: Uuid,

    /// Human-readable label
    pub name: String,

    /// Free text description
    pub description: String,

    /// HMAC-SHA512 of the access key, hex encoded
    pub access_key_hash: String,

    /// Validity duration in milliseconds; `None` never expires
    pub lifespan: Option<i64>,

    /// Creation time plus lifespan, fixed at creation
    pub expires_at: Option<DateTime<Utc>>,

    /// Last time the token authorized a transfer
    pub last_used_at: Option<DateTime<Utc>>,

    /// When the token was created
    pub created_at: DateTime<Utc>,

    /// When the token was last modified
    pub updated_at: DateTime<Utc>,

    /// Granted action names
    pub permissions: Vec<String>,
}

impl TransferToken {
    /// Checks whether the token has expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// Drops the access key hash
    pub fn sanitize(self) -> SanitizedTransferToken {
        SanitizedTransferToken::from(self)
    }
}

/// Permission row owned by a transfer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferTokenPermission {
    pub id: Uuid,
    pub action: String,
    pub token_id: Uuid,
}

impl TransferTokenPermission {
    /// Creates a permission row with a fresh identifier
    pub fn new(token_id: Uuid, action: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.into(),
            token_id,
        }
    }
}

/// Transfer token as exposed to readers: no hash, no access key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedTransferToken {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub lifespan: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub permissions: Vec<String>,
}

impl From<TransferToken> for SanitizedTransferToken {
    fn from(token: TransferToken) -> Self {
        Self {
            id: token.id,
            name: token.name,
            description: token.description,
            lifespan: token.lifespan,
            expires_at: token.expires_at,
            last_used_at: token.last_used_at,
            created_at: token.created_at,
            updated_at: token.updated_at,
            permissions: token.permissions,
        }
    }
}

/// Token returned by create and regenerate, carrying the plaintext access key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTransferToken {
    #[serde(flatten)]
    pub token: SanitizedTransferToken,

    /// Plaintext access key; never stored and never returned again
    pub access_key: String,
}
