//! Store-facing query and mutation descriptors for transfer tokens.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::TransferToken;

/// Data for inserting a token row; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransferToken {
    pub name: String,
    pub description: String,
    pub access_key_hash: String,
    pub lifespan: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Single-record lookup criteria. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenFilter {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub access_key_hash: Option<String>,
}

impl TokenFilter {
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn by_access_key_hash(hash: impl Into<String>) -> Self {
        Self {
            access_key_hash: Some(hash.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_last_used_at(mut self, last_used_at: DateTime<Utc>) -> Self {
        self.last_used_at = Some(last_used_at);
        self
    }

    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.last_used_at.is_none()
            && self.access_key_hash.is_none()
    }

    /// Evaluates the filter against a token
    pub fn matches(&self, token: &TransferToken) -> bool {
        self.id.map_or(true, |id| token.id == id)
            && self.name.as_ref().map_or(true, |name| &token.name == name)
            && self
                .description
                .as_ref()
                .map_or(true, |description| &token.description == description)
            && self
                .last_used_at
                .map_or(true, |at| token.last_used_at == Some(at))
            && self
                .access_key_hash
                .as_ref()
                .map_or(true, |hash| &token.access_key_hash == hash)
    }
}

/// Sort order for token listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenOrder {
    /// Name ascending
    #[default]
    NameAsc,
}

impl TokenOrder {
    /// Sorts tokens in place
    pub fn sort(self, tokens: &mut [TransferToken]) {
        match self {
            TokenOrder::NameAsc => tokens.sort_by(|a, b| a.name.cmp(&b.name)),
        }
    }
}

/// Scalar column updates for a token row. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub lifespan: Option<Option<i64>>,
    pub access_key_hash: Option<String>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl TokenChanges {
    pub fn access_key_hash(hash: impl Into<String>) -> Self {
        Self {
            access_key_hash: Some(hash.into()),
            ..Default::default()
        }
    }

    pub fn last_used_at(at: DateTime<Utc>) -> Self {
        Self {
            last_used_at: Some(at),
            ..Default::default()
        }
    }

    /// Applies the changes in place and stamps `updated_at`
    pub fn apply(&self, token: &mut TransferToken, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            token.name = name.clone();
        }
        if let Some(description) = &self.description {
            token.description = description.clone();
        }
        if let Some(lifespan) = self.lifespan {
            token.lifespan = lifespan;
        }
        if let Some(hash) = &self.access_key_hash {
            token.access_key_hash = hash.clone();
        }
        if let Some(at) = self.last_used_at {
            token.last_used_at = Some(at);
        }
        token.updated_at = now;
    }
}
