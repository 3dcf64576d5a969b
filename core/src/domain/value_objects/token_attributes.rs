//! Caller-supplied attributes for creating and updating transfer tokens.

use serde::{Deserialize, Deserializer};

/// Attributes accepted when issuing a new transfer token
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferToken {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Caller-chosen access key; a random one is generated when absent
    #[serde(default)]
    pub access_key: Option<String>,

    /// Lifespan in milliseconds; absent or null never expires
    #[serde(default)]
    pub lifespan: Option<i64>,

    #[serde(default)]
    pub permissions: Vec<String>,
}

impl CreateTransferToken {
    /// Attributes for a token with the given name and permissions
    pub fn new<I, S>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_lifespan(mut self, lifespan: Option<i64>) -> Self {
        self.lifespan = lifespan;
        self
    }

    pub fn with_access_key(mut self, access_key: impl Into<String>) -> Self {
        self.access_key = Some(access_key.into());
        self
    }
}

/// Partial update of a transfer token.
///
/// Absent fields are left untouched. `lifespan` distinguishes an absent field
/// (`None`) from an explicit null (`Some(None)`, meaning unlimited).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransferToken {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "deserialize_present")]
    pub lifespan: Option<Option<i64>>,

    /// Desired permission set; `None` leaves permissions untouched
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl UpdateTransferToken {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_lifespan(mut self, lifespan: Option<i64>) -> Self {
        self.lifespan = Some(lifespan);
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = Some(permissions.into_iter().map(Into::into).collect());
        self
    }
}

/// Maps a present field (null included) to `Some`, so `#[serde(default)]`
/// only applies when the field is missing.
pub fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
