use serde::{Deserialize, Serialize};
use validator::Validate;

use transfer_core::domain::value_objects::{
    deserialize_present, CreateTransferToken, UpdateTransferToken,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferTokenRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 1024))]
    pub description: Option<String>,

    /// Caller-chosen access key; generated when absent
    #[serde(default)]
    #[validate(length(min = 15))]
    pub access_key: Option<String>,

    /// Lifespan in milliseconds; `null` or absent means unlimited
    #[serde(default)]
    #[validate(range(min = 1))]
    pub lifespan: Option<i64>,

    #[serde(default)]
    pub permissions: Vec<String>,
}

impl From<CreateTransferTokenRequest> for CreateTransferToken {
    fn from(request: CreateTransferTokenRequest) -> Self {
        Self {
            name: request.name,
            description: request.description.unwrap_or_default(),
            access_key: request.access_key,
            lifespan: request.lifespan,
            permissions: request.permissions,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransferTokenRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(length(max = 1024))]
    pub description: Option<String>,

    /// Absent keeps the lifespan, `null` makes it unlimited
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub lifespan: Option<Option<i64>>,

    /// Absent keeps permissions, `[]` removes them all
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl From<UpdateTransferTokenRequest> for UpdateTransferToken {
    fn from(request: UpdateTransferTokenRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            lifespan: request.lifespan,
            permissions: request.permissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults() {
        let request: CreateTransferTokenRequest =
            serde_json::from_str(r#"{"name": "ci"}"#).unwrap();
        assert!(request.validate().is_ok());

        let attrs = CreateTransferToken::from(request);
        assert_eq!(attrs.description, "");
        assert_eq!(attrs.lifespan, None);
        assert!(attrs.permissions.is_empty());
    }

    #[test]
    fn test_create_request_validation() {
        let request: CreateTransferTokenRequest = serde_json::from_str(
            r#"{"name": "ci", "accessKey": "short", "lifespan": 0}"#,
        )
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let absent: UpdateTransferTokenRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.lifespan, None);
        assert_eq!(absent.permissions, None);

        let cleared: UpdateTransferTokenRequest =
            serde_json::from_str(r#"{"lifespan": null, "permissions": []}"#).unwrap();
        assert_eq!(cleared.lifespan, Some(None));
        assert_eq!(cleared.permissions, Some(vec![]));

        let attrs = UpdateTransferToken::from(cleared);
        assert_eq!(attrs.lifespan, Some(None));
    }
}
