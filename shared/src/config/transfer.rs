//! Transfer token configuration

use serde::{Deserialize, Serialize};

/// One day in milliseconds
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Lifespans an administrator may choose from, in milliseconds.
/// An absent lifespan (unlimited) is always accepted in addition to these.
pub const DEFAULT_ALLOWED_LIFESPANS_MS: [i64; 3] = [7 * DAY_MS, 30 * DAY_MS, 90 * DAY_MS];

/// Actions a transfer token may be granted by default
pub const DEFAULT_ACTIONS: [&str; 2] = ["push", "pull"];

/// Configuration for issuing and hashing transfer tokens
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferTokenConfig {
    /// Salt keying the access key hash
    #[serde(default)]
    pub salt: Option<String>,

    /// Explicitly disables the transfer feature (silences the salt warning)
    #[serde(default)]
    pub disabled: bool,

    /// Allowed lifespan values in milliseconds
    #[serde(default = "default_allowed_lifespans")]
    pub allowed_lifespans_ms: Vec<i64>,

    /// Registered action names
    #[serde(default = "default_actions")]
    pub actions: Vec<String>,
}

impl Default for TransferTokenConfig {
    fn default() -> Self {
        Self {
            salt: None,
            disabled: false,
            allowed_lifespans_ms: default_allowed_lifespans(),
            actions: default_actions(),
        }
    }
}

impl TransferTokenConfig {
    /// Create a configuration with the given salt
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: Some(salt.into()),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let salt = std::env::var("TRANSFER_TOKEN_SALT").ok();
        let disabled = std::env::var("TRANSFER_TOKENS_DISABLED")
            .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let actions = std::env::var("TRANSFER_TOKEN_ACTIONS")
            .ok()
            .map(|value| parse_actions(&value))
            .filter(|actions| !actions.is_empty())
            .unwrap_or_else(default_actions);

        Self {
            salt,
            disabled,
            allowed_lifespans_ms: default_allowed_lifespans(),
            actions,
        }
    }

    /// Replace the registered actions
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the feature as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

fn parse_actions(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|action| !action.is_empty())
        .map(String::from)
        .collect()
}

fn default_allowed_lifespans() -> Vec<i64> {
    DEFAULT_ALLOWED_LIFESPANS_MS.to_vec()
}

fn default_actions() -> Vec<String> {
    DEFAULT_ACTIONS.iter().map(|action| action.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifespans_are_seven_thirty_ninety_days() {
        let config = TransferTokenConfig::default();
        assert_eq!(config.allowed_lifespans_ms, vec![604_800_000, 2_592_000_000, 7_776_000_000]);
        assert_eq!(config.actions, vec!["push", "pull"]);
    }

    #[test]
    fn test_parse_actions_skips_blanks() {
        assert_eq!(parse_actions(" push, ,pull ,"), vec!["push", "pull"]);
    }
}
