//! Configuration for the transfer token service

use transfer_shared::config::TransferTokenConfig;

/// Configuration for the transfer token service
#[derive(Debug, Clone, Default)]
pub struct TransferTokenServiceConfig {
    /// Transfer feature explicitly disabled; silences the missing salt warning
    pub disabled: bool,
}

impl From<&TransferTokenConfig> for TransferTokenServiceConfig {
    fn from(config: &TransferTokenConfig) -> Self {
        Self {
            disabled: config.disabled,
        }
    }
}
