//! Permission registry and permission set reconciliation

use std::collections::BTreeSet;
use std::sync::Arc;

use transfer_shared::config::TransferTokenConfig;

use crate::errors::ValidationError;

/// Source of the action names a transfer token may be granted
pub trait PermissionRegistry: Send + Sync {
    /// Registered action names at call time
    fn actions(&self) -> Vec<String>;

    fn is_registered(&self, action: &str) -> bool {
        self.actions().iter().any(|registered| registered == action)
    }
}

impl<T: PermissionRegistry + ?Sized> PermissionRegistry for Arc<T> {
    fn actions(&self) -> Vec<String> {
        (**self).actions()
    }

    fn is_registered(&self, action: &str) -> bool {
        (**self).is_registered(action)
    }
}

/// Registry backed by a fixed set of action names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPermissionRegistry {
    actions: BTreeSet<String>,
}

impl StaticPermissionRegistry {
    pub fn new<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &TransferTokenConfig) -> Self {
        Self::new(config.actions.iter().cloned())
    }
}

impl Default for StaticPermissionRegistry {
    fn default() -> Self {
        Self::from_config(&TransferTokenConfig::default())
    }
}

impl PermissionRegistry for StaticPermissionRegistry {
    fn actions(&self) -> Vec<String> {
        self.actions.iter().cloned().collect()
    }

    fn is_registered(&self, action: &str) -> bool {
        self.actions.contains(action)
    }
}

/// Rows to insert and rows to delete to move a permission set to its target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionDiff {
    pub to_add: BTreeSet<String>,
    pub to_remove: BTreeSet<String>,
}

impl PermissionDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Computes `desired - current` and `current - desired`, ignoring duplicates
pub fn diff_permissions<C, D>(current: C, desired: D) -> PermissionDiff
where
    C: IntoIterator,
    C::Item: AsRef<str>,
    D: IntoIterator,
    D::Item: AsRef<str>,
{
    let current: BTreeSet<String> = current
        .into_iter()
        .map(|action| action.as_ref().to_string())
        .collect();
    let desired: BTreeSet<String> = desired
        .into_iter()
        .map(|action| action.as_ref().to_string())
        .collect();

    PermissionDiff {
        to_add: desired.difference(&current).cloned().collect(),
        to_remove: current.difference(&desired).cloned().collect(),
    }
}

/// De-duplicates requested actions and rejects any the registry does not know.
///
/// Every unknown action is reported, not only the first.
pub fn validate_permissions<P, I>(
    registry: &P,
    requested: I,
) -> Result<BTreeSet<String>, ValidationError>
where
    P: PermissionRegistry + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let requested: BTreeSet<String> = requested
        .into_iter()
        .map(|action| action.as_ref().to_string())
        .collect();

    let unknown: Vec<String> = requested
        .iter()
        .filter(|action| !registry.is_registered(action))
        .cloned()
        .collect();

    if !unknown.is_empty() {
        return Err(ValidationError::UnknownActions { actions: unknown });
    }
    Ok(requested)
}
