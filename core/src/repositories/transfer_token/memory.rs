//! In-memory implementation of TransferTokenRepository
//!
//! Backs the server when no database is configured and drives the service
//! tests. A transaction holds the table lock for its whole lifetime and works
//! on a private copy that replaces the tables on commit, so concurrent
//! transactions are serialized and an abandoned one leaves no trace.

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::entities::{TransferToken, TransferTokenPermission};
use crate::domain::value_objects::{NewTransferToken, TokenChanges, TokenFilter, TokenOrder};
use crate::errors::DomainError;

use super::r#trait::{TransferTokenRepository, TransferTokenTransaction};

#[derive(Debug, Clone, Default)]
struct TokenTables {
    /// Token rows; `permissions` is always empty here and filled on read
    tokens: HashMap<Uuid, TransferToken>,
    permissions: Vec<TransferTokenPermission>,
}

impl TokenTables {
    fn populate(&self, token: &TransferToken) -> TransferToken {
        let mut actions: Vec<String> = self
            .permissions
            .iter()
            .filter(|permission| permission.token_id == token.id)
            .map(|permission| permission.action.clone())
            .collect();
        actions.sort();

        let mut token = token.clone();
        token.permissions = actions;
        token
    }
}

#[derive(Debug, Default)]
struct StoreStats {
    transactions: AtomicUsize,
    commits: AtomicUsize,
    writes: AtomicUsize,
}

/// In-memory token store with transactional writes
///
/// Cloning shares the underlying tables. Reads through the repository wait
/// for any open transaction, so a task must not read through the repository
/// while it holds a transaction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransferTokenRepository {
    tables: Arc<Mutex<TokenTables>>,
    stats: Arc<StoreStats>,
    failing_action: Option<String>,
}

impl InMemoryTransferTokenRepository {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert of a permission row for `action` fail with a
    /// storage error, for exercising rollback paths
    pub fn with_failing_action(mut self, action: impl Into<String>) -> Self {
        self.failing_action = Some(action.into());
        self
    }

    /// Number of transactions opened so far
    pub fn transactions_started(&self) -> usize {
        self.stats.transactions.load(Ordering::SeqCst)
    }

    /// Number of committed transactions
    pub fn commits(&self) -> usize {
        self.stats.commits.load(Ordering::SeqCst)
    }

    /// Number of write statements issued, committed or not
    pub fn writes(&self) -> usize {
        self.stats.writes.load(Ordering::SeqCst)
    }

    /// Number of token rows currently committed
    pub async fn token_count(&self) -> usize {
        self.tables.lock().await.tokens.len()
    }

    /// Number of permission rows currently committed
    pub async fn permission_count(&self) -> usize {
        self.tables.lock().await.permissions.len()
    }
}

#[async_trait]
impl TransferTokenRepository for InMemoryTransferTokenRepository {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Transaction, DomainError> {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();
        self.stats.transactions.fetch_add(1, Ordering::SeqCst);

        Ok(InMemoryTransaction {
            guard,
            working,
            stats: Arc::clone(&self.stats),
            failing_action: self.failing_action.clone(),
        })
    }

    async fn find_many(
        &self,
        filter: &TokenFilter,
        order: TokenOrder,
    ) -> Result<Vec<TransferToken>, DomainError> {
        let tables = self.tables.lock().await;
        let mut tokens: Vec<TransferToken> = tables
            .tokens
            .values()
            .filter(|token| filter.matches(token))
            .map(|token| tables.populate(token))
            .collect();
        order.sort(&mut tokens);
        Ok(tokens)
    }

    async fn find_one(&self, filter: &TokenFilter) -> Result<Option<TransferToken>, DomainError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tokens
            .values()
            .find(|token| filter.matches(token))
            .map(|token| tables.populate(token)))
    }
}

/// Transaction over [`InMemoryTransferTokenRepository`]
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<TokenTables>,
    working: TokenTables,
    stats: Arc<StoreStats>,
    failing_action: Option<String>,
}

impl InMemoryTransaction {
    fn record_write(&self) {
        self.stats.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TransferTokenTransaction for InMemoryTransaction {
    async fn find_token(&mut self, id: Uuid) -> Result<Option<TransferToken>, DomainError> {
        Ok(self
            .working
            .tokens
            .get(&id)
            .map(|token| self.working.populate(token)))
    }

    async fn insert_token(&mut self, token: NewTransferToken) -> Result<TransferToken, DomainError> {
        self.record_write();
        let row = TransferToken {
            id: Uuid::new_v4(),
            name: token.name,
            description: token.description,
            access_key_hash: token.access_key_hash,
            lifespan: token.lifespan,
            expires_at: token.expires_at,
            last_used_at: None,
            created_at: token.created_at,
            updated_at: token.created_at,
            permissions: Vec::new(),
        };
        self.working.tokens.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_token(
        &mut self,
        id: Uuid,
        changes: &TokenChanges,
    ) -> Result<Option<TransferToken>, DomainError> {
        self.record_write();
        let Some(token) = self.working.tokens.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(token, Utc::now().trunc_subsecs(6));
        let token = token.clone();
        Ok(Some(self.working.populate(&token)))
    }

    async fn delete_token(&mut self, id: Uuid) -> Result<Option<TransferToken>, DomainError> {
        self.record_write();
        let Some(token) = self.working.tokens.get(&id).cloned() else {
            return Ok(None);
        };
        let snapshot = self.working.populate(&token);
        self.working.tokens.remove(&id);
        self.working
            .permissions
            .retain(|permission| permission.token_id != id);
        Ok(Some(snapshot))
    }

    async fn load_permissions(
        &mut self,
        token_id: Uuid,
    ) -> Result<Vec<TransferTokenPermission>, DomainError> {
        Ok(self
            .working
            .permissions
            .iter()
            .filter(|permission| permission.token_id == token_id)
            .cloned()
            .collect())
    }

    async fn insert_permission(
        &mut self,
        token_id: Uuid,
        action: &str,
    ) -> Result<TransferTokenPermission, DomainError> {
        self.record_write();
        if self.failing_action.as_deref() == Some(action) {
            return Err(DomainError::storage(format!(
                "failed to insert permission '{}'",
                action
            )));
        }
        if !self.working.tokens.contains_key(&token_id) {
            return Err(DomainError::storage(format!(
                "permission references missing token {}",
                token_id
            )));
        }

        let permission = TransferTokenPermission::new(token_id, action);
        self.working.permissions.push(permission.clone());
        Ok(permission)
    }

    async fn delete_permission(&mut self, token_id: Uuid, action: &str) -> Result<u64, DomainError> {
        self.record_write();
        let before = self.working.permissions.len();
        self.working
            .permissions
            .retain(|permission| !(permission.token_id == token_id && permission.action == action));
        Ok((before - self.working.permissions.len()) as u64)
    }

    async fn commit(self) -> Result<(), DomainError> {
        let InMemoryTransaction {
            mut guard,
            working,
            stats,
            ..
        } = self;
        *guard = working;
        stats.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        Ok(())
    }
}
