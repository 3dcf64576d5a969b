//! Repository traits defining the persistence boundary for transfer tokens.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{TransferToken, TransferTokenPermission};
use crate::domain::value_objects::{NewTransferToken, TokenChanges, TokenFilter, TokenOrder};
use crate::errors::DomainError;

/// Repository for transfer tokens and the permission rows they own
///
/// Reads run outside any transaction. Every mutation goes through a
/// [`TransferTokenTransaction`] obtained from [`begin`](Self::begin), so a
/// token row and its permission rows change as one all-or-nothing unit.
///
/// # Consistency
/// - Deleting a token deletes its permission rows
/// - Tokens returned by reads have `permissions` populated
#[async_trait]
pub trait TransferTokenRepository: Send + Sync {
    /// Unit of work handed out by [`begin`](Self::begin)
    type Transaction: TransferTokenTransaction + 'static;

    /// Open a transaction
    ///
    /// # Returns
    /// * `Ok(Self::Transaction)` - Transaction ready for writes
    /// * `Err(DomainError)` - The store could not start a transaction
    async fn begin(&self) -> Result<Self::Transaction, DomainError>;

    /// Find every token matching `filter`, sorted by `order`
    ///
    /// An empty filter matches all tokens.
    ///
    /// # Example
    /// ```no_run
    /// # use transfer_core::repositories::TransferTokenRepository;
    /// # use transfer_core::domain::{TokenFilter, TokenOrder};
    /// # async fn example(repo: &impl TransferTokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let tokens = repo.find_many(&TokenFilter::default(), TokenOrder::NameAsc).await?;
    /// for token in tokens {
    ///     println!("{} grants {:?}", token.name, token.permissions);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn find_many(
        &self,
        filter: &TokenFilter,
        order: TokenOrder,
    ) -> Result<Vec<TransferToken>, DomainError>;

    /// Find the first token matching `filter`
    ///
    /// # Returns
    /// * `Ok(Some(TransferToken))` - Token found
    /// * `Ok(None)` - No token matches
    /// * `Err(DomainError)` - Database error occurred
    async fn find_one(&self, filter: &TokenFilter) -> Result<Option<TransferToken>, DomainError>;

    /// Find a token by its identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<TransferToken>, DomainError> {
        self.find_one(&TokenFilter::by_id(id)).await
    }
}

/// Writes against the token tables, applied atomically on [`commit`](Self::commit)
///
/// Dropping a transaction without committing rolls it back.
#[async_trait]
pub trait TransferTokenTransaction: Send {
    /// Read a token (permissions populated) as seen by this transaction
    async fn find_token(&mut self, id: Uuid) -> Result<Option<TransferToken>, DomainError>;

    /// Insert a token row; the store assigns the identifier
    async fn insert_token(&mut self, token: NewTransferToken) -> Result<TransferToken, DomainError>;

    /// Update scalar columns of a token
    ///
    /// # Returns
    /// * `Ok(Some(TransferToken))` - The updated token
    /// * `Ok(None)` - No token has this id
    async fn update_token(
        &mut self,
        id: Uuid,
        changes: &TokenChanges,
    ) -> Result<Option<TransferToken>, DomainError>;

    /// Delete a token and its permission rows
    ///
    /// # Returns
    /// * `Ok(Some(TransferToken))` - Snapshot of the deleted token
    /// * `Ok(None)` - No token has this id
    async fn delete_token(&mut self, id: Uuid) -> Result<Option<TransferToken>, DomainError>;

    /// Load the permission rows owned by a token
    async fn load_permissions(
        &mut self,
        token_id: Uuid,
    ) -> Result<Vec<TransferTokenPermission>, DomainError>;

    /// Insert one permission row
    async fn insert_permission(
        &mut self,
        token_id: Uuid,
        action: &str,
    ) -> Result<TransferTokenPermission, DomainError>;

    /// Delete the permission rows of `token_id` for `action`, returning the row count
    async fn delete_permission(&mut self, token_id: Uuid, action: &str) -> Result<u64, DomainError>;

    /// Make every write of this transaction visible
    async fn commit(self) -> Result<(), DomainError>;

    /// Discard every write of this transaction
    async fn rollback(self) -> Result<(), DomainError>;
}
