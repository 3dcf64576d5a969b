//! MySQL implementation of the TransferTokenRepository trait.
//!
//! Tokens live in `transfer_tokens` and their granted actions in
//! `transfer_token_permissions`. Reads go through the pool; every write goes
//! through a [`MySqlTransaction`] wrapping a SQLx transaction, which SQLx
//! rolls back when it is dropped without a commit.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};
use uuid::Uuid;

use transfer_core::domain::entities::{TransferToken, TransferTokenPermission};
use transfer_core::domain::value_objects::{
    NewTransferToken, TokenChanges, TokenFilter, TokenOrder,
};
use transfer_core::errors::DomainError;
use transfer_core::repositories::{TransferTokenRepository, TransferTokenTransaction};

use crate::database::DatabasePool;

const TOKEN_COLUMNS: &str = "id, name, description, access_key_hash, lifespan, \
     expires_at, last_used_at, created_at, updated_at";

/// MySQL implementation of TransferTokenRepository
#[derive(Clone)]
pub struct MySqlTransferTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTransferTokenRepository {
    /// Create a new MySQL transfer token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Create a repository sharing the pool of `database`
    pub fn from_database(database: &DatabasePool) -> Self {
        Self::new(database.get_pool().clone())
    }

    async fn fetch_tokens(
        &self,
        filter: &TokenFilter,
        order: Option<TokenOrder>,
        limit_one: bool,
    ) -> Result<Vec<TransferToken>, DomainError> {
        let rows = select_tokens_query(filter, order, limit_one)
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to query transfer tokens: {}", e)))?;

        let mut tokens = rows
            .iter()
            .map(row_to_token)
            .collect::<Result<Vec<_>, _>>()?;
        if tokens.is_empty() {
            return Ok(tokens);
        }

        let ids: Vec<Uuid> = tokens.iter().map(|token| token.id).collect();
        let permission_rows = select_permissions_query(&ids)
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to query permissions: {}", e)))?;

        attach_permissions(&mut tokens, &permission_rows)?;
        Ok(tokens)
    }
}

#[async_trait]
impl TransferTokenRepository for MySqlTransferTokenRepository {
    type Transaction = MySqlTransaction;

    async fn begin(&self) -> Result<Self::Transaction, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;
        Ok(MySqlTransaction { tx })
    }

    async fn find_many(
        &self,
        filter: &TokenFilter,
        order: TokenOrder,
    ) -> Result<Vec<TransferToken>, DomainError> {
        self.fetch_tokens(filter, Some(order), false).await
    }

    async fn find_one(&self, filter: &TokenFilter) -> Result<Option<TransferToken>, DomainError> {
        Ok(self.fetch_tokens(filter, None, true).await?.into_iter().next())
    }
}

/// Transaction over [`MySqlTransferTokenRepository`]
pub struct MySqlTransaction {
    tx: sqlx::Transaction<'static, MySql>,
}

#[async_trait]
impl TransferTokenTransaction for MySqlTransaction {
    async fn find_token(&mut self, id: Uuid) -> Result<Option<TransferToken>, DomainError> {
        let row = select_tokens_query(&TokenFilter::by_id(id), None, true)
            .build()
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to find transfer token: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut token = row_to_token(&row)?;
        token.permissions = self
            .load_permissions(id)
            .await?
            .into_iter()
            .map(|permission| permission.action)
            .collect();
        Ok(Some(token))
    }

    async fn insert_token(&mut self, token: NewTransferToken) -> Result<TransferToken, DomainError> {
        let id = Uuid::new_v4();
        let query = r#"
            INSERT INTO transfer_tokens (
                id, name, description, access_key_hash, lifespan,
                expires_at, last_used_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?)
        "#;

        sqlx::query(query)
            .bind(id.to_string())
            .bind(&token.name)
            .bind(&token.description)
            .bind(&token.access_key_hash)
            .bind(token.lifespan)
            .bind(token.expires_at)
            .bind(token.created_at)
            .bind(token.created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to insert transfer token: {}", e)))?;

        Ok(TransferToken {
            id,
            name: token.name,
            description: token.description,
            access_key_hash: token.access_key_hash,
            lifespan: token.lifespan,
            expires_at: token.expires_at,
            last_used_at: None,
            created_at: token.created_at,
            updated_at: token.created_at,
            permissions: Vec::new(),
        })
    }

    async fn update_token(
        &mut self,
        id: Uuid,
        changes: &TokenChanges,
    ) -> Result<Option<TransferToken>, DomainError> {
        // MySQL reports zero affected rows for no-op updates, so existence is checked first
        if self.find_token(id).await?.is_none() {
            return Ok(None);
        }

        update_token_query(id, changes, Utc::now())
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to update transfer token: {}", e)))?;

        self.find_token(id).await
    }

    async fn delete_token(&mut self, id: Uuid) -> Result<Option<TransferToken>, DomainError> {
        let Some(snapshot) = self.find_token(id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM transfer_token_permissions WHERE token_id = ?")
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete permissions: {}", e)))?;

        sqlx::query("DELETE FROM transfer_tokens WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete transfer token: {}", e)))?;

        Ok(Some(snapshot))
    }

    async fn load_permissions(
        &mut self,
        token_id: Uuid,
    ) -> Result<Vec<TransferTokenPermission>, DomainError> {
        let rows = select_permissions_query(&[token_id])
            .build()
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to load permissions: {}", e)))?;

        rows.iter().map(row_to_permission).collect()
    }

    async fn insert_permission(
        &mut self,
        token_id: Uuid,
        action: &str,
    ) -> Result<TransferTokenPermission, DomainError> {
        let permission = TransferTokenPermission::new(token_id, action);

        sqlx::query("INSERT INTO transfer_token_permissions (id, token_id, action) VALUES (?, ?, ?)")
            .bind(permission.id.to_string())
            .bind(token_id.to_string())
            .bind(action)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to insert permission: {}", e)))?;

        Ok(permission)
    }

    async fn delete_permission(&mut self, token_id: Uuid, action: &str) -> Result<u64, DomainError> {
        let result =
            sqlx::query("DELETE FROM transfer_token_permissions WHERE token_id = ? AND action = ?")
                .bind(token_id.to_string())
                .bind(action)
                .execute(&mut *self.tx)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to delete permission: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transaction: {}", e)))
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to roll back transaction: {}", e)))
    }
}

/// Builds the token SELECT for a filter; an empty filter selects every row
pub(crate) fn select_tokens_query(
    filter: &TokenFilter,
    order: Option<TokenOrder>,
    limit_one: bool,
) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM transfer_tokens", TOKEN_COLUMNS));

    let mut keyword = " WHERE ";
    if let Some(id) = filter.id {
        builder.push(keyword).push("id = ").push_bind(id.to_string());
        keyword = " AND ";
    }
    if let Some(name) = &filter.name {
        builder.push(keyword).push("name = ").push_bind(name.clone());
        keyword = " AND ";
    }
    if let Some(description) = &filter.description {
        builder
            .push(keyword)
            .push("description = ")
            .push_bind(description.clone());
        keyword = " AND ";
    }
    if let Some(last_used_at) = filter.last_used_at {
        builder
            .push(keyword)
            .push("last_used_at = ")
            .push_bind(last_used_at);
        keyword = " AND ";
    }
    if let Some(hash) = &filter.access_key_hash {
        builder
            .push(keyword)
            .push("access_key_hash = ")
            .push_bind(hash.clone());
    }

    match order {
        Some(TokenOrder::NameAsc) => {
            builder.push(" ORDER BY name ASC");
        }
        None => {}
    }
    if limit_one {
        builder.push(" LIMIT 1");
    }
    builder
}

/// Builds the permission SELECT for a set of tokens, ordered by action
pub(crate) fn select_permissions_query(token_ids: &[Uuid]) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new(
        "SELECT id, token_id, action FROM transfer_token_permissions WHERE token_id IN (",
    );
    {
        let mut separated = builder.separated(", ");
        for id in token_ids {
            separated.push_bind(id.to_string());
        }
    }
    builder.push(") ORDER BY action ASC");
    builder
}

/// Builds the UPDATE for a set of column changes; `updated_at` is always set
pub(crate) fn update_token_query(
    id: Uuid,
    changes: &TokenChanges,
    now: DateTime<Utc>,
) -> QueryBuilder<'static, MySql> {
    let mut builder = QueryBuilder::new("UPDATE transfer_tokens SET updated_at = ");
    builder.push_bind(now);

    if let Some(name) = &changes.name {
        builder.push(", name = ").push_bind(name.clone());
    }
    if let Some(description) = &changes.description {
        builder.push(", description = ").push_bind(description.clone());
    }
    if let Some(lifespan) = changes.lifespan {
        builder.push(", lifespan = ").push_bind(lifespan);
    }
    if let Some(hash) = &changes.access_key_hash {
        builder.push(", access_key_hash = ").push_bind(hash.clone());
    }
    if let Some(last_used_at) = changes.last_used_at {
        builder.push(", last_used_at = ").push_bind(last_used_at);
    }

    builder.push(" WHERE id = ").push_bind(id.to_string());
    builder
}

fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::storage(format!("Failed to get {}: {}", name, e)))
}

fn parse_uuid(value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value)
        .map_err(|e| DomainError::storage(format!("Invalid UUID '{}': {}", value, e)))
}

/// Convert a database row to a TransferToken with no permissions attached
fn row_to_token(row: &MySqlRow) -> Result<TransferToken, DomainError> {
    let id: String = column(row, "id")?;

    Ok(TransferToken {
        id: parse_uuid(&id)?,
        name: column(row, "name")?,
        description: column(row, "description")?,
        access_key_hash: column(row, "access_key_hash")?,
        lifespan: column(row, "lifespan")?,
        expires_at: column(row, "expires_at")?,
        last_used_at: column(row, "last_used_at")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
        permissions: Vec::new(),
    })
}

fn row_to_permission(row: &MySqlRow) -> Result<TransferTokenPermission, DomainError> {
    let id: String = column(row, "id")?;
    let token_id: String = column(row, "token_id")?;

    Ok(TransferTokenPermission {
        id: parse_uuid(&id)?,
        action: column(row, "action")?,
        token_id: parse_uuid(&token_id)?,
    })
}

fn attach_permissions(
    tokens: &mut [TransferToken],
    rows: &[MySqlRow],
) -> Result<(), DomainError> {
    let mut by_token: HashMap<Uuid, Vec<String>> = HashMap::new();
    for row in rows {
        let permission = row_to_permission(row)?;
        by_token
            .entry(permission.token_id)
            .or_default()
            .push(permission.action);
    }
    for token in tokens {
        token.permissions = by_token.remove(&token.id).unwrap_or_default();
    }
    Ok(())
}
