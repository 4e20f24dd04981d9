//! Postgres implementation of TransactionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionKind};
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

/// Postgres-backed transaction repository.
#[derive(Clone)]
pub struct PostgresTransactionRepository {
    pool: PgPool,
}

impl PostgresTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepository for PostgresTransactionRepository {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            INSERT INTO redsys_transactions (
                id, order_id, amount, transaction_type, return_code,
                error_code, authorization_code, message, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, order_id, amount, transaction_type, return_code,
                error_code, authorization_code, message, created_at
            "#,
        )
        .bind(tx.id)
        .bind(&tx.order_id)
        .bind(tx.amount)
        .bind(tx.kind.code())
        .bind(&tx.return_code)
        .bind(&tx.error_code)
        .bind(&tx.authorization_code)
        .bind(&tx.message)
        .bind(tx.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.into_domain()
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM redsys_transactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        row.ok_or_else(|| RepositoryError::NotFound(id.to_string()))?
            .into_domain()
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM redsys_transactions \
             WHERE created_at BETWEEN $1 AND $2 \
             ORDER BY created_at ASC",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)?;

        rows.into_iter().map(TransactionRow::into_domain).collect()
    }
}

/// Internal row type for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    order_id: String,
    amount: i64,
    transaction_type: i16,
    return_code: String,
    error_code: String,
    authorization_code: String,
    message: String,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> RepositoryResult<Transaction> {
        let kind = TransactionKind::from_code(self.transaction_type).ok_or_else(|| {
            RepositoryError::InvalidData(format!(
                "transaction {} has unknown type {}",
                self.id, self.transaction_type
            ))
        })?;

        Ok(Transaction {
            id: self.id,
            order_id: self.order_id,
            amount: self.amount,
            kind,
            return_code: self.return_code,
            error_code: self.error_code,
            authorization_code: self.authorization_code,
            message: self.message,
            created_at: self.created_at,
        })
    }
}
