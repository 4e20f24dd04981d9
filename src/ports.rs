//! Collaborator contracts of the payment manager.
//! Adapters live in `crate::adapters`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{PaymentContext, RedsysApiMethod, Transaction};

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Storage for gateway transaction records. Records are only ever inserted.
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Persists and flushes a single record.
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction>;

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction>;

    /// Records created within `[start, end]`, oldest first.
    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Transaction>>;
}

/// Payment order lifecycle hooks.
#[async_trait]
pub trait PaymentEventDispatcher: Send + Sync {
    async fn order_load(&self, ctx: &PaymentContext, method: &RedsysApiMethod);

    async fn order_created(&self, ctx: &PaymentContext, method: &RedsysApiMethod);

    async fn order_done(&self, ctx: &PaymentContext, method: &RedsysApiMethod);

    async fn order_failed(&self, ctx: &PaymentContext, method: &RedsysApiMethod);

    async fn order_success(&self, ctx: &PaymentContext, method: &RedsysApiMethod);
}
