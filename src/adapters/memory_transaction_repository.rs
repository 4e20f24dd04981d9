//! Process-local implementation of TransactionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::Transaction;
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

/// Keeps records in memory for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryTransactionRepository {
    records: RwLock<Vec<Transaction>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record in insertion order.
    pub async fn all(&self) -> Vec<Transaction> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let mut records = self.records.write().await;
        if records.iter().any(|existing| existing.id == tx.id) {
            return Err(RepositoryError::InvalidData(format!(
                "transaction {} already stored",
                tx.id
            )));
        }
        records.push(tx.clone());
        Ok(tx.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction> {
        self.records
            .read()
            .await
            .iter()
            .find(|tx| tx.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Transaction>> {
        let mut found: Vec<Transaction> = self
            .records
            .read()
            .await
            .iter()
            .filter(|tx| tx.created_at >= start && tx.created_at <= end)
            .cloned()
            .collect();
        found.sort_by_key(|tx| tx.created_at);
        Ok(found)
    }
}
