//! Transaction domain entity.
//! Immutable audit record of one exchange with the Redsys gateway.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Direction of the recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Request,
    Response,
}

impl TransactionKind {
    pub fn code(self) -> i16 {
        match self {
            TransactionKind::Request => 0,
            TransactionKind::Response => 1,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(TransactionKind::Request),
            1 => Some(TransactionKind::Response),
            _ => None,
        }
    }
}

/// Domain entity representing a stored gateway transaction.
///
/// Fields are only readable from outside the crate; a record never changes
/// once it has been constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub(crate) id: Uuid,
    pub(crate) order_id: String,
    pub(crate) amount: i64,
    pub(crate) kind: TransactionKind,
    pub(crate) return_code: String,
    pub(crate) error_code: String,
    pub(crate) authorization_code: String,
    pub(crate) message: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        order_id: String,
        amount: i64,
        kind: TransactionKind,
        return_code: String,
        error_code: String,
        authorization_code: String,
        message: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            amount,
            kind,
            return_code,
            error_code,
            authorization_code,
            message,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Amount in minor currency units.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn return_code(&self) -> &str {
        &self.return_code
    }

    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    pub fn authorization_code(&self) -> &str {
        &self.authorization_code
    }

    /// Raw gateway message as received.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
