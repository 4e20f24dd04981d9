//! Framework-agnostic domain types.

pub mod payment;
pub mod transaction;

pub use payment::{
    CardDetails, CardExpiration, Currency, PaymentContext, PaymentRequest, PaymentStatus,
    RedsysApiMethod, RefundRequest, TransactionType,
};
pub use transaction::{Transaction, TransactionKind};
