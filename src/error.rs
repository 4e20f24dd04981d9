use thiserror::Error;

use crate::ports::RepositoryError;
use crate::redsys::{TransportError, XmlError};
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Invalid payment request: {0}")]
    InvalidRequest(#[from] ValidationError),

    #[error("Gateway call failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid gateway response: {0}")]
    Xml(#[from] XmlError),

    #[error("Payment declined: {message}")]
    Declined {
        response_code: Option<String>,
        error_code: Option<String>,
        message: String,
    },

    #[error("Transaction storage failed: {0}")]
    Repository(#[from] RepositoryError),
}

impl PaymentError {
    /// Short machine readable label, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentError::InvalidRequest(_) => "invalid_request",
            PaymentError::Transport(_) => "transport",
            PaymentError::Xml(_) => "invalid_response",
            PaymentError::Declined { .. } => "declined",
            PaymentError::Repository(_) => "repository",
        }
    }

    pub fn is_declined(&self) -> bool {
        matches!(self, PaymentError::Declined { .. })
    }
}
