//! Merchant signatures for `DS_MERCHANT_MERCHANTSIGNATURE`.

use sha1::{Digest, Sha1};

use crate::domain::{CardDetails, TransactionType};
use crate::redsys::request::MerchantCredentials;

/// Uppercase hex SHA-1 over the concatenation of `parts`.
pub fn sign(parts: &[&str]) -> String {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode_upper(hasher.finalize())
}

pub fn payment_signature(
    amount: i64,
    transaction_id: &str,
    credentials: &MerchantCredentials,
    card: &CardDetails,
    transaction_type: TransactionType,
) -> String {
    let amount = amount.to_string();
    let transaction_type = transaction_type.to_string();
    sign(&[
        amount.as_str(),
        transaction_id,
        credentials.merchant_code.as_str(),
        credentials.currency.code(),
        card.number(),
        card.cvc(),
        transaction_type.as_str(),
        credentials.secret_key(),
    ])
}

/// Same as [`payment_signature`] without the card number and CVC.
pub fn refund_signature(
    amount: i64,
    transaction_id: &str,
    credentials: &MerchantCredentials,
    transaction_type: TransactionType,
) -> String {
    let amount = amount.to_string();
    let transaction_type = transaction_type.to_string();
    sign(&[
        amount.as_str(),
        transaction_id,
        credentials.merchant_code.as_str(),
        credentials.currency.code(),
        transaction_type.as_str(),
        credentials.secret_key(),
    ])
}
