//! Signed `DATOSENTRADA` request documents.

use std::fmt;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::LazyLock;

use quick_xml::escape::escape;
use rand::Rng;

use crate::domain::{Currency, PaymentRequest, RefundRequest, TransactionType};
use crate::redsys::signature::{payment_signature, refund_signature};
use crate::utils::sanitize::mask_secret;

/// Credentials identifying the merchant to the gateway.
#[derive(Clone)]
pub struct MerchantCredentials {
    pub merchant_code: String,
    pub terminal: String,
    pub currency: Currency,
    secret_key: String,
}

impl MerchantCredentials {
    pub fn new(merchant_code: String, secret_key: String, terminal: String, currency: Currency) -> Self {
        Self {
            merchant_code,
            terminal,
            currency,
            secret_key,
        }
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("merchant_code", &self.merchant_code)
            .field("terminal", &self.terminal)
            .field("currency", &self.currency)
            .field("secret_key", &mask_secret(&self.secret_key))
            .finish()
    }
}

/// A request document ready to be sent, along with the values it was signed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub transaction_id: String,
    pub transaction_type: TransactionType,
    pub signature: String,
    pub xml: String,
}

/// Suffix source for order references. Starts at a random value and steps by
/// one, so ids repeat only after 65536 attempts within a process.
static ATTEMPT_SUFFIX: LazyLock<AtomicU16> =
    LazyLock::new(|| AtomicU16::new(rand::thread_rng().gen()));

/// Per-attempt order reference: the order id plus four hex characters.
pub fn generate_transaction_id(order_id: &str) -> String {
    let suffix = ATTEMPT_SUFFIX.fetch_add(1, Ordering::Relaxed);
    format!("{}-{:04x}", order_id, suffix)
}

pub fn build_payment(credentials: &MerchantCredentials, request: &PaymentRequest) -> SignedRequest {
    let transaction_id = generate_transaction_id(request.order_id());
    build_payment_with_id(credentials, request, transaction_id)
}

pub fn build_payment_with_id(
    credentials: &MerchantCredentials,
    request: &PaymentRequest,
    transaction_id: String,
) -> SignedRequest {
    let transaction_type = TransactionType::OrdinaryPayment;
    let card = request.card();
    let signature = payment_signature(
        request.amount(),
        &transaction_id,
        credentials,
        card,
        transaction_type,
    );

    let xml = format!(
        "<DATOSENTRADA>\
            <DS_MERCHANT_AMOUNT>{}</DS_MERCHANT_AMOUNT>\
            <DS_MERCHANT_ORDER>{}</DS_MERCHANT_ORDER>\
            <DS_MERCHANT_MERCHANTCODE>{}</DS_MERCHANT_MERCHANTCODE>\
            <DS_MERCHANT_CURRENCY>{}</DS_MERCHANT_CURRENCY>\
            <DS_MERCHANT_PAN>{}</DS_MERCHANT_PAN>\
            <DS_MERCHANT_CVV2>{}</DS_MERCHANT_CVV2>\
            <DS_MERCHANT_TRANSACTIONTYPE>{}</DS_MERCHANT_TRANSACTIONTYPE>\
            <DS_MERCHANT_TERMINAL>{}</DS_MERCHANT_TERMINAL>\
            <DS_MERCHANT_EXPIRYDATE>{}</DS_MERCHANT_EXPIRYDATE>\
            <DS_MERCHANT_MERCHANTSIGNATURE>{}</DS_MERCHANT_MERCHANTSIGNATURE>\
        </DATOSENTRADA>",
        request.amount(),
        escape(transaction_id.as_str()),
        escape(credentials.merchant_code.as_str()),
        credentials.currency.code(),
        card.number(),
        card.cvc(),
        transaction_type,
        escape(credentials.terminal.as_str()),
        card.expiration().to_yymm(),
        signature,
    );

    SignedRequest {
        transaction_id,
        transaction_type,
        signature,
        xml,
    }
}

pub fn build_refund(credentials: &MerchantCredentials, request: &RefundRequest) -> SignedRequest {
    let transaction_id = generate_transaction_id(request.order_id());
    build_refund_with_id(credentials, request, transaction_id)
}

pub fn build_refund_with_id(
    credentials: &MerchantCredentials,
    request: &RefundRequest,
    transaction_id: String,
) -> SignedRequest {
    let transaction_type = TransactionType::AutomaticRefund;
    let signature = refund_signature(
        request.amount(),
        &transaction_id,
        credentials,
        transaction_type,
    );

    let xml = format!(
        "<DATOSENTRADA>\
            <DS_MERCHANT_AMOUNT>{}</DS_MERCHANT_AMOUNT>\
            <DS_MERCHANT_ORDER>{}</DS_MERCHANT_ORDER>\
            <DS_MERCHANT_MERCHANTCODE>{}</DS_MERCHANT_MERCHANTCODE>\
            <DS_MERCHANT_CURRENCY>{}</DS_MERCHANT_CURRENCY>\
            <DS_MERCHANT_TRANSACTIONTYPE>{}</DS_MERCHANT_TRANSACTIONTYPE>\
            <DS_MERCHANT_TERMINAL>{}</DS_MERCHANT_TERMINAL>\
            <DS_MERCHANT_MERCHANTSIGNATURE>{}</DS_MERCHANT_MERCHANTSIGNATURE>\
        </DATOSENTRADA>",
        request.amount(),
        escape(transaction_id.as_str()),
        escape(credentials.merchant_code.as_str()),
        credentials.currency.code(),
        transaction_type,
        escape(credentials.terminal.as_str()),
        signature,
    );

    SignedRequest {
        transaction_id,
        transaction_type,
        signature,
        xml,
    }
}
