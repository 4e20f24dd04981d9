//! Typed inputs for a single gateway operation.
//!
//! Everything here lives only for the duration of one signing and call
//! cycle. Constructors validate their input so the signer can trust it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::redsys::xml::ResponseData;
use crate::utils::sanitize::mask_card_number;
use crate::validation::{
    strip_whitespace, validate_amount, validate_card_number, validate_cvc, validate_expiry_month,
    validate_order_id, ValidationError,
};

/// Merchant currency, sent to the gateway as its ISO 4217 numeric code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Currency {
    Eur,
    Usd,
    Gbp,
    Jpy,
    Other(String),
}

impl Currency {
    pub fn code(&self) -> &str {
        match self {
            Currency::Eur => "978",
            Currency::Usd => "840",
            Currency::Gbp => "826",
            Currency::Jpy => "392",
            Currency::Other(code) => code,
        }
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        match value.to_ascii_uppercase().as_str() {
            "EUR" | "978" => Ok(Currency::Eur),
            "USD" | "840" => Ok(Currency::Usd),
            "GBP" | "826" => Ok(Currency::Gbp),
            "JPY" | "392" => Ok(Currency::Jpy),
            _ if value.len() == 3 && value.chars().all(|ch| ch.is_ascii_digit()) => {
                Ok(Currency::Other(value.to_string()))
            }
            _ => Err(ValidationError::new(
                "currency",
                "must be EUR, USD, GBP, JPY or a 3 digit ISO 4217 code",
            )),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Operation requested from the gateway (`DS_MERCHANT_TRANSACTIONTYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    OrdinaryPayment,
    Preauthorization,
    Confirmation,
    AutomaticRefund,
    RecurringPayment,
    SuccessiveTransaction,
    PreauthorizationCancel,
    DeferredAuthorization,
    DeferredAuthorizationConfirm,
    DeferredAuthorizationCancel,
    InitialRecurringDeferred,
    SuccessiveRecurringDeferred,
}

impl TransactionType {
    pub fn code(self) -> char {
        match self {
            TransactionType::OrdinaryPayment => 'A',
            TransactionType::Preauthorization => '1',
            TransactionType::Confirmation => '2',
            TransactionType::AutomaticRefund => '3',
            TransactionType::RecurringPayment => '5',
            TransactionType::SuccessiveTransaction => '6',
            TransactionType::PreauthorizationCancel => '9',
            TransactionType::DeferredAuthorization => 'O',
            TransactionType::DeferredAuthorizationConfirm => 'P',
            TransactionType::DeferredAuthorizationCancel => 'Q',
            TransactionType::InitialRecurringDeferred => 'R',
            TransactionType::SuccessiveRecurringDeferred => 'S',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        let kind = match code {
            'A' => TransactionType::OrdinaryPayment,
            '1' => TransactionType::Preauthorization,
            '2' => TransactionType::Confirmation,
            '3' => TransactionType::AutomaticRefund,
            '5' => TransactionType::RecurringPayment,
            '6' => TransactionType::SuccessiveTransaction,
            '9' => TransactionType::PreauthorizationCancel,
            'O' => TransactionType::DeferredAuthorization,
            'P' => TransactionType::DeferredAuthorizationConfirm,
            'Q' => TransactionType::DeferredAuthorizationCancel,
            'R' => TransactionType::InitialRecurringDeferred,
            'S' => TransactionType::SuccessiveRecurringDeferred,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Card expiration, rendered as `YYMM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardExpiration {
    year: u32,
    month: u32,
}

impl CardExpiration {
    /// Accepts two or four digit years; only the last two digits are kept.
    pub fn new(year: u32, month: u32) -> Result<Self, ValidationError> {
        validate_expiry_month(month)?;
        Ok(Self {
            year: year % 100,
            month,
        })
    }

    pub fn to_yymm(&self) -> String {
        format!("{:02}{:02}", self.year, self.month)
    }
}

/// Card data for a payment. The number and CVC never show up in `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct CardDetails {
    number: String,
    holder: String,
    expiration: CardExpiration,
    cvc: String,
}

impl CardDetails {
    pub fn new(
        number: &str,
        holder: &str,
        expiration: CardExpiration,
        cvc: &str,
    ) -> Result<Self, ValidationError> {
        let number = strip_whitespace(number);
        let cvc = cvc.trim().to_string();
        validate_card_number(&number)?;
        validate_cvc(&cvc)?;

        Ok(Self {
            number,
            holder: holder.trim().to_string(),
            expiration,
            cvc,
        })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    pub fn expiration(&self) -> CardExpiration {
        self.expiration
    }

    pub fn cvc(&self) -> &str {
        &self.cvc
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &mask_card_number(&self.number))
            .field("holder", &self.holder)
            .field("expiration", &self.expiration.to_yymm())
            .field("cvc", &"***")
            .finish()
    }
}

/// Parameters of an ordinary card payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    order_id: String,
    amount: i64,
    card: CardDetails,
}

impl PaymentRequest {
    pub fn new(order_id: &str, amount: i64, card: CardDetails) -> Result<Self, ValidationError> {
        validate_order_id(order_id)?;
        validate_amount(amount)?;
        Ok(Self {
            order_id: order_id.to_string(),
            amount,
            card,
        })
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn card(&self) -> &CardDetails {
        &self.card
    }
}

/// Parameters of an automatic refund. No card data is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundRequest {
    order_id: String,
    amount: i64,
}

impl RefundRequest {
    pub fn new(order_id: &str, amount: i64) -> Result<Self, ValidationError> {
        validate_order_id(order_id)?;
        validate_amount(amount)?;
        Ok(Self {
            order_id: order_id.to_string(),
            amount,
        })
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }
}

/// The order being paid, as seen by the lifecycle listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentContext {
    pub order_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
}

impl PaymentContext {
    pub fn new(order_id: impl Into<String>, amount: i64) -> Self {
        Self {
            order_id: order_id.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// Card payment method as submitted by the customer.
///
/// The manager fills in `transaction_id`, `status` and `response` once the
/// gateway has answered.
#[derive(Clone)]
pub struct RedsysApiMethod {
    pub card_number: String,
    pub card_owner: String,
    pub expiration_year: u32,
    pub expiration_month: u32,
    pub card_security: String,
    pub transaction_id: Option<String>,
    pub status: PaymentStatus,
    pub response: Option<ResponseData>,
}

impl RedsysApiMethod {
    pub fn new(
        card_number: impl Into<String>,
        card_owner: impl Into<String>,
        expiration_year: u32,
        expiration_month: u32,
        card_security: impl Into<String>,
    ) -> Self {
        Self {
            card_number: card_number.into(),
            card_owner: card_owner.into(),
            expiration_year,
            expiration_month,
            card_security: card_security.into(),
            transaction_id: None,
            status: PaymentStatus::Pending,
            response: None,
        }
    }

    pub fn payment_name(&self) -> &'static str {
        "redsys_api"
    }

    pub fn card_details(&self) -> Result<CardDetails, ValidationError> {
        let expiration = CardExpiration::new(self.expiration_year, self.expiration_month)?;
        CardDetails::new(
            &self.card_number,
            &self.card_owner,
            expiration,
            &self.card_security,
        )
    }
}

impl fmt::Debug for RedsysApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedsysApiMethod")
            .field("card_number", &mask_card_number(&self.card_number))
            .field("card_owner", &self.card_owner)
            .field("transaction_id", &self.transaction_id)
            .field("status", &self.status)
            .finish()
    }
}
