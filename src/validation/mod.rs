use std::fmt;

pub const CARD_NUMBER_MIN_LEN: usize = 12;
pub const CARD_NUMBER_MAX_LEN: usize = 19;
pub const CVC_MIN_LEN: usize = 3;
pub const CVC_MAX_LEN: usize = 4;
pub const ORDER_ID_MAX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

/// Drops control characters and every kind of whitespace.
pub fn strip_whitespace(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !ch.is_control() && !ch.is_whitespace())
        .collect()
}

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_digits(
    field: &'static str,
    value: &str,
    min_len: usize,
    max_len: usize,
) -> ValidationResult {
    validate_required(field, value)?;

    if !value.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::new(field, "must contain only digits"));
    }

    if value.len() < min_len || value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be between {} and {} digits", min_len, max_len),
        ));
    }

    Ok(())
}

pub fn validate_order_id(order_id: &str) -> ValidationResult {
    validate_required("order_id", order_id)?;
    validate_max_len("order_id", order_id, ORDER_ID_MAX_LEN)
}

pub fn validate_card_number(number: &str) -> ValidationResult {
    validate_digits(
        "card_number",
        number,
        CARD_NUMBER_MIN_LEN,
        CARD_NUMBER_MAX_LEN,
    )
}

pub fn validate_cvc(cvc: &str) -> ValidationResult {
    validate_digits("cvc", cvc, CVC_MIN_LEN, CVC_MAX_LEN)
}

pub fn validate_amount(amount: i64) -> ValidationResult {
    if amount <= 0 {
        return Err(ValidationError::new("amount", "must be greater than zero"));
    }

    Ok(())
}

pub fn validate_expiry_month(month: u32) -> ValidationResult {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::new(
            "expiry_month",
            "must be between 1 and 12",
        ));
    }

    Ok(())
}
