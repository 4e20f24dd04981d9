use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use csv::Writer;
use serde::Serialize;

use crate::domain::Transaction;

/// CSV row representation of a stored transaction.
#[derive(Serialize)]
struct TransactionCsvRow {
    id: String,
    order_id: String,
    amount: i64,
    transaction_type: i16,
    return_code: String,
    error_code: String,
    authorization_code: String,
    created_at: String,
}

impl From<&Transaction> for TransactionCsvRow {
    fn from(tx: &Transaction) -> Self {
        TransactionCsvRow {
            id: tx.id().to_string(),
            order_id: tx.order_id().to_string(),
            amount: tx.amount(),
            transaction_type: tx.kind().code(),
            return_code: tx.return_code().to_string(),
            error_code: tx.error_code().to_string(),
            authorization_code: tx.authorization_code().to_string(),
            created_at: tx.created_at().to_rfc3339(),
        }
    }
}

/// Writes one CSV row per transaction, with a header. Raw gateway messages
/// are left out.
pub fn write_transactions_csv<W: Write>(
    writer: W,
    transactions: &[Transaction],
) -> Result<(), csv::Error> {
    let mut csv = Writer::from_writer(writer);
    for tx in transactions {
        csv.serialize(TransactionCsvRow::from(tx))?;
    }
    csv.flush()?;
    Ok(())
}

/// Parses `YYYY-MM-DD` or RFC 3339. A bare date means the start of that day,
/// or its last second when `end_of_day` is set.
pub fn parse_date(date_str: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        let time = if end_of_day {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        return time
            .map(|naive| naive.and_utc())
            .ok_or_else(|| format!("Invalid date: {}", date_str));
    }

    DateTime::parse_from_rfc3339(date_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid date format: {}", e))
}
