pub mod export;
pub mod payment_manager;

pub use payment_manager::{PaymentOutcome, RedsysApiManager, PAYMENT_NAME};
