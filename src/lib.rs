pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod ports;
pub mod redsys;
pub mod services;
pub mod utils;
pub mod validation;

pub use config::Config;
pub use error::PaymentError;
pub use services::{PaymentOutcome, RedsysApiManager};
