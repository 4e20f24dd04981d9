//! Redsys SOAP gateway: request signing, transport and answer parsing.

pub mod client;
pub mod errors;
pub mod request;
pub mod response;
pub mod signature;
pub mod xml;

pub use client::{GatewayTransport, SoapTransport, TransportError};
pub use request::{MerchantCredentials, SignedRequest};
pub use response::GatewayResponse;
pub use xml::{parse_flat_xml, ResponseData, XmlError};
