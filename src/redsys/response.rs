//! Interpretation of gateway answers.

use crate::redsys::errors::{gateway_error_message, response_code_message, UNKNOWN_ERROR_MESSAGE};
use crate::redsys::xml::{parse_flat_xml, ResponseData, XmlError};

pub const RESPONSE_CODE_TAG: &str = "DS_RESPONSE";
pub const ERROR_CODE_TAG: &str = "CODIGO";
pub const AUTHORIZATION_CODE_TAG: &str = "DS_AUTHORISATIONCODE";

/// `CODIGO` value of a request the gateway accepted for processing.
const SUCCESS_ERROR_CODE: &str = "0";
/// Response codes below this value are approvals.
const APPROVED_BELOW: u32 = 100;
/// Approval code used for refunds and confirmations.
const APPROVED_OPERATION: u32 = 900;

/// A parsed gateway answer together with the raw document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    raw: String,
    data: ResponseData,
}

impl GatewayResponse {
    pub fn parse(raw: String) -> Result<Self, XmlError> {
        let data = parse_flat_xml(&raw)?;
        Ok(Self { raw, data })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn data(&self) -> &ResponseData {
        &self.data
    }

    pub fn response_code(&self) -> Option<&str> {
        self.data.get(RESPONSE_CODE_TAG)
    }

    pub fn error_code(&self) -> Option<&str> {
        self.data.get(ERROR_CODE_TAG)
    }

    pub fn authorization_code(&self) -> Option<&str> {
        self.data.get(AUTHORIZATION_CODE_TAG)
    }

    pub fn is_authorized(&self) -> bool {
        is_authorized_code(self.response_code())
    }

    /// Human readable reason for a decline.
    ///
    /// The `CODIGO` table is consulted first, then the `Ds_Response` table.
    /// Codes found in neither fall back to [`UNKNOWN_ERROR_MESSAGE`] followed
    /// by the code that caused the decline.
    pub fn decline_message(&self) -> String {
        if let Some(message) = self.error_code().and_then(gateway_error_message) {
            return message.to_string();
        }
        if let Some(message) = self.response_code().and_then(response_code_message) {
            return message.to_string();
        }

        match self.decline_code() {
            Some(code) => format!("{} ({})", UNKNOWN_ERROR_MESSAGE, code),
            None => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }

    /// `CODIGO` unless it is the success value, then `Ds_Response`.
    fn decline_code(&self) -> Option<&str> {
        let error_code = self.error_code().map(str::trim);
        match error_code {
            Some(code) if code != SUCCESS_ERROR_CODE => Some(code),
            _ => self.response_code().or(error_code),
        }
    }
}

/// Approval is `0..=99` or exactly `900`. Missing or non-numeric codes are
/// declines.
pub fn is_authorized_code(code: Option<&str>) -> bool {
    match code.map(str::trim).and_then(|c| c.parse::<u32>().ok()) {
        Some(value) => value < APPROVED_BELOW || value == APPROVED_OPERATION,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: &str) -> GatewayResponse {
        GatewayResponse::parse(format!("<RETORNOXML>{}</RETORNOXML>", body)).unwrap()
    }

    #[test]
    fn test_authorization_bands() {
        assert!(is_authorized_code(Some("0")));
        assert!(is_authorized_code(Some("0000")));
        assert!(is_authorized_code(Some("99")));
        assert!(!is_authorized_code(Some("100")));
        assert!(!is_authorized_code(Some("0190")));
        assert!(!is_authorized_code(Some("899")));
        assert!(is_authorized_code(Some("900")));
        assert!(is_authorized_code(Some("0900")));
        assert!(!is_authorized_code(Some("901")));
        assert!(!is_authorized_code(Some("9915")));
        assert!(!is_authorized_code(None));
    }

    #[test]
    fn test_non_numeric_code_is_declined() {
        assert!(!is_authorized_code(Some("OK")));
        assert!(!is_authorized_code(Some("-1")));
        assert!(!is_authorized_code(Some("")));
    }

    #[test]
    fn test_missing_response_code_is_declined() {
        let res = response("<CODIGO>SIS0042</CODIGO>");
        assert!(!res.is_authorized());
        assert_eq!(res.response_code(), None);
    }

    #[test]
    fn test_fields_are_read_case_insensitively() {
        let res = response(
            "<CODIGO>0</CODIGO><OPERACION><Ds_Response>000</Ds_Response>\
             <Ds_AuthorisationCode>ABC123</Ds_AuthorisationCode></OPERACION>",
        );

        assert!(res.is_authorized());
        assert_eq!(res.response_code(), Some("000"));
        assert_eq!(res.error_code(), Some("0"));
        assert_eq!(res.authorization_code(), Some("ABC123"));
    }

    #[test]
    fn test_decline_message_prefers_gateway_error() {
        let res = response("<CODIGO>SIS0051</CODIGO><DS_RESPONSE>0913</DS_RESPONSE>");
        assert_eq!(res.decline_message(), "Error número de pedido repetido");
    }

    #[test]
    fn test_decline_message_falls_back_to_response_code() {
        let res = response("<CODIGO>0</CODIGO><DS_RESPONSE>0129</DS_RESPONSE>");
        assert_eq!(
            res.decline_message(),
            "Código de seguridad (CVV2/CVC2) incorrecto"
        );
    }

    #[test]
    fn test_decline_message_unknown_code() {
        let res = response("<CODIGO>SIS9999</CODIGO>");
        assert_eq!(res.decline_message(), "Error desconocido (SIS9999)");

        let empty = response("<OTHER>1</OTHER>");
        assert_eq!(empty.decline_message(), "Error desconocido");
    }

    #[test]
    fn test_decline_message_names_response_code_when_codigo_is_success() {
        let res = response("<CODIGO>0</CODIGO><OPERACION><Ds_Response>0181</Ds_Response></OPERACION>");
        assert_eq!(res.decline_message(), "Error desconocido (0181)");
    }

    #[test]
    fn test_decline_message_unknown_codigo_wins_over_response_code() {
        let res = response("<CODIGO>SIS9999</CODIGO><DS_RESPONSE>0181</DS_RESPONSE>");
        assert_eq!(res.decline_message(), "Error desconocido (SIS9999)");

        let only_success = response("<CODIGO>0</CODIGO>");
        assert_eq!(only_success.decline_message(), "Error desconocido (0)");
    }

    #[test]
    fn test_raw_document_is_kept() {
        let raw = "<RETORNOXML><CODIGO>0</CODIGO></RETORNOXML>".to_string();
        let res = GatewayResponse::parse(raw.clone()).unwrap();
        assert_eq!(res.raw(), raw);
    }
}
