use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::redsys::xml::{extract_element_text, XmlError};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const SOAP_NAMESPACE: &str = "http://webservice.sis.sermepa.es";
pub const SOAP_OPERATION: &str = "trataPeticion";
pub const SOAP_PARAMETER: &str = "datoEntrada";
pub const SOAP_RETURN_ELEMENT: &str = "trataPeticionReturn";

/// Longest error body kept in [`TransportError::Status`].
const MAX_ERROR_BODY: usize = 512;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("SOAP fault: {0}")]
    Fault(String),
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid response from gateway: {0}")]
    InvalidResponse(String),
    #[error("Invalid response from gateway: {0}")]
    Xml(#[from] XmlError),
    #[error("Invalid gateway endpoint: {0}")]
    InvalidEndpoint(String),
}

/// The single remote operation offered by the gateway.
///
/// Implementations hand back the answer document as a plain string, whatever
/// shape the wire response had.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn call(&self, payload: &str) -> Result<String, TransportError>;
}

/// SOAP 1.1 client for the `trataPeticion` web service.
#[derive(Clone, Debug)]
pub struct SoapTransport {
    client: Client,
    endpoint: Url,
}

impl SoapTransport {
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let endpoint = normalize_endpoint(endpoint)?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(SoapTransport { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl GatewayTransport for SoapTransport {
    async fn call(&self, payload: &str) -> Result<String, TransportError> {
        tracing::debug!(endpoint = %self.endpoint, "calling {}", SOAP_OPERATION);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", "\"\"")
            .body(soap_envelope(payload))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // faults are delivered with a 500 status
            if let Ok(Some(fault)) = extract_element_text(&body, "faultstring") {
                return Err(TransportError::Fault(fault));
            }
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        unwrap_soap_response(&body)
    }
}

/// Parses the configured endpoint, dropping a trailing `?wsdl` so a WSDL
/// location can be used as the service address.
pub fn normalize_endpoint(endpoint: &str) -> Result<Url, TransportError> {
    let mut url = Url::parse(endpoint.trim())
        .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(TransportError::InvalidEndpoint(format!(
            "{}: scheme must be http or https",
            endpoint
        )));
    }
    if url
        .query()
        .is_some_and(|query| query.eq_ignore_ascii_case("wsdl"))
    {
        url.set_query(None);
    }

    Ok(url)
}

/// Wraps a request document in a `trataPeticion` envelope.
pub fn soap_envelope(payload: &str) -> String {
    format!(
        r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:web="{ns}"><soapenv:Header/><soapenv:Body><web:{op}><web:{param}><![CDATA[{payload}]]></web:{param}></web:{op}></soapenv:Body></soapenv:Envelope>"#,
        ns = SOAP_NAMESPACE,
        op = SOAP_OPERATION,
        param = SOAP_PARAMETER,
        payload = payload.replace("]]>", "]]]]><![CDATA[>"),
    )
}

/// Reduces a service response to the answer document.
///
/// Envelopes yield the content of `trataPeticionReturn`; anything that is not
/// an envelope is taken to already be the answer.
pub fn unwrap_soap_response(body: &str) -> Result<String, TransportError> {
    if let Some(fault) = extract_element_text(body, "faultstring")? {
        return Err(TransportError::Fault(fault));
    }
    if let Some(answer) = extract_element_text(body, SOAP_RETURN_ELEMENT)? {
        return Ok(answer);
    }
    if extract_element_text(body, "Envelope")?.is_some() {
        return Err(TransportError::InvalidResponse(format!(
            "SOAP envelope without {}",
            SOAP_RETURN_ELEMENT
        )));
    }

    Ok(body.trim().to_string())
}
