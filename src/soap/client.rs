use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;

use super::envelope::build_request;
use super::response::parse_positions;
use crate::config::deserialize_duration;
use crate::poller::{PollerError, PositionService, RequestParameters};
use crate::position::PositionEntry;

pub const DEFAULT_URL: &str = "http://www.n2yo.com/sat/satws.php";
pub const DEFAULT_NAMESPACE: &str = "urn:satwsdl";
pub const DEFAULT_METHOD: &str = "GetPositionsByIp";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where and how to reach the position service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SoapEndpoint {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_method")]
    pub method: String,
    /// Upper bound on one request, connection included.
    #[serde(default = "default_timeout", deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Default for SoapEndpoint {
    fn default() -> Self {
        Self {
            url: default_url(),
            namespace: default_namespace(),
            method: default_method(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SoapEndpoint {
    pub fn soap_action(&self) -> String {
        format!("{}/{}", self.namespace, self.method)
    }
}

/// [`PositionService`] backed by the SOAP web service.
pub struct SoapClient {
    http: reqwest::Client,
    endpoint: SoapEndpoint,
}

impl SoapClient {
    pub fn new(endpoint: SoapEndpoint) -> Result<Self, PollerError> {
        let http = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .build()?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &SoapEndpoint {
        &self.endpoint
    }
}

impl PositionService for SoapClient {
    async fn get_positions(
        &self,
        params: &RequestParameters,
    ) -> Result<Vec<PositionEntry>, PollerError> {
        let body = build_request(&self.endpoint, params);

        let response = self
            .http
            .post(&self.endpoint.url)
            .header(CONTENT_TYPE, "text/xml;charset=utf-8")
            .header("SOAPAction", self.endpoint.soap_action())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // SOAP 1.1 services report faults with a 500 and a fault body.
            return match parse_positions(&text) {
                Err(fault @ PollerError::Fault(_)) => Err(fault),
                _ => Err(PollerError::Transport(format!("HTTP {}", status))),
            };
        }

        parse_positions(&text)
    }
}
