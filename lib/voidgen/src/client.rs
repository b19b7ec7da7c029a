//! Single-attempt HTTP fetch of SPARQL results.

use crate::error::FetchError;
use oxhttp::model::header::ACCEPT;
use oxhttp::model::Request;
use std::io::{Error, ErrorKind};
use std::time::Duration;
use tracing::{debug, info};

const RESULTS_XML_MEDIA_TYPE: &str = "application/sparql-results+xml";
const LOGGED_BODY_LIMIT: usize = 1024;

/// Source of raw query result payloads.
///
/// The production implementation is [`SparqlClient`]; tests substitute
/// canned payloads.
pub trait ResultFetcher {
    /// Runs one query and returns the raw payload.
    ///
    /// One attempt only: any failure is reported, never retried.
    fn fetch(&self, query: &str, name: &str) -> Result<String, FetchError>;
}

/// Issues queries against a SPARQL endpoint over HTTP GET.
pub struct SparqlClient {
    endpoint: String,
    client: oxhttp::Client,
}

impl SparqlClient {
    /// Builds a client for the given endpoint.
    ///
    /// The timeout applies to each whole request, connection included.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = oxhttp::Client::new()
            .with_global_timeout(timeout)
            .with_user_agent(concat!("voidgen/", env!("CARGO_PKG_VERSION")))
            .unwrap();
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

impl ResultFetcher for SparqlClient {
    fn fetch(&self, query: &str, name: &str) -> Result<String, FetchError> {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("query", query)
            .finish();
        let url = format!("{}?{}", self.endpoint, encoded);
        let request = Request::builder()
            .uri(url)
            .header(ACCEPT, RESULTS_XML_MEDIA_TYPE)
            .body(())
            .map_err(invalid_input_error)?;
        let response = self.client.request(request).map_err(Error::from)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.into_body().to_string().unwrap_or_default();
            let excerpt: String = body.chars().take(LOGGED_BODY_LIMIT).collect();
            debug!("query '{name}' got status {status}: {excerpt}");
            return Err(FetchError::Status {
                status: status.as_u16(),
                name: name.to_owned(),
            });
        }
        info!("call ok for '{name}'");
        Ok(response.into_body().to_string()?)
    }
}

fn invalid_input_error(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> FetchError {
    FetchError::Io(Error::new(ErrorKind::InvalidInput, error))
}
