use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Client, StatusCode};
use tracing::{debug, trace, warn};
use url::Url;

use crate::codec::{error_text, form, json};
use crate::error::{Error, Result};
use crate::request::{Payload, Verb};
use crate::transport::{Response, ResponseMeta, Transport};

/// Page the service redirects to when integrated (single sign-on) logon fails
pub const INTEGRATED_LOGON_FAILED_MARKER: &str = "IntegratedLogonFailed";

const REQUESTED_WITH: &str = "X-Requested-With";
const XML_HTTP_REQUEST: &str = "XMLHttpRequest";
const ACCEPT_JSON: &str = "application/json";

/// HTTP transport backed by a cookie-keeping `reqwest` client
///
/// The cookie store carries the session established by a logon call into
/// every later exchange made through the same transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Transport with a cookie store and no timeout
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the transport
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn preview(text: &str) -> String {
    text.chars().take(500).collect()
}

fn redirected_to_logon_failure(meta: &ResponseMeta) -> bool {
    meta.url.contains(INTEGRATED_LOGON_FAILED_MARKER)
        || meta
            .header(LOCATION.as_str())
            .is_some_and(|target| target.contains(INTEGRATED_LOGON_FAILED_MARKER))
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        url: &str,
        verb: Verb,
        payload: Option<&Payload>,
        require_json: bool,
    ) -> Result<Response> {
        let mut target = Url::parse(url)?;

        let request = match verb {
            Verb::Get => {
                if let Some(payload) = payload {
                    form::append_query(&mut target, payload);
                }
                self.client.get(target)
            }
            Verb::Post => {
                let body = payload.map(form::encode).unwrap_or_default();
                self.client
                    .post(target)
                    .header(CONTENT_TYPE, form::CONTENT_TYPE)
                    .body(body)
            }
        };
        let request = request
            .header(ACCEPT, ACCEPT_JSON)
            .header(REQUESTED_WITH, XML_HTTP_REQUEST);

        trace!("Sending {} request to {}", verb, url);
        let response = request.send().await.map_err(|e| {
            warn!("{} {} failed to connect: {}", verb, url, e);
            Error::ConnectionFailed
        })?;

        let status = response.status();
        let meta = ResponseMeta {
            status: status.as_u16(),
            url: response.url().to_string(),
            headers: response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect(),
        };

        if redirected_to_logon_failure(&meta) {
            warn!("{} {} redirected to the integrated logon failure page", verb, url);
            return Err(Error::IntegratedLogonFailed);
        }

        let text = response.text().await.map_err(|e| {
            warn!("{} {} failed while reading the body: {}", verb, url, e);
            Error::ConnectionFailed
        })?;

        debug!("Response status: {}", status);
        trace!("Response body (first 500 chars): {}", preview(&text));

        if status != StatusCode::OK {
            let error = error_text::extract(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
                &text,
            );
            debug!("{} {} failed: {}", verb, url, error);
            return Err(error);
        }

        let body = json::decode(&text, require_json)?;
        Ok(Response { body, meta })
    }
}

/// Builder for configuring HTTP transport
pub struct HttpTransportBuilder {
    timeout: Option<Duration>,
    cookie_store: bool,
    user_agent: String,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            timeout: None,
            cookie_store: true,
            user_agent: format!("webdesk-connector/{}", webdesk_core::VERSION),
        }
    }
}

impl HttpTransportBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a whole-exchange timeout; expiry is reported as a connection failure
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Keep session cookies between exchanges (on by default)
    pub fn cookie_store(mut self, enabled: bool) -> Self {
        self.cookie_store = enabled;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the transport with the configured settings
    pub fn build(self) -> Result<HttpTransport> {
        let mut builder = Client::builder()
            .cookie_store(self.cookie_store)
            .user_agent(self.user_agent);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Custom(format!("HTTP client setup failed: {}", e)))?;
        Ok(HttpTransport { client })
    }
}
