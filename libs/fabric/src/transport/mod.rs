use crate::codec::Body;
use crate::error::Result;
use crate::request::{Payload, Verb};

pub mod http;

pub use self::http::{HttpTransport, HttpTransportBuilder};

/// Status line and headers of a completed exchange
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseMeta {
    pub status: u16,
    /// Final URL after any redirects
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl ResponseMeta {
    /// Look up a header, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Successful exchange: a 200 status and a decoded body
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub body: Body,
    pub meta: ResponseMeta,
}

/// Transport trait for performing one HTTP exchange
///
/// Implementations report any non-200 status, an integrated-logon redirect,
/// an unparseable body where JSON was required, or a failure envelope as an
/// [`Error`](crate::error::Error) carrying the status and extracted text.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Perform the exchange
    ///
    /// For GET the payload is form-encoded onto the query string, for POST
    /// it is sent as a form-encoded body.
    async fn call(
        &self,
        url: &str,
        verb: Verb,
        payload: Option<&Payload>,
        require_json: bool,
    ) -> Result<Response>;
}
