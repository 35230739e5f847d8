use url::form_urlencoded;
use url::Url;

use crate::request::Payload;

/// Content type of every POST body
pub const CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Encode a payload as `application/x-www-form-urlencoded`
pub fn encode(payload: &Payload) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in payload.iter() {
        serializer.append_pair(name, &value.to_string());
    }
    serializer.finish()
}

/// Append a payload to the query string of a URL
pub fn append_query(url: &mut Url, payload: &Payload) {
    if payload.is_empty() {
        return;
    }
    let mut pairs = url.query_pairs_mut();
    for (name, value) in payload.iter() {
        pairs.append_pair(name, &value.to_string());
    }
}
