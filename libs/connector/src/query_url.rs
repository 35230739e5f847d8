//! Decoding of previously generated query URLs
//!
//! A Web Access list URL such as
//! `https://host/WebAccess/query/list.rails?class_name=Incident&query=Open`
//! carries everything needed to re-run the query. [`parse_query_url`] turns
//! it back into [`QueryData`], which [`QueryApi::run_parsed`] accepts.
//!
//! [`QueryApi::run_parsed`]: crate::query::QueryApi::run_parsed

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use webdesk_fabric::{Payload, Scalar};

/// Query parameters recovered from a URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryData {
    pub class_name: Scalar,
    /// Saved query name, dropped when `attributes` is present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<Scalar>,
    /// Forwarded as given; the service currently ignores it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cns: Option<Scalar>,
    /// Condition values `c0, c1, ...` in index order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Scalar>,
}

impl QueryData {
    /// Form fields for `/query/list.rails`
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new().with("class_name", self.class_name.clone());
        payload.insert_opt("query", self.query.clone());
        payload.insert_opt("attributes", self.attributes.clone());
        payload.insert_opt("page_size", self.page_size.clone());
        payload.insert_opt("sort_by", self.sort_by.clone());
        payload.insert_opt("cns", self.cns.clone());
        for (index, value) in self.conditions.iter().enumerate() {
            payload.insert(format!("c{}", index), value.clone());
        }
        payload
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedQueryUrl {
    /// Application root the URL pointed at, absent for a bare query string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_access_url: Option<String>,
    pub query_data: QueryData,
}

/// Parse a full URL, a root-relative URL or a bare query string
///
/// Returns `None` when no `class_name` parameter is present.
pub fn parse_query_url(input: &str) -> Option<ParsedQueryUrl> {
    let (web_access_url, query_string) = split_base(input);
    let mut params = parse_params(query_string);

    let class_name = params.remove("class_name")?;
    let attributes = params.remove("attributes");
    let query = params.remove("query").filter(|_| attributes.is_none());

    let mut conditions = Vec::new();
    while let Some(value) = params.remove(&format!("c{}", conditions.len())) {
        conditions.push(value);
    }

    Some(ParsedQueryUrl {
        web_access_url,
        query_data: QueryData {
            class_name,
            query,
            attributes,
            page_size: params.remove("page_size"),
            sort_by: params.remove("sort_by"),
            cns: params.remove("cns"),
            conditions,
        },
    })
}

/// Separate the application root from the query string
fn split_base(input: &str) -> (Option<String>, &str) {
    let is_absolute = input
        .get(..4)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http"));

    if is_absolute {
        let (location, query) = input.split_once('?').unwrap_or((input, ""));
        let base = location.split('/').take(4).collect::<Vec<_>>().join("/");
        (Some(base), query)
    } else if let Some(relative) = input.strip_prefix('/') {
        let (location, query) = relative.split_once('?').unwrap_or((relative, ""));
        let root = location.split('/').next().unwrap_or_default();
        (Some(format!("/{}", root)), query)
    } else {
        (None, input.strip_prefix('?').unwrap_or(input))
    }
}

fn parse_params(query: &str) -> HashMap<String, Scalar> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(name), coerce(decode(value)))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn coerce(text: String) -> Scalar {
    match text.parse::<f64>() {
        Ok(number) if number.is_finite() => Scalar::Number(number),
        _ => Scalar::Text(text),
    }
}
