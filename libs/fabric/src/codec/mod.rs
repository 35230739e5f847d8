//! Wire encodings for the Web Access service
//!
//! Requests go out form-encoded, responses come back as JSON wrapped in a
//! small success/failure envelope, and failures may arrive as an HTML error
//! page that has to be scraped for its message.

use serde_json::Value;

pub mod error_text;
pub mod form;
pub mod json;

/// Parsed response body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    /// Raw text, only produced when the request did not require JSON
    Text(String),
}

impl Body {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Convert into a JSON value, wrapping raw text as a JSON string
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }
}
