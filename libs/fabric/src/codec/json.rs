use serde_json::Value;

use crate::codec::Body;
use crate::error::{Error, Result};

/// Decode a 200 response body
///
/// Unparseable text is an error only when the caller required JSON.
pub fn decode(text: &str, require_json: bool) -> Result<Body> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            check_envelope(&value)?;
            Ok(Body::Json(value))
        }
        Err(_) if require_json => Err(Error::InvalidResponse),
        Err(_) => Ok(Body::Text(text.to_string())),
    }
}

/// Reject a body whose envelope reports a service-level failure
///
/// Only an explicit `"success": false` counts; bodies without the flag are
/// plain data.
pub fn check_envelope(value: &Value) -> Result<()> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or("Request Failed");
        return Err(Error::Remote(message.to_string()));
    }
    Ok(())
}
