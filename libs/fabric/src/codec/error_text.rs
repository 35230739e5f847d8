use serde_json::Value;

use crate::error::Error;

/// Marker the service's HTML error page places before the exception text
pub const EXCEPTION_MARKER: &str = "exceptionMessage";

/// Build the error for a failed exchange
///
/// Preference order: the `message` of a JSON body, then the paragraph that
/// follows the exception marker of an HTML error page, then
/// `"<status text> <status>"`. A status of 0 with no status text means the
/// connection itself failed.
pub fn extract(status: u16, status_text: &str, body: &str) -> Error {
    if status == 0 && status_text.is_empty() {
        return Error::ConnectionFailed;
    }
    let text = json_message(body)
        .or_else(|| html_exception(body))
        .unwrap_or_else(|| format!("{} {}", status_text, status).trim().to_string());
    Error::HttpStatus { status, text }
}

fn json_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

/// Text of the first `<p>` after the exception marker, bounded by `</div>`
pub fn html_exception(body: &str) -> Option<String> {
    let after_marker = &body[body.find(EXCEPTION_MARKER)? + EXCEPTION_MARKER.len()..];
    let after_open = &after_marker[after_marker.find("<p>")? + "<p>".len()..];
    let fragment = match after_open.find("</div>") {
        Some(end) => &after_open[..end],
        None => return None,
    };
    let text = fragment
        .find("</p>")
        .map_or(fragment, |end| &fragment[..end])
        .trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
