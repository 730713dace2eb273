//! Pure helpers: URL joining, body decoding, error reasons (no HTTP).

use serde_json::Value;

use esgate_core::TransportError;

/// Join the base URL and a request path with exactly one `/`.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Decode a response body: JSON when possible, otherwise the raw text.
///
/// Empty bodies (e.g. HEAD responses) decode to `null`.
pub(crate) fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Extract a human-readable reason from an error response body.
///
/// Expected format: `{"error": {"type": "...", "reason": "..."}, "status": 403}`.
/// Falls back to the (truncated) raw body, then to `fallback`.
pub(crate) fn error_reason(body: &str, fallback: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let reason = match json.get("error") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(error) => error
                .get("reason")
                .and_then(Value::as_str)
                .map(String::from),
            None => None,
        };
        if let Some(reason) = reason {
            return reason;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

/// Map a request failure to a transport error.
pub(crate) fn network_error(context: &str, err: reqwest::Error) -> TransportError {
    TransportError::Network {
        message: format!("{}: {}", context, err),
    }
}
