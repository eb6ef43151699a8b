//! HTTP helpers shared by the remote stores.

use reqwest::Response;
use serde::de::DeserializeOwned;

use flux_core::error::{Result, SearchError};

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Turns a non-success response into a `Network` error.
pub(crate) async fn ensure_success(response: Response, service: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());

    Err(SearchError::http_status(
        status.as_u16(),
        format!("{service} returned {status}: {}", extract_error_message(&body)),
    ))
}

/// Decodes a JSON body; an unusable envelope counts as a service failure.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, service: &str) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| SearchError::network(format!("Malformed {service} response: {e}")))
}

/// Pulls the human readable message out of a JSON error body.
///
/// Key-value stores answer `{"error": "..."}`, REST stores answer
/// `{"message": "..."}`; anything else is returned verbatim (truncated).
fn extract_error_message(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .or_else(|| json.get("message"))
                .and_then(|msg| msg.as_str())
                .map(|msg| msg.to_string())
        })
        .unwrap_or_else(|| body.to_string());

    if message.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &message[..end])
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_message_variants() {
        assert_eq!(
            extract_error_message(r#"{"error":"WRONGPASS invalid token"}"#),
            "WRONGPASS invalid token"
        );
        assert_eq!(
            extract_error_message(r#"{"message":"relation does not exist"}"#),
            "relation does not exist"
        );
        assert_eq!(extract_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_extract_error_message_truncates() {
        let long = "x".repeat(2000);
        let message = extract_error_message(&long);
        assert_eq!(message.len(), MAX_ERROR_BODY + 3);
    }
}
