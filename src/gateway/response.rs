//! Response normalization.
//!
//! Collapses whatever the transport produced into the one canonical shape the
//! rest of the system renders. Header names flatten to a last-value-wins map;
//! JSON bodies are pretty-printed when they parse, and kept as raw text when
//! they do not.

use crate::gateway::types::NormalizedResponse;
use std::collections::HashMap;
use url::Url;

/// Whether a content-type announces structured JSON data.
pub fn is_json_content(content_type: Option<&str>) -> bool {
    match content_type {
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            ct.contains("application/json") || ct.contains("+json")
        }
        None => false,
    }
}

/// Pretty-prints a JSON body, falling back silently to the raw text when it
/// does not parse.
pub fn render_body(content_type: Option<&str>, raw: String) -> String {
    if !is_json_content(content_type) {
        return raw;
    }
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or(raw),
        Err(_) => raw,
    }
}

/// Normalizes a real transport response. Consumes the response body; a body
/// read failure downgrades to a network error rather than propagating.
pub async fn normalize(requested_url: &Url, response: reqwest::Response) -> NormalizedResponse {
    let status = response.status();
    let final_url = response.url().to_string();
    // reqwest exposes only the final URL, not the redirect history, so a
    // redirect chain that lands back on the requested URL reads as false.
    let redirected = response.url() != requested_url;

    let headers: HashMap<String, String> = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("").to_string(),
            )
        })
        .collect();
    let content_type = headers.get("content-type").cloned();

    let raw = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(url = %final_url, error = %e, "failed to read response body");
            return NormalizedResponse::network_error(
                &final_url,
                format!("Failed to read response body: {e}"),
            );
        }
    };

    NormalizedResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        body: render_body(content_type.as_deref(), raw),
        final_url,
        redirected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_detection() {
        assert!(is_json_content(Some("application/json")));
        assert!(is_json_content(Some("application/json; charset=utf-8")));
        assert!(is_json_content(Some("application/problem+json")));
        assert!(!is_json_content(Some("text/html")));
        assert!(!is_json_content(Some("application/xml")));
        assert!(!is_json_content(None));
    }

    #[test]
    fn json_bodies_are_pretty_printed() {
        let body = render_body(Some("application/json"), r#"{"a":1}"#.to_string());
        assert_eq!(body, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn unparseable_json_falls_back_to_raw_text() {
        let raw = "{not json at all".to_string();
        assert_eq!(render_body(Some("application/json"), raw.clone()), raw);
    }

    #[test]
    fn non_json_bodies_are_untouched() {
        let raw = "  {\"a\":1}  ".to_string();
        assert_eq!(render_body(Some("text/plain"), raw.clone()), raw);
    }
}
