//! Traffic logging for provider calls
//!
//! Bodies are truncated to avoid leaking private data in logs.

use tracing::{debug, warn};

/// Maximum characters to log for content
const MAX_CONTENT_LOG_CHARS: usize = 200;

fn truncate_for_log(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}... ({} chars total)", truncated, char_count)
    }
}

fn summarize(body: &impl serde::Serialize) -> String {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "<serialization error>".to_string());
    truncate_for_log(&json, MAX_CONTENT_LOG_CHARS)
}

pub fn log_request(provider: &str, request: &impl serde::Serialize) {
    debug!(target: "traffic", provider, "REQUEST {}", summarize(request));
}

pub fn log_response(provider: &str, response: &impl serde::Serialize) {
    debug!(target: "traffic", provider, "RESPONSE {}", summarize(response));
}

pub fn log_error(provider: &str, error: &str) {
    warn!(target: "traffic", provider, "ERROR {}", error);
}
