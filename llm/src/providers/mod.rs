pub(crate) mod anthropic;
pub(crate) mod gemini;
pub(crate) mod huggingface;
pub(crate) mod openai;

pub use anthropic::MessagesAdapter;
pub use gemini::GeminiAdapter;
pub use huggingface::HuggingFaceAdapter;
pub use openai::ChatCompletionsAdapter;

use crate::client::Client;
use crate::error::ApiError;
use crate::traffic_log;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Static connection details shared by every adapter.
#[derive(Clone, Debug)]
pub struct AdapterSettings {
    pub name: String,
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
}

/// Provider response body that carries one answer.
pub(crate) trait IntoText {
    fn into_text(self) -> Result<String, ApiError>;
}

/// POST `body` to the adapter endpoint and pull the answer out of the reply.
pub(crate) async fn send<S, R>(
    client: &Client,
    settings: &AdapterSettings,
    headers: HeaderMap,
    body: &S,
) -> Result<String, ApiError>
where
    S: Serialize,
    R: DeserializeOwned + Serialize + IntoText,
{
    traffic_log::log_request(&settings.name, body);
    match client.post::<_, R>(&settings.endpoint, headers, body).await {
        Ok(response) => {
            traffic_log::log_response(&settings.name, &response);
            response.into_text()
        }
        Err(e) => {
            traffic_log::log_error(&settings.name, &e.to_string());
            Err(e)
        }
    }
}

pub(crate) fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

pub(crate) fn bearer_headers(api_key: &str) -> Result<HeaderMap, ApiError> {
    if api_key.trim().is_empty() {
        return Err(ApiError::MissingCredential);
    }
    keyed_headers(AUTHORIZATION, &format!("Bearer {}", api_key))
}

pub(crate) fn keyed_headers(name: HeaderName, value: &str) -> Result<HeaderMap, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::MissingCredential);
    }
    let mut headers = json_headers();
    let value = HeaderValue::from_str(value).map_err(|_| ApiError::InvalidCredential)?;
    headers.insert(name, value);
    Ok(headers)
}
