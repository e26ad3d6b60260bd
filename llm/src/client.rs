use crate::error::ApiError;
use reqwest::header::HeaderMap;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{Level, event, instrument, warn};

/// Per call network timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin JSON-over-HTTP wrapper shared by adapters and search backends.
#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
                reqwest::Client::new()
            });
        Client { client }
    }

    /// GET `url` with query parameters. Parameters are not traced since they may carry keys.
    #[instrument(level = "trace", skip(self, query))]
    pub async fn get<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.client.get(url).query(query).send().await?;
        Self::read_json(response).await
    }

    #[instrument(level = "trace", skip(self, headers, request))]
    pub async fn post<S, T>(&self, url: &str, headers: HeaderMap, request: &S) -> Result<T, ApiError>
    where
        S: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(request)
            .send()
            .await?;
        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(ApiError::Status { status, body });
        }
        let text = response.text().await?;
        event!(Level::TRACE, response = text);

        serde_json::from_str::<T>(&text).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}
