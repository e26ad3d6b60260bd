use super::api::{GenerateContentRequest, GenerateContentResponse};
use crate::client::Client;
use crate::error::ApiError;
use crate::providers::{AdapterSettings, keyed_headers, send};
use crate::{GenerateRequest, GenerationParams, ProviderAdapter};
use async_trait::async_trait;
use reqwest::header::HeaderName;

/// Adapter for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiAdapter {
    client: Client,
    settings: AdapterSettings,
    params: GenerationParams,
}

impl GeminiAdapter {
    pub fn new(client: Client, settings: AdapterSettings) -> Self {
        GeminiAdapter {
            client,
            settings,
            params: GenerationParams::default(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn name(&self) -> &str {
        &self.settings.name
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ApiError> {
        let headers = keyed_headers(HeaderName::from_static("x-goog-api-key"), &self.settings.api_key)?;
        let body = GenerateContentRequest::from_request(request, self.params);
        send::<_, GenerateContentResponse>(&self.client, &self.settings, headers, &body).await
    }
}
