use super::api::{ANTHROPIC_VERSION, MessagesRequest, MessagesResponse};
use crate::client::Client;
use crate::error::ApiError;
use crate::providers::{AdapterSettings, keyed_headers, send};
use crate::{GenerateRequest, GenerationParams, ProviderAdapter};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// Adapter for the Anthropic `/v1/messages` endpoint.
#[derive(Clone)]
pub struct MessagesAdapter {
    client: Client,
    settings: AdapterSettings,
    params: GenerationParams,
}

impl MessagesAdapter {
    pub fn new(client: Client, settings: AdapterSettings) -> Self {
        MessagesAdapter {
            client,
            settings,
            params: GenerationParams::default(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for MessagesAdapter {
    fn name(&self) -> &str {
        &self.settings.name
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ApiError> {
        let mut headers = keyed_headers(HeaderName::from_static("x-api-key"), &self.settings.api_key)?;
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let body = MessagesRequest::from_request(&self.settings.model, request, self.params);
        send::<_, MessagesResponse>(&self.client, &self.settings, headers, &body).await
    }
}
