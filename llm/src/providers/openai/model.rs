use super::api::{ChatCompletionRequest, ChatCompletionResponse};
use crate::client::Client;
use crate::error::ApiError;
use crate::providers::{AdapterSettings, bearer_headers, send};
use crate::{GenerateRequest, GenerationParams, ProviderAdapter};
use async_trait::async_trait;

/// Adapter for OpenAI style `/chat/completions` endpoints (OpenAI, DeepSeek).
#[derive(Clone)]
pub struct ChatCompletionsAdapter {
    client: Client,
    settings: AdapterSettings,
    params: GenerationParams,
}

impl ChatCompletionsAdapter {
    pub fn new(client: Client, settings: AdapterSettings) -> Self {
        ChatCompletionsAdapter {
            client,
            settings,
            params: GenerationParams::default(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for ChatCompletionsAdapter {
    fn name(&self) -> &str {
        &self.settings.name
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ApiError> {
        let headers = bearer_headers(&self.settings.api_key)?;
        let body = ChatCompletionRequest::from_request(&self.settings.model, request, self.params);
        send::<_, ChatCompletionResponse>(&self.client, &self.settings, headers, &body).await
    }
}
