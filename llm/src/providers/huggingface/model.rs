use super::api::{TextGenerationRequest, TextGenerationResponse};
use crate::client::Client;
use crate::error::ApiError;
use crate::providers::{AdapterSettings, bearer_headers, send};
use crate::{GenerateRequest, GenerationParams, ProviderAdapter};
use async_trait::async_trait;

/// Adapter for the Hugging Face hosted inference API.
#[derive(Clone)]
pub struct HuggingFaceAdapter {
    client: Client,
    settings: AdapterSettings,
    params: GenerationParams,
}

impl HuggingFaceAdapter {
    pub fn new(client: Client, settings: AdapterSettings) -> Self {
        HuggingFaceAdapter {
            client,
            settings,
            params: GenerationParams::default(),
        }
    }
}

#[async_trait]
impl ProviderAdapter for HuggingFaceAdapter {
    fn name(&self) -> &str {
        &self.settings.name
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ApiError> {
        let headers = bearer_headers(&self.settings.api_key)?;
        let body = TextGenerationRequest::from_request(request, self.params);
        send::<_, TextGenerationResponse>(&self.client, &self.settings, headers, &body).await
    }
}
