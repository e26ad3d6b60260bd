use async_trait::async_trait;
use std::sync::Arc;

pub mod api;
pub mod client;
pub mod error;
pub mod providers;
pub mod registry;
mod traffic_log;

pub use api::{GenerateRequest, GenerationParams, SYSTEM_PREAMBLE};
pub use error::{ApiError, DispatchError, RegistryError};
pub use registry::{ProviderConfig, ProviderId, ProviderRegistry};

/// A backend that turns a normalized request into answer text.
///
/// Implementations report failures as [`ApiError`]; the registry collapses
/// them into display text at its boundary.
#[async_trait]
pub trait ProviderAdapter {
    /// Human readable provider name used in error text ("OpenAI", "Gemini", ...)
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ApiError>;
}

#[async_trait]
impl ProviderAdapter for Arc<dyn ProviderAdapter + Send + Sync> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ApiError> {
        (**self).generate(request).await
    }
}
