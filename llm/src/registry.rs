//! Provider configuration and routing.
//!
//! The registry is built once at startup from [`Credentials`]. Each enabled
//! provider gets exactly one adapter (and one HTTP client) for the lifetime of
//! the process. Calls through [`ProviderRegistry::query`] never fail: every
//! problem is rendered as answer text.

use crate::client::Client;
use crate::error::{DispatchError, RegistryError};
use crate::providers::{
    AdapterSettings, ChatCompletionsAdapter, GeminiAdapter, HuggingFaceAdapter, MessagesAdapter,
};
use crate::{GenerateRequest, ProviderAdapter};
use config::Credentials;
use config::credentials as keys;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// The closed set of supported backends, in registry order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderId {
    DeepSeek,
    OpenAI,
    Anthropic,
    Gemini,
    HuggingFace,
}

impl ProviderId {
    pub const ALL: [ProviderId; 5] = [
        ProviderId::DeepSeek,
        ProviderId::OpenAI,
        ProviderId::Anthropic,
        ProviderId::Gemini,
        ProviderId::HuggingFace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "deepseek",
            ProviderId::OpenAI => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Gemini => "gemini",
            ProviderId::HuggingFace => "huggingface",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "DeepSeek",
            ProviderId::OpenAI => "OpenAI",
            ProviderId::Anthropic => "Anthropic",
            ProviderId::Gemini => "Google Gemini",
            ProviderId::HuggingFace => "Hugging Face",
        }
    }

    /// Name used in "Error calling <name> API: ..." texts.
    pub fn error_label(&self) -> &'static str {
        match self {
            ProviderId::Gemini => "Gemini",
            other => other.display_name(),
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "https://api.deepseek.com",
            ProviderId::OpenAI => "https://api.openai.com",
            ProviderId::Anthropic => "https://api.anthropic.com",
            ProviderId::Gemini => "https://generativelanguage.googleapis.com",
            ProviderId::HuggingFace => "https://api-inference.huggingface.co",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "deepseek-chat",
            ProviderId::OpenAI => "gpt-3.5-turbo",
            ProviderId::Anthropic => "claude-3-sonnet-20240229",
            ProviderId::Gemini => "gemini-2.0-flash",
            ProviderId::HuggingFace => "mistralai/Mixtral-8x7B-Instruct-v0.1",
        }
    }

    fn endpoint(&self, base_url: &str, model: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            ProviderId::DeepSeek | ProviderId::OpenAI => format!("{}/v1/chat/completions", base),
            ProviderId::Anthropic => format!("{}/v1/messages", base),
            ProviderId::Gemini => format!("{}/v1beta/models/{}:generateContent", base, model),
            ProviderId::HuggingFace => format!("{}/models/{}", base, model),
        }
    }

    fn credential<'a>(&self, credentials: &'a Credentials) -> Option<&'a str> {
        match self {
            ProviderId::DeepSeek => credentials.get(keys::DEEPSEEK_API_KEY),
            ProviderId::OpenAI => credentials.get(keys::OPENAI_API_KEY),
            ProviderId::Anthropic => credentials.get(keys::ANTHROPIC_API_KEY),
            ProviderId::Gemini => credentials.gemini_api_key(),
            ProviderId::HuggingFace => credentials.get(keys::HUGGINGFACE_API_KEY),
        }
    }

    fn base_url_override<'a>(&self, credentials: &'a Credentials) -> Option<&'a str> {
        let key = match self {
            ProviderId::DeepSeek => keys::DEEPSEEK_BASE_URL,
            ProviderId::OpenAI => keys::OPENAI_BASE_URL,
            ProviderId::Anthropic => keys::ANTHROPIC_BASE_URL,
            ProviderId::Gemini => keys::GEMINI_BASE_URL,
            ProviderId::HuggingFace => keys::HUGGINGFACE_BASE_URL,
        };
        credentials.get(key)
    }

    fn model_override<'a>(&self, credentials: &'a Credentials) -> Option<&'a str> {
        match self {
            ProviderId::DeepSeek => credentials.get(keys::DEEPSEEK_MODEL),
            ProviderId::OpenAI => credentials.get(keys::OPENAI_MODEL),
            ProviderId::Anthropic => credentials.get(keys::ANTHROPIC_MODEL),
            ProviderId::Gemini => credentials.gemini_model(),
            ProviderId::HuggingFace => credentials.get(keys::HUGGINGFACE_MODEL),
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProviderId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown provider: {}", s))
    }
}

/// Static description of one provider, fixed at startup.
#[derive(Clone)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub display_name: String,
    pub endpoint: String,
    pub model: String,
    credential: Option<String>,
    pub enabled: bool,
}

impl ProviderConfig {
    /// `enabled` follows from the credential; `Credentials` already drops
    /// empty and placeholder values.
    pub fn new(id: ProviderId, endpoint: String, model: String, credential: Option<String>) -> Self {
        let credential = credential.filter(|c| !c.trim().is_empty());
        ProviderConfig {
            id,
            display_name: id.display_name().to_string(),
            endpoint,
            model,
            enabled: credential.is_some(),
            credential,
        }
    }

    fn from_credentials(id: ProviderId, credentials: &Credentials) -> Self {
        let model = id.model_override(credentials).unwrap_or(id.default_model());
        let base_url = id
            .base_url_override(credentials)
            .unwrap_or(id.default_base_url());
        ProviderConfig::new(
            id,
            id.endpoint(base_url, model),
            model.to_string(),
            id.credential(credentials).map(str::to_string),
        )
    }

    fn adapter_settings(&self) -> AdapterSettings {
        AdapterSettings {
            name: self.id.error_label().to_string(),
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_key: self.credential.clone().unwrap_or_default(),
        }
    }

    fn build_adapter(&self) -> Arc<dyn ProviderAdapter + Send + Sync> {
        let client = Client::new();
        let settings = self.adapter_settings();
        match self.id {
            ProviderId::DeepSeek | ProviderId::OpenAI => {
                Arc::new(ChatCompletionsAdapter::new(client, settings))
            }
            ProviderId::Anthropic => Arc::new(MessagesAdapter::new(client, settings)),
            ProviderId::Gemini => Arc::new(GeminiAdapter::new(client, settings)),
            ProviderId::HuggingFace => Arc::new(HuggingFaceAdapter::new(client, settings)),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Configured providers plus one adapter per enabled provider.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    configs: Vec<ProviderConfig>,
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter + Send + Sync>>,
}

impl ProviderRegistry {
    /// Build every provider from the given credentials. Adapters are only
    /// constructed for enabled providers.
    pub fn configure(credentials: &Credentials) -> Self {
        Self::configure_only(credentials, &ProviderId::ALL)
    }

    /// Like [`configure`](Self::configure) but limited to `ids`, kept in registry order.
    pub fn configure_only(credentials: &Credentials, ids: &[ProviderId]) -> Self {
        let mut registry = ProviderRegistry::empty();
        for id in ProviderId::ALL.into_iter().filter(|id| ids.contains(id)) {
            let config = ProviderConfig::from_credentials(id, credentials);
            if config.enabled {
                let adapter = config.build_adapter();
                debug!(provider = %id, endpoint = %config.endpoint, model = %config.model, "Provider enabled");
                registry.adapters.insert(id, adapter);
            }
            registry.configs.push(config);
        }
        info!(available = ?registry.list_available(), "Provider registry configured");
        registry
    }

    pub fn empty() -> Self {
        ProviderRegistry::default()
    }

    /// Install a config with a custom adapter, replacing any previous entry for that id.
    pub fn register(&mut self, config: ProviderConfig, adapter: Arc<dyn ProviderAdapter + Send + Sync>) {
        let id = config.id;
        self.configs.retain(|c| c.id != id);
        if config.enabled {
            self.adapters.insert(id, adapter);
        } else {
            self.adapters.remove(&id);
        }
        self.configs.push(config);
        self.configs.sort_by_key(|c| c.id);
    }

    pub fn configs(&self) -> &[ProviderConfig] {
        &self.configs
    }

    pub fn config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.configs.iter().find(|c| c.id == id)
    }

    /// Enabled provider ids in registry order.
    pub fn list_available(&self) -> Vec<ProviderId> {
        self.configs
            .iter()
            .filter(|c| c.enabled)
            .map(|c| c.id)
            .collect()
    }

    pub fn is_available(&self, provider: &str) -> bool {
        self.lookup(provider).is_some()
    }

    pub fn ensure_any_available(&self) -> Result<(), RegistryError> {
        if self.adapters.is_empty() {
            Err(RegistryError::NoProvidersConfigured)
        } else {
            Ok(())
        }
    }

    /// `preferred` when it is enabled, otherwise the first enabled provider.
    pub fn default_provider(&self, preferred: Option<&str>) -> Option<ProviderId> {
        preferred
            .and_then(|p| p.parse::<ProviderId>().ok())
            .filter(|id| self.adapters.contains_key(id))
            .or_else(|| self.list_available().into_iter().next())
    }

    /// Exact id match. Callers normalize user input before routing.
    fn lookup(&self, provider: &str) -> Option<(ProviderId, &Arc<dyn ProviderAdapter + Send + Sync>)> {
        let id = ProviderId::ALL.into_iter().find(|id| id.as_str() == provider)?;
        self.adapters.get(&id).map(|adapter| (id, adapter))
    }

    /// Route one query. Unknown or disabled providers fail without touching the network.
    pub async fn dispatch(&self, provider: &str, query: &str, context: &str) -> Result<String, DispatchError> {
        let Some((id, adapter)) = self.lookup(provider) else {
            return Err(DispatchError::Unavailable(provider.to_string()));
        };

        info!(provider = %id, context_chars = context.len(), "Dispatching query");
        let request = GenerateRequest::new(query, context);
        adapter
            .generate(&request)
            .await
            .map_err(|source| DispatchError::Api {
                provider: adapter.name().to_string(),
                source,
            })
    }

    /// Like [`dispatch`](Self::dispatch) but renders failures as answer text.
    pub async fn query(&self, provider: &str, query: &str, context: &str) -> String {
        match self.dispatch(provider, query, context).await {
            Ok(text) => text,
            Err(e) => e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::credentials::*;

    #[test]
    fn test_provider_id_parsing_is_case_insensitive() {
        assert_eq!("OpenAI".parse::<ProviderId>().unwrap(), ProviderId::OpenAI);
        assert_eq!(" huggingface ".parse::<ProviderId>().unwrap(), ProviderId::HuggingFace);
        assert!("mistral".parse::<ProviderId>().is_err());
    }

    #[test]
    fn test_enabled_follows_credentials() {
        let creds = Credentials::from_pairs([
            (OPENAI_API_KEY, "sk-1"),
            (ANTHROPIC_API_KEY, "your_api_key_here"),
            (GOOGLE_API_KEY, "g-1"),
        ]);
        let registry = ProviderRegistry::configure(&creds);

        assert_eq!(registry.configs().len(), 5);
        assert_eq!(
            registry.list_available(),
            vec![ProviderId::OpenAI, ProviderId::Gemini]
        );
        assert!(!registry.config(ProviderId::Anthropic).unwrap().enabled);
        assert!(registry.ensure_any_available().is_ok());
    }

    #[test]
    fn test_configure_only_limits_providers() {
        let creds = Credentials::from_pairs([(OPENAI_API_KEY, "k"), (GEMINI_API_KEY, "k")]);
        let registry = ProviderRegistry::configure_only(
            &creds,
            &[ProviderId::Anthropic, ProviderId::OpenAI, ProviderId::DeepSeek],
        );
        assert_eq!(registry.configs().len(), 3);
        assert_eq!(registry.list_available(), vec![ProviderId::OpenAI]);
        assert!(!registry.is_available("gemini"));
    }

    #[test]
    fn test_no_credentials_is_fatal() {
        let registry = ProviderRegistry::configure(&Credentials::default());
        assert!(registry.list_available().is_empty());
        assert_eq!(
            registry.ensure_any_available().unwrap_err().to_string(),
            "No AI providers configured. Please check your API keys."
        );
    }

    #[test]
    fn test_endpoints_and_model_overrides() {
        let creds = Credentials::from_pairs([
            (GEMINI_API_KEY, "k"),
            (GOOGLE_GEMINI_MODEL, "gemini-1.5-pro"),
            (HUGGINGFACE_API_KEY, "k"),
            (DEEPSEEK_API_KEY, "k"),
            (DEEPSEEK_BASE_URL, "http://localhost:9999/"),
        ]);
        let registry = ProviderRegistry::configure(&creds);

        let gemini = registry.config(ProviderId::Gemini).unwrap();
        assert_eq!(
            gemini.endpoint,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(
            registry.config(ProviderId::HuggingFace).unwrap().endpoint,
            "https://api-inference.huggingface.co/models/mistralai/Mixtral-8x7B-Instruct-v0.1"
        );
        assert_eq!(
            registry.config(ProviderId::DeepSeek).unwrap().endpoint,
            "http://localhost:9999/v1/chat/completions"
        );
    }

    #[test]
    fn test_availability_requires_exact_id() {
        let registry = ProviderRegistry::configure(&Credentials::from_pairs([(OPENAI_API_KEY, "k")]));
        assert!(registry.is_available("openai"));
        assert!(!registry.is_available("OpenAI"));
        assert!(!registry.is_available(" openai "));
        assert_eq!(registry.default_provider(Some("OpenAI")), Some(ProviderId::OpenAI));
    }

    #[test]
    fn test_default_provider_prefers_enabled_choice() {
        let creds = Credentials::from_pairs([(ANTHROPIC_API_KEY, "k"), (HUGGINGFACE_API_KEY, "k")]);
        let registry = ProviderRegistry::configure(&creds);

        assert_eq!(registry.default_provider(Some("huggingface")), Some(ProviderId::HuggingFace));
        assert_eq!(registry.default_provider(Some("deepseek")), Some(ProviderId::Anthropic));
        assert_eq!(registry.default_provider(None), Some(ProviderId::Anthropic));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let config = ProviderConfig::new(
            ProviderId::OpenAI,
            "http://x".to_string(),
            "m".to_string(),
            Some("sk-secret".to_string()),
        );
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
