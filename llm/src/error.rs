use thiserror::Error;

/// Failure of a single provider call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no API key configured")]
    MissingCredential,

    #[error("invalid API key format")]
    InvalidCredential,
}

/// Outcome of routing a query to a provider that did not produce an answer.
///
/// The `Display` text is exactly what callers of
/// [`ProviderRegistry::query`](crate::ProviderRegistry::query) receive.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Provider '{0}' is not available.")]
    Unavailable(String),

    #[error("Error calling {provider} API: {source}")]
    Api {
        provider: String,
        #[source]
        source: ApiError,
    },
}

/// Fatal configuration problems detected at startup.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No AI providers configured. Please check your API keys.")]
    NoProvidersConfigured,
}
