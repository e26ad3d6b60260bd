//! Web search lookup used to enrich queries before dispatch.
//!
//! Two backends are supported: SerpAPI (primary) and Google Programmable
//! Search (secondary). Backend failures are logged and treated as "no
//! results" so a broken search never blocks an answer.

use crate::error::SearchError;
use async_trait::async_trait;
use config::Credentials;
use config::credentials as keys;
use llm::client::Client;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

pub const MAX_RESULTS: usize = 5;

const SERPAPI_BASE_URL: &str = "https://serpapi.com";
const GOOGLE_PSE_BASE_URL: &str = "https://www.googleapis.com";

/// A single search hit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub source: String,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Tag stored in [`SearchResult::source`].
    fn source(&self) -> &str;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SearchEngine {
    /// SerpAPI first, Google PSE when SerpAPI yields nothing.
    #[default]
    Auto,
    SerpApi,
    GooglePse,
}

impl FromStr for SearchEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(SearchEngine::Auto),
            "serpapi" => Ok(SearchEngine::SerpApi),
            "google_pse" | "google-pse" | "pse" => Ok(SearchEngine::GooglePse),
            other => Err(format!("Unknown search engine: {}", other)),
        }
    }
}

/// Raw hit as both backends return it. Absent fields become empty strings.
#[derive(Debug, Default, Deserialize)]
struct RawHit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl RawHit {
    fn into_result(self, source: &str) -> SearchResult {
        SearchResult {
            title: self.title.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            snippet: self.snippet.unwrap_or_default(),
            source: source.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<RawHit>,
}

#[derive(Debug, Default, Deserialize)]
struct GooglePseResponse {
    #[serde(default)]
    items: Vec<RawHit>,
}

pub struct SerpApiBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SerpApiBackend {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        SerpApiBackend {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl SearchBackend for SerpApiBackend {
    fn source(&self) -> &str {
        "SerpAPI"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!("{}/search.json", self.base_url.trim_end_matches('/'));
        let num = limit.to_string();
        let params = [
            ("engine", "google"),
            ("q", query),
            ("api_key", self.api_key.as_str()),
            ("num", num.as_str()),
        ];
        let response: SerpApiResponse = self.client.get(&url, &params).await?;
        Ok(response
            .organic_results
            .into_iter()
            .map(|hit| hit.into_result(self.source()))
            .collect())
    }
}

pub struct GooglePseBackend {
    client: Client,
    base_url: String,
    api_key: String,
    engine_id: String,
}

impl GooglePseBackend {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Self {
        GooglePseBackend {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        }
    }
}

#[async_trait]
impl SearchBackend for GooglePseBackend {
    fn source(&self) -> &str {
        "Google PSE"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!("{}/customsearch/v1", self.base_url.trim_end_matches('/'));
        let num = limit.to_string();
        let params = [
            ("key", self.api_key.as_str()),
            ("cx", self.engine_id.as_str()),
            ("q", query),
            ("num", num.as_str()),
        ];
        let response: GooglePseResponse = self.client.get(&url, &params).await?;
        Ok(response
            .items
            .into_iter()
            .map(|hit| hit.into_result(self.source()))
            .collect())
    }
}

/// Runs configured search backends and folds their hits into a query.
#[derive(Clone, Default)]
pub struct SearchAugmenter {
    serpapi: Option<Arc<dyn SearchBackend>>,
    google_pse: Option<Arc<dyn SearchBackend>>,
}

impl SearchAugmenter {
    /// SerpAPI needs `SERPAPI_API_KEY`; Google PSE needs both `GOOGLE_PSE_ID`
    /// and `GOOGLE_API_KEY`.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        let client = Client::new();

        let serpapi = credentials.get(keys::SERPAPI_API_KEY).map(|key| {
            let base = credentials
                .get(keys::SERPAPI_BASE_URL)
                .unwrap_or(SERPAPI_BASE_URL);
            Arc::new(SerpApiBackend::new(client.clone(), base, key)) as Arc<dyn SearchBackend>
        });

        let google_pse = match (
            credentials.get(keys::GOOGLE_PSE_ID),
            credentials.get(keys::GOOGLE_API_KEY),
        ) {
            (Some(cx), Some(key)) => {
                let base = credentials
                    .get(keys::GOOGLE_PSE_BASE_URL)
                    .unwrap_or(GOOGLE_PSE_BASE_URL);
                Some(Arc::new(GooglePseBackend::new(client, base, key, cx)) as Arc<dyn SearchBackend>)
            }
            _ => None,
        };

        SearchAugmenter { serpapi, google_pse }
    }

    pub fn with_backends(
        serpapi: Option<Arc<dyn SearchBackend>>,
        google_pse: Option<Arc<dyn SearchBackend>>,
    ) -> Self {
        SearchAugmenter { serpapi, google_pse }
    }

    pub fn disabled() -> Self {
        SearchAugmenter::default()
    }

    pub fn is_available(&self) -> bool {
        self.serpapi.is_some() || self.google_pse.is_some()
    }

    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.search_with(query, SearchEngine::Auto).await
    }

    /// Results from the selected engine, at most [`MAX_RESULTS`]. Unconfigured
    /// engines and failures yield an empty list.
    pub async fn search_with(&self, query: &str, engine: SearchEngine) -> Vec<SearchResult> {
        let mut results = match engine {
            SearchEngine::Auto => {
                let primary = run(self.serpapi.as_deref(), query).await;
                if primary.is_empty() {
                    run(self.google_pse.as_deref(), query).await
                } else {
                    primary
                }
            }
            SearchEngine::SerpApi => run(self.serpapi.as_deref(), query).await,
            SearchEngine::GooglePse => run(self.google_pse.as_deref(), query).await,
        };
        results.truncate(MAX_RESULTS);
        results
    }
}

async fn run(backend: Option<&dyn SearchBackend>, query: &str) -> Vec<SearchResult> {
    let Some(backend) = backend else {
        return Vec::new();
    };
    match backend.search(query, MAX_RESULTS).await {
        Ok(results) => {
            debug!(source = backend.source(), count = results.len(), "Web search finished");
            results
        }
        Err(e) => {
            warn!(source = backend.source(), "{} search error: {}", backend.source(), e);
            Vec::new()
        }
    }
}

/// Append search snippets to `query`. An empty result list leaves it unchanged.
pub fn augment_query(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return query.to_string();
    }
    let context = results
        .iter()
        .map(|r| format!("Source: {}\nContent: {}", r.title, r.snippet))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{}\n\nHere are some web search results for context:\n{}",
        query, context
    )
}
