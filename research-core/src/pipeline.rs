//! Context fetch, optional search augmentation, dispatch and memory update.

use crate::document::{DEFAULT_DOCUMENT_QUERY, DocumentExtractor, document_prompt};
use crate::error::PipelineError;
use crate::memory::SessionMemory;
use crate::search::{SearchAugmenter, SearchEngine, SearchResult, augment_query};
use config::{Credentials, Settings};
use llm::{ProviderId, ProviderRegistry};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Provider name used when nothing is configured at all; dispatch then
/// reports it as unavailable.
const FALLBACK_PROVIDER: &str = "deepseek";

pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Clone, Debug, Default)]
pub struct QueryRequest {
    pub query: String,
    /// Provider id; the first available provider when absent.
    pub provider: Option<String>,
    /// A fresh id is generated when absent.
    pub session_id: Option<String>,
    pub web_search: bool,
    pub search_engine: SearchEngine,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        QueryRequest {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    pub fn search_engine(mut self, engine: SearchEngine) -> Self {
        self.search_engine = engine;
        self
    }
}

#[derive(Clone, Debug)]
pub struct DocumentRequest {
    pub path: PathBuf,
    /// Name shown to the user and recorded in history. Defaults to the path's file name.
    pub file_name: Option<String>,
    pub query: Option<String>,
    pub provider: Option<String>,
    pub session_id: Option<String>,
}

impl DocumentRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DocumentRequest {
            path: path.into(),
            file_name: None,
            query: None,
            provider: None,
            session_id: None,
        }
    }

    fn display_name(&self) -> String {
        self.file_name.clone().unwrap_or_else(|| {
            self.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string())
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub response: String,
    pub search_results: Vec<SearchResult>,
    pub session_id: String,
}

/// Orchestrates one query against shared registry, memory and search state.
#[derive(Clone)]
pub struct QueryPipeline {
    registry: Arc<ProviderRegistry>,
    memory: Arc<SessionMemory>,
    search: SearchAugmenter,
    extractor: DocumentExtractor,
}

impl QueryPipeline {
    pub fn new(registry: Arc<ProviderRegistry>, memory: Arc<SessionMemory>, search: SearchAugmenter) -> Self {
        QueryPipeline {
            registry,
            memory,
            search,
            extractor: DocumentExtractor::new(),
        }
    }

    pub fn from_credentials(credentials: &Credentials, settings: &Settings) -> Self {
        QueryPipeline::new(
            Arc::new(ProviderRegistry::configure(credentials)),
            Arc::new(SessionMemory::with_max_history(settings.max_history)),
            SearchAugmenter::from_credentials(credentials),
        )
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    pub fn search(&self) -> &SearchAugmenter {
        &self.search
    }

    pub fn extractor(&self) -> &DocumentExtractor {
        &self.extractor
    }

    /// The requested provider as given, or the first available one.
    pub fn resolve_provider(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim).filter(|p| !p.is_empty()) {
            Some(provider) => provider.to_string(),
            None => self
                .registry
                .default_provider(None)
                .map(|id: ProviderId| id.as_str().to_string())
                .unwrap_or_else(|| FALLBACK_PROVIDER.to_string()),
        }
    }

    /// Answer one query. Provider failures come back as answer text, so this never fails.
    pub async fn handle(&self, request: QueryRequest) -> QueryOutcome {
        let session_id = request.session_id.unwrap_or_else(new_session_id);
        let provider = self.resolve_provider(request.provider.as_deref());
        let context = self.memory.get_context(&session_id);

        let mut search_results = Vec::new();
        let mut query = request.query;
        if request.web_search && self.search.is_available() {
            search_results = self.search.search_with(&query, request.search_engine).await;
            debug!(count = search_results.len(), "Search results collected");
            query = augment_query(&query, &search_results);
        }

        info!(%provider, session = %session_id, web_search = request.web_search, "Handling query");
        let response = self.registry.query(&provider, &query, &context).await;
        self.memory.add_exchange(&session_id, &query, &response);

        QueryOutcome {
            response,
            search_results,
            session_id,
        }
    }

    /// Answer a question about a document. Web search is never used here.
    pub async fn analyze_document(&self, request: DocumentRequest) -> Result<QueryOutcome, PipelineError> {
        if !request.path.is_file() {
            return Err(PipelineError::MissingFile(request.path));
        }

        let file_name = request.display_name();
        if !self.extractor.is_supported(&file_name) {
            return Err(PipelineError::UnsupportedDocument(file_name));
        }

        let extension = DocumentExtractor::extension(&file_name);
        let text = self
            .extractor
            .extract_text(&request.path, &extension)
            .map_err(PipelineError::Extraction)?;

        let query = request
            .query
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DOCUMENT_QUERY.to_string());
        let session_id = request.session_id.unwrap_or_else(new_session_id);
        let provider = self.resolve_provider(request.provider.as_deref());
        let context = self.memory.get_context(&session_id);

        info!(%provider, session = %session_id, file = %file_name, chars = text.chars().count(), "Analyzing document");
        let prompt = document_prompt(&text, &query);
        let response = self.registry.query(&provider, &prompt, &context).await;
        self.memory.add_exchange(
            &session_id,
            &format!("Document analysis query: {} for file: {}", query, file_name),
            &response,
        );

        Ok(QueryOutcome {
            response,
            search_results: Vec::new(),
            session_id,
        })
    }

    /// Stateless single prompt: no history and no search.
    pub async fn chat(&self, prompt: &str, provider: Option<&str>) -> (String, String) {
        let provider = self.resolve_provider(provider);
        let response = self.registry.query(&provider, prompt, "").await;
        (provider, response.trim().to_string())
    }
}
