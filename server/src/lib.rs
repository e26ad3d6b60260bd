//! HTTP and WebSocket front end for the research pipeline.

mod ws;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use research_core::{DocumentExtractor, DocumentRequest, PipelineError, QueryPipeline, QueryRequest};
use serde::Deserialize;
use serde_json::json;
use std::io::Write;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared handler state. Cloning is cheap; the pipeline holds its registry and memory behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: QueryPipeline,
    /// Provider for `/api/chat` when the caller does not pick one (`AI_PROVIDER`).
    pub chat_provider: Option<String>,
}

impl AppState {
    pub fn new(pipeline: QueryPipeline) -> Self {
        AppState {
            pipeline,
            chat_provider: None,
        }
    }

    pub fn with_chat_provider(mut self, provider: Option<String>) -> Self {
        self.chat_provider = provider;
        self
    }
}

/// Build the router (shared between startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/providers", get(providers_handler))
        .route("/api/research", post(research_handler))
        .route("/api/analyze_document", post(analyze_document_handler))
        .route("/api/chat", post(chat_handler))
        .route("/ws", get(ws_upgrade_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": state.pipeline.registry().list_available().len(),
    }))
}

async fn providers_handler(State(state): State<AppState>) -> impl IntoResponse {
    let providers: Vec<&str> = state
        .pipeline
        .registry()
        .list_available()
        .iter()
        .map(|id| id.as_str())
        .collect();
    Json(json!({
        "providers": providers,
        "web_search": state.pipeline.search().is_available(),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResearchBody {
    pub query: String,
    pub provider: Option<String>,
    pub web_search: bool,
    pub session_id: Option<String>,
}

impl From<ResearchBody> for QueryRequest {
    fn from(body: ResearchBody) -> Self {
        QueryRequest {
            query: body.query,
            provider: body.provider,
            session_id: body.session_id,
            web_search: body.web_search,
            ..Default::default()
        }
    }
}

async fn research_handler(State(state): State<AppState>, Json(body): Json<ResearchBody>) -> impl IntoResponse {
    let outcome = state.pipeline.handle(body.into()).await;
    Json(outcome)
}

/// Fields collected from an `/api/analyze_document` form.
#[derive(Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    query: Option<String>,
    provider: Option<String>,
    session_id: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, Response> {
    let mut form = UploadForm::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(error_response(StatusCode::BAD_REQUEST, e.body_text())),
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;
                form.file = Some((file_name, bytes.to_vec()));
            }
            "query" | "provider" | "session_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;
                let value = Some(value).filter(|v| !v.trim().is_empty());
                match name.as_str() {
                    "query" => form.query = value,
                    "provider" => form.provider = value,
                    _ => form.session_id = value,
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn analyze_document_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_upload(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };

    let Some((file_name, bytes)) = form.file.filter(|(name, _)| !name.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
    };
    if !state.pipeline.extractor().is_supported(&file_name) {
        return error_response(StatusCode::BAD_REQUEST, "Unsupported file type");
    }

    // The upload only lives for the duration of the request.
    let suffix = format!(".{}", DocumentExtractor::extension(&file_name));
    let temp = match tempfile::Builder::new().prefix("upload-").suffix(&suffix).tempfile() {
        Ok(mut temp) => match temp.write_all(&bytes) {
            Ok(()) => temp,
            Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        },
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    info!(file = %file_name, bytes = bytes.len(), "Document uploaded");
    let request = DocumentRequest {
        path: temp.path().to_path_buf(),
        file_name: Some(file_name),
        query: form.query,
        provider: form.provider,
        session_id: form.session_id,
    };

    match state.pipeline.analyze_document(request).await {
        Ok(outcome) => Json(json!({
            "response": outcome.response,
            "session_id": outcome.session_id,
        }))
        .into_response(),
        Err(e @ (PipelineError::MissingFile(_) | PipelineError::UnsupportedDocument(_))) => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e @ PipelineError::Extraction(_)) => {
            warn!("Document extraction failed: {}", e);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
    }
}

fn default_mode() -> String {
    "chat".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub prompt: String,
    /// chat, summarize, flashcards, quiz. Only logged.
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub provider: Option<String>,
}

async fn chat_handler(State(state): State<AppState>, Json(body): Json<ChatBody>) -> impl IntoResponse {
    let provider = body.provider.or_else(|| state.chat_provider.clone());
    info!(mode = %body.mode, "Chat request");
    let (provider, response) = state.pipeline.chat(&body.prompt, provider.as_deref()).await;
    Json(json!({
        "ok": true,
        "provider": provider,
        "response": response,
    }))
}

async fn ws_upgrade_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws::handle_connection(socket, state))
}
