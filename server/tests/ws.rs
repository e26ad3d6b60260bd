use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use llm::{ApiError, GenerateRequest, ProviderAdapter, ProviderConfig, ProviderId, ProviderRegistry};
use parking_lot::Mutex;
use research_core::{QueryPipeline, SearchAugmenter, SessionMemory};
use serde_json::{Value, json};
use server::{AppState, build_app};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Answers with two paragraphs and remembers each query it was sent.
#[derive(Default)]
struct Multiline {
    queries: Mutex<Vec<String>>,
}

#[async_trait]
impl ProviderAdapter for Multiline {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, ApiError> {
        self.queries.lock().push(request.query.clone());
        Ok(format!("\nFirst line.\n\nAbout {}.\n", request.query))
    }
}

async fn start(adapter: Arc<Multiline>) -> (String, QueryPipeline) {
    let mut registry = ProviderRegistry::empty();
    registry.register(
        ProviderConfig::new(
            ProviderId::OpenAI,
            "http://unused".to_string(),
            "test".to_string(),
            Some("key".to_string()),
        ),
        adapter,
    );
    let pipeline = QueryPipeline::new(
        Arc::new(registry),
        Arc::new(SessionMemory::new()),
        SearchAugmenter::disabled(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_app(AppState::new(pipeline.clone()));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("ws://{}/ws", addr), pipeline)
}

async fn next_event(socket: &mut Socket) -> Value {
    loop {
        match socket.next().await {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(text.as_str()).unwrap(),
            Some(Ok(_)) => continue,
            other => panic!("socket closed: {:?}", other),
        }
    }
}

async fn send(socket: &mut Socket, frame: Value) {
    socket.send(Message::Text(frame.to_string().into())).await.unwrap();
}

#[tokio::test]
async fn test_research_request_round_trip() {
    let adapter = Arc::new(Multiline::default());
    let (url, pipeline) = start(adapter.clone()).await;
    let (mut socket, _) = connect_async(url.as_str()).await.unwrap();

    send(
        &mut socket,
        json!({"event": "research_request", "data": {"query": "tides", "session_id": "ws-1"}}),
    )
    .await;

    let status = next_event(&mut socket).await;
    assert_eq!(status, json!({"event": "research_status", "data": {"status": "searching"}}));

    let complete = next_event(&mut socket).await;
    assert_eq!(complete["event"], "research_complete");
    assert_eq!(complete["data"]["response"], "First line.<br><br>About tides.");
    assert_eq!(complete["data"]["session_id"], "ws-1");
    assert_eq!(complete["data"]["search_results"], json!([]));

    assert_eq!(*adapter.queries.lock(), vec!["tides".to_string()]);
    assert!(pipeline.memory().get_context("ws-1").starts_with("Q: tides\n"));
}

#[tokio::test]
async fn test_malformed_request_gets_error_event() {
    let adapter = Arc::new(Multiline::default());
    let (url, pipeline) = start(adapter.clone()).await;
    let (mut socket, _) = connect_async(url.as_str()).await.unwrap();

    send(
        &mut socket,
        json!({"event": "research_request", "data": {"query": "What is DNA?", "web_search": "yes", "session_id": "s1"}}),
    )
    .await;
    let error = next_event(&mut socket).await;
    assert_eq!(error["event"], "error");
    assert!(
        error["data"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid research_request")
    );

    send(&mut socket, json!({"event": "ping"})).await;
    let unknown = next_event(&mut socket).await;
    assert_eq!(unknown["data"]["message"], "Unknown event: ping");

    assert!(adapter.queries.lock().is_empty());
    assert_eq!(pipeline.memory().session_count(), 0);
}
