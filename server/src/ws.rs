//! WebSocket research channel.
//!
//! Frames are JSON envelopes `{"event": ..., "data": {...}}`. A
//! `research_request` is acknowledged with `research_status` before the
//! pipeline runs and answered with `research_complete`.

use crate::{AppState, ResearchBody};
use axum::extract::ws::{Message, WebSocket};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    fn new(event: &str, data: Value) -> Self {
        Envelope {
            event: event.to_string(),
            data,
        }
    }
}

/// Response text with newlines turned into HTML line breaks.
pub(crate) fn beautify(response: &str) -> String {
    response
        .trim()
        .replace("\n\n", "<br><br>")
        .replace('\n', "<br>")
}

async fn send(socket: &mut WebSocket, envelope: Envelope) -> bool {
    let text = match serde_json::to_string(&envelope) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to encode websocket frame: {}", e);
            return true;
        }
    };
    socket.send(Message::Text(text.into())).await.is_ok()
}

pub(crate) async fn handle_connection(mut socket: WebSocket, state: AppState) {
    debug!("WebSocket client connected");

    while let Some(message) = socket.recv().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        let envelope: Envelope = match serde_json::from_str(text.as_str()) {
            Ok(envelope) => envelope,
            Err(e) => {
                let error = Envelope::new("error", json!({ "message": format!("Invalid message: {}", e) }));
                if !send(&mut socket, error).await {
                    break;
                }
                continue;
            }
        };

        if envelope.event != "research_request" {
            let error = Envelope::new(
                "error",
                json!({ "message": format!("Unknown event: {}", envelope.event) }),
            );
            if !send(&mut socket, error).await {
                break;
            }
            continue;
        }

        let body: ResearchBody = match envelope.data {
            Value::Null => ResearchBody::default(),
            data => match serde_json::from_value(data) {
                Ok(body) => body,
                Err(e) => {
                    let error = Envelope::new(
                        "error",
                        json!({ "message": format!("Invalid research_request: {}", e) }),
                    );
                    if !send(&mut socket, error).await {
                        break;
                    }
                    continue;
                }
            },
        };
        if !send(&mut socket, Envelope::new("research_status", json!({ "status": "searching" }))).await {
            break;
        }

        let outcome = state.pipeline.handle(body.into()).await;
        let complete = Envelope::new(
            "research_complete",
            json!({
                "response": beautify(&outcome.response),
                "search_results": outcome.search_results,
                "session_id": outcome.session_id,
            }),
        );
        if !send(&mut socket, complete).await {
            break;
        }
    }

    debug!("WebSocket client disconnected");
}
