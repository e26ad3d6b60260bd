use crate::error::ApiError;
use crate::providers::IntoText;
use crate::{GenerateRequest, GenerationParams};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Message {
            role,
            content: content.into(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl ChatCompletionRequest {
    /// Preamble, then prior context as a second system message, then the user query.
    pub fn from_request(model: &str, request: &GenerateRequest, params: GenerationParams) -> Self {
        let mut messages = vec![Message::new(Role::System, request.system.clone())];
        if let Some(context) = request.context_message() {
            messages.push(Message::new(Role::System, context));
        }
        messages.push(Message::new(Role::User, request.query.clone()));

        ChatCompletionRequest {
            model: model.to_string(),
            messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatCompletionChoice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatCompletionChoice>,
}

impl IntoText for ChatCompletionResponse {
    fn into_text(self) -> Result<String, ApiError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Malformed("response has no choices".to_string()))?;
        choice
            .message
            .content
            .ok_or_else(|| ApiError::Malformed("first choice has no content".to_string()))
    }
}
