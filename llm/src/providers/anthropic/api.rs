use crate::error::ApiError;
use crate::providers::IntoText;
use crate::{GenerateRequest, GenerationParams};
use serde::{Deserialize, Serialize};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub system: String,
    pub messages: Vec<Message>,
}

impl MessagesRequest {
    /// Context rides along in the system prompt; the query is the only message.
    pub fn from_request(model: &str, request: &GenerateRequest, params: GenerationParams) -> Self {
        MessagesRequest {
            model: model.to_string(),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            system: request.system_with_context(),
            messages: vec![Message {
                role: Role::User,
                content: request.query.clone(),
            }],
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<Content>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl IntoText for MessagesResponse {
    fn into_text(self) -> Result<String, ApiError> {
        match self.content.into_iter().next() {
            Some(Content::Text { text }) => Ok(text),
            Some(Content::Other) => Err(ApiError::Malformed(
                "first content block is not text".to_string(),
            )),
            None => Err(ApiError::Malformed("response has no content".to_string())),
        }
    }
}
