use crate::error::ApiError;
use crate::providers::IntoText;
use crate::{GenerateRequest, GenerationParams};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Parameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub return_full_text: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TextGenerationRequest {
    pub inputs: String,
    pub parameters: Parameters,
}

impl TextGenerationRequest {
    /// Instruction-tuned models expect the whole exchange wrapped in `[INST]` markers.
    pub fn from_request(request: &GenerateRequest, params: GenerationParams) -> Self {
        TextGenerationRequest {
            inputs: format!("<s>[INST] {} [/INST]", request.flattened_prompt()),
            parameters: Parameters {
                max_new_tokens: params.max_tokens,
                temperature: params.temperature,
                return_full_text: false,
            },
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Generation {
    #[serde(default)]
    pub generated_text: String,
}

/// The inference API answers with a list for batched models and a bare object otherwise.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TextGenerationResponse {
    Batch(Vec<Generation>),
    Single(Generation),
}

impl IntoText for TextGenerationResponse {
    fn into_text(self) -> Result<String, ApiError> {
        let generation = match self {
            TextGenerationResponse::Batch(list) => list.into_iter().next(),
            TextGenerationResponse::Single(generation) => Some(generation),
        };
        match generation {
            Some(generation) if !generation.generated_text.is_empty() => Ok(generation.generated_text),
            _ => Err(ApiError::Malformed("no generated text".to_string())),
        }
    }
}
