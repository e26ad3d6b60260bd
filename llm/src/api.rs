/// System preamble sent with every request.
pub const SYSTEM_PREAMBLE: &str = "You are a helpful research assistant. Provide detailed, accurate information with sources when possible.";

const CONTEXT_PREFIX: &str = "Context from previous conversation: ";

/// Fixed sampling parameters. These are per backend constants, not per call options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// Provider independent request: the (possibly augmented) query, prior
/// conversation context and the system preamble.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateRequest {
    pub system: String,
    pub context: String,
    pub query: String,
}

impl GenerateRequest {
    pub fn new(query: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            system: SYSTEM_PREAMBLE.to_string(),
            context: context.into(),
            query: query.into(),
        }
    }

    pub fn has_context(&self) -> bool {
        !self.context.is_empty()
    }

    /// "Context from previous conversation: ..." or None when there is no history.
    pub fn context_message(&self) -> Option<String> {
        self.has_context()
            .then(|| format!("{}{}", CONTEXT_PREFIX, self.context))
    }

    /// Preamble with the context folded in, for backends taking a single system string.
    pub fn system_with_context(&self) -> String {
        match self.context_message() {
            Some(context) => format!("{}\n\n{}", self.system, context),
            None => self.system.clone(),
        }
    }

    /// Whole request flattened into one prompt, for backends without a system slot.
    pub fn flattened_prompt(&self) -> String {
        format!("{}\n\nUser query: {}", self.system_with_context(), self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_context_keeps_preamble() {
        let request = GenerateRequest::new("What is DNA?", "");
        assert!(request.context_message().is_none());
        assert_eq!(request.system_with_context(), SYSTEM_PREAMBLE);
        assert_eq!(
            request.flattened_prompt(),
            format!("{}\n\nUser query: What is DNA?", SYSTEM_PREAMBLE)
        );
    }

    #[test]
    fn test_context_is_folded_into_system() {
        let request = GenerateRequest::new("And RNA?", "Q: What is DNA?\nA: A molecule.");
        assert_eq!(
            request.context_message().as_deref(),
            Some("Context from previous conversation: Q: What is DNA?\nA: A molecule.")
        );
        assert_eq!(
            request.system_with_context(),
            format!(
                "{}\n\nContext from previous conversation: Q: What is DNA?\nA: A molecule.",
                SYSTEM_PREAMBLE
            )
        );
        assert!(request.flattened_prompt().ends_with("\n\nUser query: And RNA?"));
    }
}
