//! Credentials and endpoint overrides read from the process environment.
//!
//! Every recognised key is read once, at construction. Empty values and the
//! `your_api_key_here` placeholder from example `.env` files count as absent.

use std::collections::HashMap;
use std::fmt;

pub const DEEPSEEK_API_KEY: &str = "DEEPSEEK_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const HUGGINGFACE_API_KEY: &str = "HUGGINGFACE_API_KEY";
pub const SERPAPI_API_KEY: &str = "SERPAPI_API_KEY";
pub const GOOGLE_PSE_ID: &str = "GOOGLE_PSE_ID";

pub const DEEPSEEK_BASE_URL: &str = "DEEPSEEK_BASE_URL";
pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ANTHROPIC_BASE_URL: &str = "ANTHROPIC_BASE_URL";
pub const GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
pub const HUGGINGFACE_BASE_URL: &str = "HUGGINGFACE_BASE_URL";
pub const SERPAPI_BASE_URL: &str = "SERPAPI_BASE_URL";
pub const GOOGLE_PSE_BASE_URL: &str = "GOOGLE_PSE_BASE_URL";

pub const DEEPSEEK_MODEL: &str = "DEEPSEEK_MODEL";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ANTHROPIC_MODEL: &str = "ANTHROPIC_MODEL";
pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const GOOGLE_GEMINI_MODEL: &str = "GOOGLE_GEMINI_MODEL";
pub const HUGGINGFACE_MODEL: &str = "HUGGINGFACE_MODEL";

pub const AI_PROVIDER: &str = "AI_PROVIDER";

const PLACEHOLDER: &str = "your_api_key_here";

const RECOGNIZED_KEYS: &[&str] = &[
    DEEPSEEK_API_KEY,
    OPENAI_API_KEY,
    ANTHROPIC_API_KEY,
    GEMINI_API_KEY,
    GOOGLE_API_KEY,
    HUGGINGFACE_API_KEY,
    SERPAPI_API_KEY,
    GOOGLE_PSE_ID,
    DEEPSEEK_BASE_URL,
    OPENAI_BASE_URL,
    ANTHROPIC_BASE_URL,
    GEMINI_BASE_URL,
    HUGGINGFACE_BASE_URL,
    SERPAPI_BASE_URL,
    GOOGLE_PSE_BASE_URL,
    DEEPSEEK_MODEL,
    OPENAI_MODEL,
    ANTHROPIC_MODEL,
    GEMINI_MODEL,
    GOOGLE_GEMINI_MODEL,
    HUGGINGFACE_MODEL,
    AI_PROVIDER,
];

/// Snapshot of the recognised environment keys.
#[derive(Clone, Default)]
pub struct Credentials {
    values: HashMap<String, String>,
}

impl Credentials {
    /// Read all recognised keys from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup, e.g. a fixed map in tests.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let values = RECOGNIZED_KEYS
            .iter()
            .filter_map(|key| {
                let value = lookup(key)?;
                is_usable(&value).then(|| (key.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { values }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::from_lookup(|key| map.get(key).cloned())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The first present key of `keys`, in order.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Gemini accepts either its own key or the generic Google key.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.first_of(&[GEMINI_API_KEY, GOOGLE_API_KEY])
    }

    pub fn gemini_model(&self) -> Option<&str> {
        self.first_of(&[GEMINI_MODEL, GOOGLE_GEMINI_MODEL])
    }

    pub fn default_provider(&self) -> Option<&str> {
        self.get(AI_PROVIDER)
    }
}

fn is_usable(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != PLACEHOLDER
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("Credentials").field("present", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_and_empty_are_absent() {
        let creds = Credentials::from_pairs([
            (OPENAI_API_KEY, "your_api_key_here"),
            (ANTHROPIC_API_KEY, "   "),
            (DEEPSEEK_API_KEY, "sk-real"),
        ]);
        assert!(!creds.has(OPENAI_API_KEY));
        assert!(!creds.has(ANTHROPIC_API_KEY));
        assert_eq!(creds.get(DEEPSEEK_API_KEY), Some("sk-real"));
    }

    #[test]
    fn test_unrecognised_keys_are_ignored() {
        let creds = Credentials::from_pairs([("SOMETHING_ELSE", "x")]);
        assert!(creds.get("SOMETHING_ELSE").is_none());
    }

    #[test]
    fn test_gemini_key_falls_back_to_google_key() {
        let creds = Credentials::from_pairs([(GOOGLE_API_KEY, "g-key")]);
        assert_eq!(creds.gemini_api_key(), Some("g-key"));

        let creds = Credentials::from_pairs([(GOOGLE_API_KEY, "g-key"), (GEMINI_API_KEY, "gem")]);
        assert_eq!(creds.gemini_api_key(), Some("gem"));
    }

    #[test]
    fn test_debug_does_not_leak_values() {
        let creds = Credentials::from_pairs([(OPENAI_API_KEY, "sk-secret")]);
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains(OPENAI_API_KEY));
        assert!(!rendered.contains("sk-secret"));
    }
}
