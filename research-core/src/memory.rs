//! Bounded per-session conversation history.

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_MAX_HISTORY: usize = 10;

/// One question and the answer it produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exchange {
    pub query: String,
    pub response: String,
}

impl Exchange {
    fn render(&self) -> String {
        format!("Q: {}\nA: {}", self.query, self.response)
    }
}

/// Exchange log keyed by session id, keeping at most `max_history` entries per session.
///
/// Appends for one session are atomic under the lock. Concurrent requests on
/// the same session are not serialized against each other beyond that.
#[derive(Debug)]
pub struct SessionMemory {
    sessions: Mutex<HashMap<String, VecDeque<Exchange>>>,
    max_history: usize,
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::with_max_history(DEFAULT_MAX_HISTORY)
    }

    /// A zero limit is treated as the default.
    pub fn with_max_history(max_history: usize) -> Self {
        let max_history = if max_history == 0 {
            DEFAULT_MAX_HISTORY
        } else {
            max_history
        };
        SessionMemory {
            sessions: Mutex::new(HashMap::new()),
            max_history,
        }
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Rendered history, oldest first, or "" for a session with no exchanges.
    pub fn get_context(&self, session_id: &str) -> String {
        let sessions = self.sessions.lock();
        match sessions.get(session_id) {
            Some(history) => history
                .iter()
                .map(Exchange::render)
                .collect::<Vec<_>>()
                .join("\n"),
            None => String::new(),
        }
    }

    pub fn add_exchange(&self, session_id: &str, query: &str, response: &str) {
        let mut sessions = self.sessions.lock();
        let history = sessions.entry(session_id.to_string()).or_default();
        history.push_back(Exchange {
            query: query.to_string(),
            response: response.to_string(),
        });
        while history.len() > self.max_history {
            history.pop_front();
        }
    }

    pub fn clear_session(&self, session_id: &str) {
        self.sessions.lock().remove(session_id);
    }

    pub fn exchanges(&self, session_id: &str) -> Vec<Exchange> {
        self.sessions
            .lock()
            .get(session_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}
