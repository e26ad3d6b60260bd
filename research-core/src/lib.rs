//! Research assistant core: session memory, web search augmentation,
//! document extraction and the query pipeline tying them to the provider
//! registry from the `llm` crate.

pub mod document;
pub mod error;
pub mod logging;
pub mod memory;
pub mod pipeline;
pub mod search;

pub use document::DocumentExtractor;
pub use error::{DocumentError, PipelineError, SearchError};
pub use memory::{Exchange, SessionMemory};
pub use pipeline::{DocumentRequest, QueryOutcome, QueryPipeline, QueryRequest, new_session_id};
pub use search::{SearchAugmenter, SearchEngine, SearchResult};
