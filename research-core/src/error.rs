use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single web search backend. Never surfaces past the augmenter.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[from] llm::ApiError),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract PDF text: {0}")]
    Pdf(String),

    #[error("Failed to read DOCX archive: {0}")]
    Docx(String),
}

/// Resource level failures. Provider problems never show up here; they are
/// answer text.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("File not found: {0}")]
    MissingFile(PathBuf),

    #[error("Unsupported document type: {0}. Supported types are txt, pdf and docx.")]
    UnsupportedDocument(String),

    #[error("Error processing document: {0}")]
    Extraction(#[source] DocumentError),
}
