//! Plain text extraction from uploaded documents.

use crate::error::DocumentError;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "pdf", "docx"];

/// Characters of document text forwarded to a provider.
pub const MAX_DOCUMENT_CHARS: usize = 4000;

pub const DEFAULT_DOCUMENT_QUERY: &str = "Analyze this document";

const DOCX_BODY: &str = "word/document.xml";

#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        DocumentExtractor
    }

    /// Lowercased text after the last dot, or "" when there is none.
    /// A dotless name has no extension rather than being its own, so it never matches a supported type.
    pub fn extension(filename: &str) -> String {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(filename);
        match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_lowercase(),
            None => String::new(),
        }
    }

    pub fn is_supported(&self, filename: &str) -> bool {
        SUPPORTED_EXTENSIONS.contains(&Self::extension(filename).as_str())
    }

    pub fn extract_text(&self, path: &Path, extension: &str) -> Result<String, DocumentError> {
        debug!(path = %path.display(), extension, "Extracting document text");
        match extension.to_lowercase().as_str() {
            "txt" => std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
                path: path.to_path_buf(),
                source,
            }),
            "pdf" => {
                let bytes = read_bytes(path)?;
                pdf_extract::extract_text_from_mem(&bytes).map_err(|e| DocumentError::Pdf(e.to_string()))
            }
            "docx" => extract_docx(path),
            other => Err(DocumentError::Unsupported(other.to_string())),
        }
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, DocumentError> {
    std::fs::read(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn extract_docx(path: &Path) -> Result<String, DocumentError> {
    let file = File::open(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| DocumentError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| DocumentError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Docx(e.to_string()))?;
    docx_paragraphs(&xml).map(|paragraphs| paragraphs.join("\n"))
}

/// Text of every `w:p` paragraph in a WordprocessingML body, in document order.
fn docx_paragraphs(xml: &str) -> Result<Vec<String>, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:p" => {
                    paragraphs.push(std::mem::take(&mut current));
                    in_paragraph = false;
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" if in_paragraph => current.push('\t'),
                b"w:br" if in_paragraph => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.decode().map_err(|e| DocumentError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::GeneralRef(r)) if in_text => {
                if let Ok(Some(c)) = r.resolve_char_ref() {
                    current.push(c);
                } else {
                    let name = r.decode().map_err(|e| DocumentError::Docx(e.to_string()))?;
                    current.push_str(predefined_entity(&name));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::Docx(e.to_string())),
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn predefined_entity(name: &str) -> &'static str {
    match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => "",
    }
}

/// First `max` characters of `text`, on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Provider prompt for a document question.
pub fn document_prompt(text: &str, query: &str) -> String {
    format!(
        "Analyze the following document content and answer the user's query.\n\n\
         DOCUMENT CONTENT:\n{}\n\n\
         USER QUERY: {}\n\n\
         Please provide a comprehensive analysis based on the document content.",
        truncate_chars(text, MAX_DOCUMENT_CHARS),
        query
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_extension_and_support() {
        let extractor = DocumentExtractor::new();
        assert_eq!(DocumentExtractor::extension("Report.Final.PDF"), "pdf");
        assert_eq!(DocumentExtractor::extension("/tmp/dir.v2/notes"), "");
        assert_eq!(DocumentExtractor::extension("README"), "");
        assert!(extractor.is_supported("notes.TXT"));
        assert!(extractor.is_supported("paper.docx"));
        assert!(!extractor.is_supported("sheet.xlsx"));
        assert!(!extractor.is_supported("README"));
    }

    #[test]
    fn test_txt_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "héllo\nworld").unwrap();
        let text = DocumentExtractor::new().extract_text(&path, "txt").unwrap();
        assert_eq!(text, "héllo\nworld");
    }

    #[test]
    fn test_docx_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file(DOCX_BODY, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>First</w:t></w:r><w:r><w:t xml:space="preserve"> paragraph</w:t></w:r></w:p>
<w:p><w:r><w:t>Fish &amp; chips</w:t></w:r></w:p>
</w:body></w:document>"#,
        )
        .unwrap();
        zip.finish().unwrap();

        let text = DocumentExtractor::new().extract_text(&path, "docx").unwrap();
        assert_eq!(text, "First paragraph\nFish & chips");
    }

    #[test]
    fn test_corrupt_docx_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(matches!(
            DocumentExtractor::new().extract_text(&path, "docx"),
            Err(DocumentError::Docx(_))
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = DocumentExtractor::new()
            .extract_text(Path::new("x.csv"), "csv")
            .unwrap_err();
        assert!(matches!(err, DocumentError::Unsupported(ext) if ext == "csv"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[test]
    fn test_prompt_truncates_document() {
        let long = "x".repeat(MAX_DOCUMENT_CHARS + 50);
        let prompt = document_prompt(&long, "Summarize");
        assert!(prompt.contains(&"x".repeat(MAX_DOCUMENT_CHARS)));
        assert!(!prompt.contains(&"x".repeat(MAX_DOCUMENT_CHARS + 1)));
        assert!(prompt.contains("USER QUERY: Summarize"));
    }
}
