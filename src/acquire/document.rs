//! Text extraction from local documents.
//!
//! Dispatch is by lowercase extension over a fixed set: plain text,
//! Markdown, PDF and DOCX.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::web::decode_entities;
use super::AcquireError;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    PlainText,
    Markdown,
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Resolve a lowercase extension without the dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "txt" => Some(DocumentKind::PlainText),
            "md" => Some(DocumentKind::Markdown),
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::PlainText => "txt",
            DocumentKind::Markdown => "md",
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
        }
    }
}

/// Turns a document on disk into plain text.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, path: &Path, kind: DocumentKind) -> Result<String, AcquireError>;
}

/// Extractor backed by lopdf and the DOCX zip container.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDocumentExtractor;

impl DocumentExtractor for FileDocumentExtractor {
    fn extract(&self, path: &Path, kind: DocumentKind) -> Result<String, AcquireError> {
        match kind {
            DocumentKind::PlainText => Ok(fs::read_to_string(path)?),
            DocumentKind::Markdown => Ok(clean_markdown(&fs::read_to_string(path)?)),
            DocumentKind::Pdf => extract_pdf(path),
            DocumentKind::Docx => extract_docx(path),
        }
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex must compile"))
}

/// Strip fenced code, header hashes and emphasis markers from Markdown.
pub fn clean_markdown(text: &str) -> String {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    static HEADER: OnceLock<Regex> = OnceLock::new();
    static EMPHASIS: OnceLock<Regex> = OnceLock::new();

    let text = regex(&FENCE, r"(?s)```.*?```").replace_all(text, "");
    let text = regex(&HEADER, r"#+\s*").replace_all(&text, "");
    let text = regex(&EMPHASIS, r"\*\*|__|\*|_").replace_all(&text, "");
    text.trim().to_string()
}

fn extract_pdf(path: &Path) -> Result<String, AcquireError> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| AcquireError::Format(format!("could not open PDF: {}", e)))?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    if pages.is_empty() {
        return Ok(String::new());
    }
    doc.extract_text(&pages)
        .map_err(|e| AcquireError::Format(format!("could not read PDF text: {}", e)))
}

fn extract_docx(path: &Path) -> Result<String, AcquireError> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| AcquireError::Format(format!("not a DOCX archive: {}", e)))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| AcquireError::Format(format!("missing document body: {}", e)))?
        .read_to_string(&mut xml)?;
    Ok(docx_text(&xml))
}

/// Paragraph text from a WordprocessingML body, one paragraph per line.
pub(crate) fn docx_text(xml: &str) -> String {
    static RUN_OR_BREAK: OnceLock<Regex> = OnceLock::new();
    let re = regex(
        &RUN_OR_BREAK,
        r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|</w:p>|<w:tab/>|<w:br/>",
    );

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    for caps in re.captures_iter(xml) {
        if let Some(run) = caps.get(1) {
            current.push_str(&decode_entities(run.as_str()));
            continue;
        }
        match &caps[0] {
            "</w:p>" => paragraphs.push(std::mem::take(&mut current)),
            "<w:tab/>" => current.push('\t'),
            _ => current.push('\n'),
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs.join("\n")
}
