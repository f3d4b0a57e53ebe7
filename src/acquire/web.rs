//! Webpage main-text extraction.
//!
//! The page is fetched with a blocking reqwest client and reduced to text
//! with a handful of regex passes. Scripts, styles and page chrome are
//! dropped, then the first `<article>`, `<main>` or `<body>` region wins.

use std::sync::OnceLock;
use std::time::Duration;

use regex::{Captures, Regex};
use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use super::AcquireError;
use crate::lifecycle::CancelToken;

/// Fetches a URL and returns its main readable text.
///
/// Returns [`AcquireError::NoContent`] when the page has no extractable text.
pub trait WebpageExtractor: Send + Sync {
    fn extract(&self, url: &Url, cancel: &CancelToken) -> Result<String, AcquireError>;
}

pub struct HttpWebpageExtractor {
    client: Client,
}

impl HttpWebpageExtractor {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, AcquireError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl WebpageExtractor for HttpWebpageExtractor {
    fn extract(&self, url: &Url, cancel: &CancelToken) -> Result<String, AcquireError> {
        if cancel.is_cancelled() {
            return Err(AcquireError::Cancelled);
        }
        debug!("Fetching webpage {}", url);
        let response = self
            .client
            .get(url.as_str())
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquireError::HttpStatus(status.as_u16()));
        }
        let html = response.text()?;
        if cancel.is_cancelled() {
            return Err(AcquireError::Cancelled);
        }

        main_text(&html).ok_or(AcquireError::NoContent)
    }
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex must compile"))
}

const DROPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "nav", "header", "footer", "aside",
    "form",
];

const CONTENT_REGIONS: &[&str] = &["article", "main", "body"];

fn dropped_element_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DROPPED_ELEMENTS
            .iter()
            .map(|tag| {
                Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                    .expect("static regex must compile")
            })
            .collect()
    })
}

fn region_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        CONTENT_REGIONS
            .iter()
            .map(|tag| {
                Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*)</{tag}\s*>"))
                    .expect("static regex must compile")
            })
            .collect()
    })
}

/// Reduce an HTML document to its main text, one block per line.
///
/// Returns `None` when nothing readable is left.
pub fn main_text(html: &str) -> Option<String> {
    static COMMENT: OnceLock<Regex> = OnceLock::new();
    static BLOCK_END: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let mut doc = regex(&COMMENT, r"(?s)<!--.*?-->")
        .replace_all(html, "")
        .into_owned();
    for pattern in dropped_element_patterns() {
        doc = pattern.replace_all(&doc, "").into_owned();
    }

    let region = region_patterns()
        .iter()
        .find_map(|p| p.captures(&doc).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_string())
        .unwrap_or(doc);

    let text = regex(
        &BLOCK_END,
        r"(?i)<br\s*/?>|</(?:p|div|h[1-6]|li|tr|blockquote|section|article|pre)\s*>",
    )
    .replace_all(&region, "\n");
    let text = regex(&TAG, r"<[^>]+>").replace_all(&text, "");
    let text = decode_entities(&text);

    let spaces = regex(&SPACES, r"[ \t\r\f\u{a0}]+");
    let lines: Vec<String> = text
        .lines()
        .map(|line| spaces.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Decode named and numeric HTML character references.
pub(crate) fn decode_entities(text: &str) -> String {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    let re = regex(&ENTITY, r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);");
    re.replace_all(text, |caps: &Captures| {
        let body = &caps[1];
        let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = body.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            named_entity(body)
        };
        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "euro" => '€',
        "pound" => '£',
        "deg" => '°',
        _ => return None,
    };
    Some(c)
}
