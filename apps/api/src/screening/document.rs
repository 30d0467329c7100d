//! Document text extraction for uploaded résumés (PDF and plain text).

use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::screening::PipelineError;

/// A raw upload as received from the caller.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Bytes,
    pub content_type: String,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Resolves a declared MIME type, ignoring parameters such as `charset`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "application/pdf" | "application/x-pdf" => Some(DocumentKind::Pdf),
            "text/plain" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::PlainText => "text/plain",
        }
    }
}

/// Trimmed plain text of a document plus its page count.
#[derive(Debug, Clone)]
pub struct ParsedText {
    pub text: String,
    pub page_count: u32,
    pub kind: DocumentKind,
}

impl ParsedText {
    /// The first `max_chars` characters, for storage alongside the record.
    pub fn excerpt(&self, max_chars: usize) -> String {
        self.text.chars().take(max_chars).collect()
    }
}

/// Extracts text from a raw document.
///
/// An image-only PDF yields empty text here; rejecting that is left to the
/// caller so it can be reported as an empty extraction rather than a parse
/// failure.
pub fn extract_text(document: &RawDocument) -> Result<ParsedText, PipelineError> {
    let kind = DocumentKind::from_content_type(&document.content_type).ok_or_else(|| {
        PipelineError::UnsupportedFormat(document.content_type.clone())
    })?;

    let parsed = match kind {
        DocumentKind::PlainText => ParsedText {
            text: clean_text(&decode_plain_text(&document.bytes)),
            page_count: 1,
            kind,
        },
        DocumentKind::Pdf => {
            let pages = extract_pdf_pages(&document.bytes)?;
            let page_count = u32::try_from(pages.len()).unwrap_or(u32::MAX);
            ParsedText {
                text: clean_text(&pages.join("\n")),
                page_count,
                kind,
            }
        }
    };

    debug!(
        "Extracted {} chars from {} ({} pages)",
        parsed.text.chars().count(),
        document.filename,
        parsed.page_count
    );
    Ok(parsed)
}

/// Decodes plain text, honouring a UTF-8 or UTF-16 byte-order mark.
fn decode_plain_text(bytes: &[u8]) -> String {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8_lossy(rest).into_owned(),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Drops control characters other than line breaks and tabs (PostgreSQL
/// rejects NUL in text and jsonb), then trims.
fn clean_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// pdf-extract panics on some malformed streams; a panic is reported as a
/// parse failure like any other decoding error.
fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<String>, PipelineError> {
    match panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    })) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(PipelineError::ParseFailure(e.to_string())),
        Err(_) => Err(PipelineError::ParseFailure(
            "PDF decoder aborted on a malformed stream".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(bytes: &'static [u8], content_type: &str) -> RawDocument {
        RawDocument {
            bytes: Bytes::from_static(bytes),
            content_type: content_type.to_string(),
            filename: "resume".to_string(),
        }
    }

    #[test]
    fn test_plain_text_is_trimmed_single_page() {
        let parsed = extract_text(&document(b"  \n Jane Doe, Rust engineer \n", "text/plain")).unwrap();
        assert_eq!(parsed.text, "Jane Doe, Rust engineer");
        assert_eq!(parsed.page_count, 1);
        assert_eq!(parsed.kind, DocumentKind::PlainText);
    }

    #[test]
    fn test_content_type_parameters_are_ignored() {
        let parsed = extract_text(&document(b"hello", "Text/Plain; charset=utf-8")).unwrap();
        assert_eq!(parsed.text, "hello");
    }

    #[test]
    fn test_unsupported_format_is_rejected() {
        let err = extract_text(&document(b"PK\x03\x04", "application/msword")).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(ct) if ct == "application/msword"));
    }

    #[test]
    fn test_corrupt_pdf_is_parse_failure() {
        let err = extract_text(&document(b"this is not a pdf", "application/pdf")).unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure(_)));
    }

    #[test]
    fn test_whitespace_only_text_is_empty_not_an_error() {
        let parsed = extract_text(&document(b" \n\t ", "text/plain")).unwrap();
        assert!(parsed.text.is_empty());
    }

    #[test]
    fn test_utf16_text_is_decoded() {
        let mut le = vec![0xFF, 0xFE];
        le.extend("Jane Doe, Rust".encode_utf16().flat_map(u16::to_le_bytes));
        let parsed = extract_text(&RawDocument {
            bytes: Bytes::from(le),
            content_type: "text/plain".to_string(),
            filename: "cv.txt".to_string(),
        })
        .unwrap();
        assert_eq!(parsed.text, "Jane Doe, Rust");

        let mut be = vec![0xFE, 0xFF];
        be.extend("Zoë".encode_utf16().flat_map(u16::to_be_bytes));
        assert_eq!(decode_plain_text(&be), "Zoë");
    }

    #[test]
    fn test_control_characters_are_stripped() {
        let parsed = extract_text(&document(b"Jane\0 Doe\x07\nRust\tGo", "text/plain")).unwrap();
        assert_eq!(parsed.text, "Jane Doe\nRust\tGo");
        assert!(!parsed.text.contains('\0'));
    }

    #[test]
    fn test_nul_only_text_is_empty() {
        let parsed = extract_text(&document(b"\0\0\0 \0", "text/plain")).unwrap();
        assert!(parsed.text.is_empty());
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let parsed = ParsedText {
            text: "héllo wörld".to_string(),
            page_count: 1,
            kind: DocumentKind::PlainText,
        };
        assert_eq!(parsed.excerpt(4), "héll");
        assert_eq!(parsed.excerpt(100), "héllo wörld");
    }
}
