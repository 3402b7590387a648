//! Body-read decision table.
//!
//! # Rules
//! ```text
//! method      content type                          read?
//! ─────────── ───────────────────────────────────── ─────
//! not POST/PUT  *                                   no
//! POST/PUT      absent or empty                     yes
//! POST/PUT      application/json                    yes
//! POST/PUT      application/xml, text/xml           yes
//! POST/PUT      application/x-www-form-urlencoded   yes
//! POST/PUT      */*, application/*, text/*          yes
//! POST/PUT      text/plain                          no
//! POST/PUT      anything else                       no
//! ```
//!
//! # Design Decisions
//! - Content type compared on its lowercase essence; parameters such as
//!   `charset` are ignored
//! - A wildcard range reads when it covers one of the readable types
//! - Methods outside the table never read, even with a readable content type
//! - A missing content type on POST/PUT still reads (clients such as legacy
//!   cross-domain XHR omit it)

use axum::http::{header, HeaderMap, Method};

/// What the content type of a request says about its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Undeclared,
    Json,
    Xml,
    Form,
    /// A media range such as `application/*` covering a readable type.
    Wildcard,
    PlainText,
    Other,
}

impl ContentKind {
    /// Classify a raw `Content-Type` value.
    pub fn classify(content_type: Option<&str>) -> Self {
        let essence = match content_type.map(media_type_essence) {
            None => return ContentKind::Undeclared,
            Some(e) if e.is_empty() => return ContentKind::Undeclared,
            Some(e) => e,
        };

        match essence.as_str() {
            "application/json" => ContentKind::Json,
            "application/xml" | "text/xml" => ContentKind::Xml,
            "application/x-www-form-urlencoded" => ContentKind::Form,
            "text/plain" => ContentKind::PlainText,
            "*/*" | "application/*" | "text/*" => ContentKind::Wildcard,
            _ => ContentKind::Other,
        }
    }
}

/// `type/subtype` part of a media type, lowercased, without parameters.
pub fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a request with this method and content type carries a body the
/// adapter must buffer before dispatch.
pub fn should_read_data(method: &Method, content_type: Option<&str>) -> bool {
    if *method != Method::POST && *method != Method::PUT {
        return false;
    }

    matches!(
        ContentKind::classify(content_type),
        ContentKind::Undeclared
            | ContentKind::Json
            | ContentKind::Xml
            | ContentKind::Form
            | ContentKind::Wildcard
    )
}

/// [`should_read_data`] over a header map. Non-UTF-8 content types count as
/// unrecognised.
pub fn should_read_headers(method: &Method, headers: &HeaderMap) -> bool {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().unwrap_or("application/octet-stream"));
    should_read_data(method, content_type)
}
