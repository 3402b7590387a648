//! Absolute URI resolution.
//!
//! # Responsibilities
//! - Prefer the inbound request's own absolute URI
//! - On failure, rebuild from the raw request target with illegal
//!   characters percent-encoded
//! - Derive the container base URI from the request URI
//!
//! # Design Decisions
//! - Query pairs are form-encoded per key and value; `&` and the first `=`
//!   of each pair stay structural
//! - Existing `%XX` escapes and `+` are preserved so a second pass over an
//!   already-encoded target changes nothing
//! - Resolution never fails: the last resort is the request origin

use axum::http::header;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::{form_urlencoded, Position, Url};

use crate::error::UriError;
use crate::http::request::InboundRequest;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_ORIGIN: &str = "http://localhost/";

/// Bytes percent-encoded in path and fragment: everything outside the
/// RFC 3986 unreserved and reserved sets, plus `%` itself.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

/// Bytes that make a URI string illegal as received.
const ILLEGAL_URI_SET: &AsciiSet = &URI_ENCODE_SET.remove(b'%');

/// Resolve the absolute URI of an inbound request.
///
/// An origin-form target is always resolved against the request's own
/// scheme and `Host`; a target such as `//other.host/x` stays a path.
pub fn resolve_absolute_uri(inbound: &dyn InboundRequest) -> Url {
    let err = match inbound.absolute_uri() {
        Ok(uri) => return uri,
        Err(e) => e,
    };

    let raw = inbound.raw_uri();
    tracing::info!(error = %err, raw_uri = %raw, "Could not convert request uri, encoding query");

    let encoded = encode_raw_uri(raw);
    let origin = request_origin(inbound);

    let resolved = if encoded.starts_with('/') {
        Url::parse(&format!("{}{}", &origin[..Position::BeforePath], encoded))
    } else {
        Url::parse(&encoded)
    };

    match resolved {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(error = %e, raw_uri = %raw, "Falling back to request origin");
            origin
        }
    }
}

/// Percent-encode the characters of a raw request target that are not legal
/// in a URI.
pub fn encode_raw_uri(raw: &str) -> String {
    let (before_fragment, fragment) = match raw.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (raw, None),
    };
    let (target, query) = match before_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (before_fragment, None),
    };

    let mut out = String::with_capacity(raw.len() + 16);
    encode_into(&mut out, target, Component::Uri);

    if let Some(query) = query {
        out.push('?');
        for (i, pair) in query.split('&').enumerate() {
            if i > 0 {
                out.push('&');
            }
            match pair.split_once('=') {
                Some((key, value)) => {
                    encode_into(&mut out, key, Component::Form);
                    out.push('=');
                    encode_into(&mut out, value, Component::Form);
                }
                None => encode_into(&mut out, pair, Component::Form),
            }
        }
    }

    if let Some(fragment) = fragment {
        out.push('#');
        encode_into(&mut out, fragment, Component::Uri);
    }

    out
}

/// Reject strings containing characters outside the RFC 3986 set.
pub fn check_uri_chars(uri: &str) -> Result<(), UriError> {
    match uri.char_indices().find(|(_, c)| !is_uri_char(*c)) {
        Some((offset, ch)) => Err(UriError::IllegalCharacter { ch, offset }),
        None => Ok(()),
    }
}

/// Base URI of the container: the request origin joined with `base_path`.
pub fn base_uri(request_uri: &Url, base_path: &str) -> Url {
    let mut base = request_uri.clone();
    base.set_path(base_path);
    base.set_query(None);
    base.set_fragment(None);
    base
}

fn request_origin(inbound: &dyn InboundRequest) -> Url {
    let host = inbound
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty() && check_uri_chars(h).is_ok())
        .unwrap_or(DEFAULT_HOST);

    Url::parse(&format!("{}://{}/", inbound.scheme(), host)).unwrap_or_else(|_| default_origin())
}

fn default_origin() -> Url {
    Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid URL")
}

fn is_uri_char(c: char) -> bool {
    let mut buf = [0; 4];
    let c: &str = c.encode_utf8(&mut buf);
    utf8_percent_encode(c, ILLEGAL_URI_SET).next() == Some(c)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Component {
    Uri,
    Form,
}

/// Encode `input`, copying existing `%XX` escapes (and `+` in form
/// components) through unchanged.
fn encode_into(out: &mut String, input: &str, component: Component) {
    let bytes = input.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let kept = if is_escape(&bytes[i..]) {
            3
        } else if bytes[i] == b'+' && component == Component::Form {
            1
        } else {
            i += 1;
            continue;
        };
        encode_piece(out, &input[start..i], component);
        out.push_str(&input[i..i + kept]);
        i += kept;
        start = i;
    }
    encode_piece(out, &input[start..], component);
}

fn encode_piece(out: &mut String, piece: &str, component: Component) {
    match component {
        Component::Uri => out.extend(utf8_percent_encode(piece, URI_ENCODE_SET)),
        Component::Form => out.extend(form_urlencoded::byte_serialize(piece.as_bytes())),
    }
}

fn is_escape(bytes: &[u8]) -> bool {
    bytes.len() >= 3 && bytes[0] == b'%' && bytes[1].is_ascii_hexdigit() && bytes[2].is_ascii_hexdigit()
}
