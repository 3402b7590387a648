//! Inbound request capability and its axum implementation.
//!
//! # Responsibilities
//! - Describe what the adapter needs from a network request
//! - Wrap an axum request so it can be adapted
//! - Attach a unique request ID (UUID v4) as early as possible
//!
//! # Design Decisions
//! - The body is a stream of chunks; the stream ending is the
//!   end-of-stream signal
//! - `take_*` accessors hand out the body and writer once; later calls
//!   return `None`
//! - The absolute-URI accessor is strict and reports illegal characters
//!   instead of repairing them

use std::sync::Mutex;

use axum::{
    body::Body,
    http::{header, request::Parts, HeaderMap, HeaderName, Method, Request},
};
use bytes::Bytes;
use futures_util::{stream::BoxStream, StreamExt, TryStreamExt};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use url::Url;

use crate::adapter::uri::check_uri_chars;
use crate::error::{BoxError, UriError};
use crate::http::response::ResponseWriter;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Body chunks in arrival order. The stream ending signals end-of-stream.
pub type BodyStream = BoxStream<'static, Result<Bytes, BoxError>>;

/// A network request as seen by the adapter.
pub trait InboundRequest: Send + Sync {
    fn method(&self) -> &Method;

    fn headers(&self) -> &HeaderMap;

    /// Scheme the request arrived on.
    fn scheme(&self) -> &str {
        "http"
    }

    /// The pre-parsed absolute URI. May fail on malformed components.
    fn absolute_uri(&self) -> Result<Url, UriError>;

    /// The request target exactly as received.
    fn raw_uri(&self) -> &str;

    /// Hand out the body stream. Returns `None` once taken or when the
    /// request has no body.
    fn take_body(&mut self) -> Option<BodyStream>;

    fn request_id(&self) -> Option<&str> {
        self.headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
    }

    /// Hand out the channel the delegate answers on, if the network layer
    /// provides one.
    fn take_response_writer(&mut self) -> Option<ResponseWriter> {
        None
    }
}

/// An axum request prepared for adaptation.
pub struct AxumInbound {
    parts: Parts,
    raw_uri: String,
    body: Mutex<Option<Body>>,
    writer: Option<ResponseWriter>,
}

impl AxumInbound {
    pub fn new(request: Request<Body>, writer: ResponseWriter) -> Self {
        let (parts, body) = request.into_parts();
        let raw_uri = parts.uri.to_string();
        Self {
            parts,
            raw_uri,
            body: Mutex::new(Some(body)),
            writer: Some(writer),
        }
    }
}

impl InboundRequest for AxumInbound {
    fn method(&self) -> &Method {
        &self.parts.method
    }

    fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    fn scheme(&self) -> &str {
        self.parts.uri.scheme_str().unwrap_or("http")
    }

    fn absolute_uri(&self) -> Result<Url, UriError> {
        let uri = &self.parts.uri;
        let authority = match uri.authority() {
            Some(authority) => authority.as_str(),
            None => self
                .parts
                .headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .ok_or(UriError::MissingHost)?,
        };
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

        let candidate = format!("{}://{}{}", self.scheme(), authority, path_and_query);
        check_uri_chars(&candidate)?;
        Ok(Url::parse(&candidate)?)
    }

    fn raw_uri(&self) -> &str {
        &self.raw_uri
    }

    fn take_body(&mut self) -> Option<BodyStream> {
        let body = self.body.get_mut().ok()?.take()?;
        Some(
            body.into_data_stream()
                .map_err(|e| -> BoxError { Box::new(e) })
                .boxed(),
        )
    }

    fn take_response_writer(&mut self) -> Option<ResponseWriter> {
        self.writer.take()
    }
}

/// Layers that stamp each request with a UUID and echo it on the response.
pub fn request_id_layers() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    let name = HeaderName::from_static(X_REQUEST_ID);
    (
        SetRequestIdLayer::new(name.clone(), MakeRequestUuid),
        PropagateRequestIdLayer::new(name),
    )
}
