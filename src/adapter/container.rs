//! Container-side representation of an adapted request.

use axum::http::{Extensions, HeaderMap, Method};
use bytes::Bytes;
use url::Url;

use crate::http::response::ResponseWriter;

/// The translated request handed to the application delegate.
///
/// Created fresh for every inbound request and moved into the delegate
/// exactly once.
#[derive(Debug)]
pub struct ContainerRequest {
    method: Method,
    base_uri: Url,
    request_uri: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
    request_id: Option<String>,
    extensions: Extensions,
    writer: Option<ResponseWriter>,
}

impl ContainerRequest {
    pub fn new(method: Method, base_uri: Url, request_uri: Url, headers: HeaderMap) -> Self {
        Self {
            method,
            base_uri,
            request_uri,
            headers,
            body: None,
            request_id: None,
            extensions: Extensions::new(),
            writer: None,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    pub fn request_uri(&self) -> &Url {
        &self.request_uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The materialized body, if one was read.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: Bytes) {
        self.body = Some(body);
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn set_request_id(&mut self, id: impl Into<String>) {
        self.request_id = Some(id.into());
    }

    /// Typed values attached by request processors.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    pub fn set_response_writer(&mut self, writer: ResponseWriter) {
        self.writer = Some(writer);
    }

    /// Take the writer the response must be sent through.
    pub fn take_response_writer(&mut self) -> Option<ResponseWriter> {
        self.writer.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, base: &str) -> ContainerRequest {
        ContainerRequest::new(
            Method::GET,
            Url::parse(base).unwrap(),
            Url::parse(uri).unwrap(),
            HeaderMap::new(),
        )
    }

    #[test]
    fn test_extensions_round_trip() {
        #[derive(Clone, Debug, PartialEq)]
        struct Principal(&'static str);

        let mut req = request("http://example.com/", "http://example.com/");
        req.extensions_mut().insert(Principal("alice"));
        assert_eq!(req.extensions().get::<Principal>(), Some(&Principal("alice")));
        assert!(req.body().is_none());
    }
}
