//! Shared in-memory fakes for adapter and server tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue, Method};
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use tokio::sync::mpsc;
use url::Url;

use request_bridge::adapter::{
    ApplicationDelegate, Completion, ContainerRequest, ProcessorChain, RequestAdapter,
    RequestProcessor,
};
use request_bridge::config::AdapterConfig;
use request_bridge::error::{BoxError, UriError};
use request_bridge::http::{BodyStream, InboundRequest};

/// Sender side of a live body: each `send` is a chunk, `end` is end-of-stream.
pub struct BodyFeed {
    tx: mpsc::UnboundedSender<Result<Bytes, BoxError>>,
}

impl BodyFeed {
    pub fn send(&self, chunk: &'static str) {
        self.tx.send(Ok(Bytes::from_static(chunk.as_bytes()))).unwrap();
    }

    pub fn fail(&self, message: &'static str) {
        self.tx.send(Err(message.into())).unwrap();
    }

    pub fn end(self) {}
}

/// An inbound request built entirely in memory.
pub struct FakeInbound {
    method: Method,
    scheme: &'static str,
    headers: HeaderMap,
    absolute: Result<Url, UriError>,
    raw: String,
    body: Mutex<Option<BodyStream>>,
    body_taken: Arc<Mutex<u32>>,
}

impl FakeInbound {
    pub fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            scheme: "http",
            headers: HeaderMap::new(),
            absolute: Url::parse(uri).map_err(UriError::from),
            raw: uri.to_string(),
            body: Mutex::new(None),
            body_taken: Arc::new(Mutex::new(0)),
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn content_type(mut self, value: &'static str) -> Self {
        self.headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        self
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.append(name, HeaderValue::from_static(value));
        self
    }

    pub fn scheme(mut self, scheme: &'static str) -> Self {
        self.scheme = scheme;
        self
    }

    /// Make the absolute-URI accessor fail, leaving only the raw URI.
    pub fn malformed_absolute(mut self) -> Self {
        self.absolute = Err(UriError::IllegalCharacter { ch: '|', offset: 0 });
        self
    }

    /// Attach a body that is already complete.
    pub fn body_chunks(self, chunks: &[&'static str]) -> Self {
        let items: Vec<Result<Bytes, BoxError>> = chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();
        *self.body.lock().unwrap() = Some(stream::iter(items).boxed());
        self
    }

    /// Attach a live body fed from the returned handle.
    pub fn live_body(self) -> (Self, BodyFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        let body = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
        .boxed();
        *self.body.lock().unwrap() = Some(body);
        (self, BodyFeed { tx })
    }

    /// Counter of how many times the body stream was handed out.
    pub fn body_taken_counter(&self) -> Arc<Mutex<u32>> {
        self.body_taken.clone()
    }
}

impl InboundRequest for FakeInbound {
    fn method(&self) -> &Method {
        &self.method
    }

    fn scheme(&self) -> &str {
        self.scheme
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn absolute_uri(&self) -> Result<Url, UriError> {
        self.absolute.clone()
    }

    fn raw_uri(&self) -> &str {
        &self.raw
    }

    fn take_body(&mut self) -> Option<BodyStream> {
        let body = self.body.get_mut().unwrap().take();
        if body.is_some() {
            *self.body_taken.lock().unwrap() += 1;
        }
        body
    }
}

/// Delegate that keeps every request it receives.
#[derive(Default)]
pub struct RecordingDelegate {
    received: Mutex<Vec<ContainerRequest>>,
    log: Option<Arc<Mutex<Vec<String>>>>,
}

impl RecordingDelegate {
    pub fn with_log(log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            log: Some(log),
        }
    }

    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn take(&self) -> Vec<ContainerRequest> {
        std::mem::take(&mut *self.received.lock().unwrap())
    }
}

impl ApplicationDelegate for RecordingDelegate {
    fn handle(&self, request: ContainerRequest) {
        if let Some(log) = &self.log {
            log.lock().unwrap().push("delegate".to_string());
        }
        self.received.lock().unwrap().push(request);
    }
}

/// Processor that logs its name and completes immediately.
pub struct SyncProcessor {
    pub name: &'static str,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl RequestProcessor for SyncProcessor {
    fn process(&self, _inbound: &dyn InboundRequest, request: ContainerRequest, done: Completion) {
        self.log.lock().unwrap().push(self.name.to_string());
        done.complete(request);
    }
}

/// Processor that completes from a spawned task after a delay, tagging the
/// request on the way.
pub struct DelayedProcessor {
    pub name: &'static str,
    pub delay: Duration,
    pub log: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Visited(pub Vec<&'static str>);

impl RequestProcessor for DelayedProcessor {
    fn process(&self, _inbound: &dyn InboundRequest, mut request: ContainerRequest, done: Completion) {
        let name = self.name;
        let delay = self.delay;
        let log = self.log.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            log.lock().unwrap().push(name.to_string());
            let mut visited = request
                .extensions()
                .get::<Visited>()
                .cloned()
                .unwrap_or(Visited(Vec::new()));
            visited.0.push(name);
            request.extensions_mut().insert(visited);
            done.complete(request);
        });
    }
}

/// Processor that drops its completion without signalling.
pub struct AbandoningProcessor;

impl RequestProcessor for AbandoningProcessor {
    fn process(&self, _inbound: &dyn InboundRequest, _request: ContainerRequest, done: Completion) {
        drop(done);
    }
}

/// Adapter with a 1KB body limit and the given delegate and processors.
pub fn adapter(
    delegate: Arc<RecordingDelegate>,
    processors: Vec<Arc<dyn RequestProcessor>>,
) -> RequestAdapter {
    let config = AdapterConfig {
        max_body_size: 1024,
        ..Default::default()
    };
    RequestAdapter::new(&config, delegate).with_processors(ProcessorChain::new(processors))
}

pub fn new_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}
