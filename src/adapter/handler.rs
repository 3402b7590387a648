//! Inbound request adapter.
//!
//! # Flow
//! ```text
//! inbound request
//!     → resolve absolute URI (encode-and-retry on failure)
//!     → build ContainerRequest (method, URI, headers)
//!     → should_read_data? → read chunks until end-of-stream (bounded)
//!     → processor chain, one completion at a time
//!     → delegate.handle(request), exactly once
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;
use bytes::Bytes;
use tracing::Instrument;
use url::Url;

use crate::adapter::body::read_body;
use crate::adapter::chain::ProcessorChain;
use crate::adapter::container::ContainerRequest;
use crate::adapter::delegate::ApplicationDelegate;
use crate::adapter::predicate::should_read_headers;
use crate::adapter::uri::{base_uri, resolve_absolute_uri};
use crate::config::AdapterConfig;
use crate::error::AdapterError;
use crate::http::request::InboundRequest;
use crate::observability::metrics;

/// Bridges inbound network requests to an [`ApplicationDelegate`].
///
/// Holds no per-request state; share it behind an `Arc` across concurrent
/// requests.
pub struct RequestAdapter {
    max_body_size: usize,
    base_path: String,
    delegate: Arc<dyn ApplicationDelegate>,
    processors: ProcessorChain,
}

impl RequestAdapter {
    pub fn new(config: &AdapterConfig, delegate: Arc<dyn ApplicationDelegate>) -> Self {
        Self {
            max_body_size: config.max_body_size,
            base_path: config.base_path.clone(),
            delegate,
            processors: ProcessorChain::default(),
        }
    }

    pub fn with_processors(mut self, processors: ProcessorChain) -> Self {
        self.processors = processors;
        self
    }

    /// Absolute URI of the request; never fails.
    pub fn absolute_uri(&self, inbound: &dyn InboundRequest) -> Url {
        resolve_absolute_uri(inbound)
    }

    /// Whether the body must be buffered before dispatch.
    pub fn should_read_data(&self, inbound: &dyn InboundRequest) -> bool {
        should_read_headers(inbound.method(), inbound.headers())
    }

    /// Adapt a live request, reading its body from the stream if needed.
    pub async fn handle<I: InboundRequest>(&self, mut inbound: I) -> Result<(), AdapterError> {
        let started = Instant::now();
        let mut request = self.container_request(&mut inbound);
        let span = request_span(&request);

        let result = async {
            if self.should_read_data(&inbound) {
                if let Some(stream) = inbound.take_body() {
                    let body = read_body(stream, self.max_body_size).await?;
                    tracing::debug!(bytes = body.len(), "Request body read");
                    metrics::record_body_bytes(body.len());
                    request.set_body(body);
                }
            }
            self.dispatch(&inbound, request).await
        }
        .instrument(span)
        .await;

        record_outcome(inbound.method(), &result, started);
        result
    }

    /// Adapt a request whose body is already in hand. No chunk events are
    /// awaited.
    pub async fn handle_with_body<I: InboundRequest>(
        &self,
        mut inbound: I,
        body: Option<Bytes>,
    ) -> Result<(), AdapterError> {
        let started = Instant::now();
        let mut request = self.container_request(&mut inbound);
        let span = request_span(&request);

        let result = async {
            if let Some(body) = body {
                if body.len() > self.max_body_size {
                    return Err(AdapterError::BodyTooLarge { limit: self.max_body_size });
                }
                metrics::record_body_bytes(body.len());
                request.set_body(body);
            }
            self.dispatch(&inbound, request).await
        }
        .instrument(span)
        .await;

        record_outcome(inbound.method(), &result, started);
        result
    }

    fn container_request(&self, inbound: &mut dyn InboundRequest) -> ContainerRequest {
        let request_uri = self.absolute_uri(inbound);
        let base = base_uri(&request_uri, &self.base_path);

        let mut request = ContainerRequest::new(
            inbound.method().clone(),
            base,
            request_uri,
            inbound.headers().clone(),
        );
        if let Some(id) = inbound.request_id() {
            request.set_request_id(id);
        }
        if let Some(writer) = inbound.take_response_writer() {
            request.set_response_writer(writer);
        }
        request
    }

    async fn dispatch(
        &self,
        inbound: &dyn InboundRequest,
        request: ContainerRequest,
    ) -> Result<(), AdapterError> {
        let request = self.processors.run(inbound, request).await?;
        tracing::debug!("Dispatching to application delegate");
        self.delegate.handle(request);
        Ok(())
    }
}

impl std::fmt::Debug for RequestAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAdapter")
            .field("max_body_size", &self.max_body_size)
            .field("base_path", &self.base_path)
            .field("processors", &self.processors)
            .finish_non_exhaustive()
    }
}

fn request_span(request: &ContainerRequest) -> tracing::Span {
    tracing::debug_span!(
        "adapt",
        method = %request.method(),
        uri = %request.request_uri(),
        request_id = request.request_id().unwrap_or("-"),
    )
}

fn record_outcome(method: &Method, result: &Result<(), AdapterError>, started: Instant) {
    match result {
        Ok(()) => metrics::record_request(method, "dispatched", started),
        Err(e) => {
            tracing::warn!(method = %method, error = %e, "Request adaptation failed");
            metrics::record_rejection(e.kind());
            metrics::record_request(method, e.kind(), started);
        }
    }
}
