//! Pre-dispatch request processors.
//!
//! # Responsibilities
//! - Run processors strictly in order
//! - Let each processor finish synchronously or at any later point
//!
//! # Design Decisions
//! - The container request moves into the processor and comes back
//!   through its [`Completion`], so late completions can still mutate it
//! - The next processor starts only after the previous completion fires
//! - A completion dropped without firing aborts the request; one that is
//!   never fired stalls it (timeouts belong to the caller)

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::adapter::container::ContainerRequest;
use crate::error::AdapterError;
use crate::http::request::InboundRequest;

/// Single-use signal that a processor has finished with the request.
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<ContainerRequest>,
}

impl Completion {
    fn new() -> (Self, oneshot::Receiver<ContainerRequest>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Hand the request back and let the chain advance.
    pub fn complete(self, request: ContainerRequest) {
        let _ = self.tx.send(request);
    }
}

/// A pluggable step that runs before the delegate.
pub trait RequestProcessor: Send + Sync {
    /// Inspect or modify `request`, then call `done.complete(request)`
    /// exactly once, now or later.
    fn process(&self, inbound: &dyn InboundRequest, request: ContainerRequest, done: Completion);

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Ordered list of processors. May be empty.
#[derive(Clone, Default)]
pub struct ProcessorChain {
    processors: Vec<Arc<dyn RequestProcessor>>,
}

impl ProcessorChain {
    pub fn new(processors: Vec<Arc<dyn RequestProcessor>>) -> Self {
        Self { processors }
    }

    /// Pass `request` through every processor in order.
    pub async fn run(
        &self,
        inbound: &dyn InboundRequest,
        mut request: ContainerRequest,
    ) -> Result<ContainerRequest, AdapterError> {
        for (index, processor) in self.processors.iter().enumerate() {
            let (done, signal) = Completion::new();
            processor.process(inbound, request, done);

            request = signal.await.map_err(|_| {
                tracing::error!(index, processor = processor.name(), "Request processor abandoned request");
                AdapterError::ProcessorAbandoned { index }
            })?;

            tracing::trace!(index, processor = processor.name(), "Request processor completed");
        }
        Ok(request)
    }
}

impl std::fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.processors.iter().map(|p| p.name()))
            .finish()
    }
}
