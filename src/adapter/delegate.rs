//! Application delegate.

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::adapter::container::ContainerRequest;

/// Consumer of adapted requests: routing, resource dispatch and response
/// writing all happen behind this call.
pub trait ApplicationDelegate: Send + Sync {
    fn handle(&self, request: ContainerRequest);
}

impl<F> ApplicationDelegate for F
where
    F: Fn(ContainerRequest) + Send + Sync,
{
    fn handle(&self, request: ContainerRequest) {
        self(request)
    }
}

/// Summary of a request, as returned by [`EchoDelegate`].
#[derive(Debug, Serialize)]
pub struct EchoSummary {
    pub method: String,
    pub base_uri: String,
    pub request_uri: String,
    pub request_id: Option<String>,
    pub headers: usize,
    pub body: Option<String>,
}

impl From<&ContainerRequest> for EchoSummary {
    fn from(req: &ContainerRequest) -> Self {
        Self {
            method: req.method().to_string(),
            base_uri: req.base_uri().to_string(),
            request_uri: req.request_uri().to_string(),
            request_id: req.request_id().map(str::to_string),
            headers: req.headers().len(),
            body: req.body().map(|b| String::from_utf8_lossy(b).into_owned()),
        }
    }
}

/// Answers every request with a JSON description of what it received.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoDelegate;

impl ApplicationDelegate for EchoDelegate {
    fn handle(&self, mut request: ContainerRequest) {
        let summary = EchoSummary::from(&request);
        match request.take_response_writer() {
            Some(writer) => {
                if !writer.write((StatusCode::OK, Json(summary))) {
                    tracing::debug!("Client went away before echo response");
                }
            }
            None => tracing::warn!(uri = %request.request_uri(), "No response writer for request"),
        }
    }
}
