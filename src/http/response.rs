//! Response delivery from the delegate back to the network layer.
//!
//! # Responsibilities
//! - Give the delegate a single-use writer for its response
//! - Map adapter failures to HTTP status codes
//!
//! # Design Decisions
//! - The writer is a oneshot channel; the server awaits the other end
//! - A delegate that drops the writer without answering yields 500

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tokio::sync::oneshot;

use crate::error::AdapterError;

/// Single-use handle the delegate writes its response through.
#[derive(Debug)]
pub struct ResponseWriter {
    tx: oneshot::Sender<Response<Body>>,
}

impl ResponseWriter {
    /// Send the response. Returns false if the network side has gone away.
    pub fn write(self, response: impl IntoResponse) -> bool {
        self.tx.send(response.into_response()).is_ok()
    }
}

/// The network layer's end of a [`ResponseWriter`].
#[derive(Debug)]
pub struct PendingResponse {
    rx: oneshot::Receiver<Response<Body>>,
}

impl PendingResponse {
    /// Wait for the delegate's response.
    pub async fn wait(self) -> Response<Body> {
        match self.rx.await {
            Ok(response) => response,
            Err(_) => {
                tracing::error!("Delegate dropped the response writer without answering");
                (StatusCode::INTERNAL_SERVER_ERROR, "No response written").into_response()
            }
        }
    }
}

/// Create a connected writer / pending-response pair.
pub fn response_channel() -> (ResponseWriter, PendingResponse) {
    let (tx, rx) = oneshot::channel();
    (ResponseWriter { tx }, PendingResponse { rx })
}

impl AdapterError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdapterError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AdapterError::Body(_) => StatusCode::BAD_REQUEST,
            AdapterError::ProcessorAbandoned { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdapterError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
