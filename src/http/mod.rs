//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → request.rs (AxumInbound: InboundRequest over the axum request)
//!     → adapter (ContainerRequest → delegate)
//!     → response.rs (delegate writes through ResponseWriter)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{AxumInbound, BodyStream, InboundRequest, X_REQUEST_ID};
pub use response::{response_channel, PendingResponse, ResponseWriter};
pub use server::HttpServer;
