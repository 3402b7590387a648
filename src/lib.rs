//! Request bridge library: adapts inbound HTTP requests into container
//! requests for an application delegate.

pub mod adapter;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use adapter::{ApplicationDelegate, ContainerRequest, RequestAdapter};
pub use config::schema::BridgeConfig;
pub use error::AdapterError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
