//! HTTP server hosting the request adapter.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (request ID, tracing, timeout)
//! - Wrap each request as an inbound request and adapt it
//! - Wait for the delegate's response, or map the adapter error

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::adapter::RequestAdapter;
use crate::config::BridgeConfig;
use crate::http::request::{request_id_layers, AxumInbound};
use crate::http::response::response_channel;
use crate::lifecycle::shutdown::wait_for;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<RequestAdapter>,
}

/// HTTP server for the bridge.
pub struct HttpServer {
    router: Router,
    config: BridgeConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and adapter.
    pub fn new(config: BridgeConfig, adapter: Arc<RequestAdapter>) -> Self {
        let router = Self::build_router(&config, AppState { adapter });
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BridgeConfig, state: AppState) -> Router {
        let (set_request_id, propagate_request_id) = request_id_layers();
        Router::new()
            .fallback(bridge_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id)
                    .layer(TraceLayer::new_for_http())
                    .layer(propagate_request_id)
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            max_body_size = self.config.adapter.max_body_size,
            base_path = %self.config.adapter.base_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Adapt the request and answer with whatever the delegate writes.
async fn bridge_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (writer, pending) = response_channel();
    let inbound = AxumInbound::new(request, writer);

    match state.adapter.handle(inbound).await {
        Ok(()) => pending.wait().await,
        Err(e) => e.into_response(),
    }
}
