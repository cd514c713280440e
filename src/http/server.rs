//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the faucet handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Drain in-flight requests on shutdown

use axum::{body::Body, http::Request, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::TimeoutConfig;
use crate::faucet::{BalanceQuery, DispensePipeline};
use crate::http::handlers;
use crate::http::request::{request_id_of, UuidRequestId};
use crate::lifecycle::FaucetServices;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DispensePipeline>,
    pub balances: Arc<BalanceQuery>,
}

impl From<&FaucetServices> for AppState {
    fn from(services: &FaucetServices) -> Self {
        Self {
            pipeline: services.pipeline.clone(),
            balances: services.balances.clone(),
        }
    }
}

/// HTTP front end of the faucet.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(timeouts: &TimeoutConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(timeouts, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(timeouts: &TimeoutConfig, state: AppState) -> Router {
        Router::new()
            .route("/faucet", get(handlers::faucet))
            .route("/balance", get(handlers::balance))
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |request: &Request<Body>| {
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = %request_id_of(request),
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(timeouts.request_secs))),
            )
    }

    /// Serve on `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
