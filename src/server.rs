//! HTTP Server and Exporter Bootstrap
//!
//! This module implements the Prometheus scrape endpoint and wires the exporter
//! to the event bus.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server exposing `/metrics`, `/health`, and `/` endpoints
//! - **Event Listener**: Background task that applies every bus event to the registry
//! - **State Management**: The metrics collector is shared by cloning its `Arc`s
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /health` - Liveness check, always 200 while the process serves
//!
//! Scrapes only read the registry; they never wait on event handling.

use crate::bus::EventBus;
use crate::config::ServerConfig;
use crate::error::{ExporterError, Result};
use crate::exporter::MetricsExporter;
use crate::metrics::MetricsCollector;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Clone)]
struct AppState {
    metrics: MetricsCollector,
}

/// Builds the scrape router over `metrics`
pub fn router(metrics: MetricsCollector) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(AppState { metrics })
}

/// Binds the scrape listener on `addr:port`
pub async fn bind(config: &ServerConfig) -> Result<TcpListener> {
    let addr = format!("{}:{}", config.addr, config.port);
    TcpListener::bind(&addr)
        .await
        .map_err(|e| ExporterError::Server(format!("failed to bind {}: {}", addr, e)))
}

/// Starts the exporter: binds the HTTP listener and registers the event
/// listener on `bus`.
///
/// A bind failure is returned before anything is registered. Scrapes are
/// served once the returned [`RunningExporter`] is run, so callers can attach
/// event producers in between without losing events.
pub async fn start(config: &ServerConfig, bus: &EventBus) -> Result<RunningExporter> {
    let metrics = MetricsCollector::new()?;
    let listener = bind(config).await?;

    info!("Starting Prometheus exporter on port {}...", config.port);
    let listener_task = MetricsExporter::new(metrics.clone()).listen(bus);

    Ok(RunningExporter {
        listener,
        metrics,
        listener_task,
    })
}

/// A bound, registered exporter that has not started serving yet
pub struct RunningExporter {
    listener: TcpListener,
    metrics: MetricsCollector,
    listener_task: JoinHandle<()>,
}

impl RunningExporter {
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves scrapes until the HTTP server fails or the event listener stops.
    ///
    /// A stopped listener is an error: the gauges would go stale silently.
    pub async fn run(self) -> Result<()> {
        let RunningExporter {
            listener,
            metrics,
            mut listener_task,
        } = self;

        let served = tokio::select! {
            result = serve(listener, metrics) => Some(result),
            joined = &mut listener_task => {
                match joined {
                    Ok(()) => error!("Event listener stopped"),
                    Err(e) => error!("Event listener failed: {}", e),
                }
                None
            }
        };

        match served {
            Some(result) => {
                listener_task.abort();
                result
            }
            None => Err(ExporterError::Server(
                "event listener stopped, metrics would go stale".to_string(),
            )),
        }
    }
}

/// Serves scrapes of `metrics` on an already bound listener
pub async fn serve(listener: TcpListener, metrics: MetricsCollector) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, router(metrics))
        .await
        .map_err(|e| ExporterError::Server(e.to_string()))
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>Bluetti Exporter</title></head>
<body>
<h1>Bluetti Prometheus Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(metrics) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], metrics).into_response()
        }
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
