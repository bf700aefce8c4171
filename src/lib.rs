//! Bluetti Prometheus Exporter
//!
//! Exposes telemetry from Bluetti power stations as Prometheus metrics.
//!
//! # Overview
//!
//! Protocol parsers publish decoded device messages on an in-process event
//! bus. The exporter listens on the bus, maps the known fields of every message
//! onto Prometheus gauges and serves them for scraping.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐   ParsedEvent    ┌──────────────┐
//! │  Protocol   │ ───────────────► │  Event Bus   │
//! │   parser    │  (or JSON lines) └──────┬───────┘
//! └─────────────┘                         │
//!                                  ┌──────▼───────┐
//!                                  │   Exporter   │
//!                                  │  ┌────────┐  │      HTTP      ┌────────────┐
//!                                  │  │Metrics │  │ ◄────────────► │ Prometheus │
//!                                  │  └────────┘  │   /metrics     └────────────┘
//!                                  └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`fields`] - Static registry of exported fields
//! - [`enums`] - Device enumerations and their symbolic names
//! - [`event`] - Parsed event types and JSON decoding
//! - [`metrics`] - Prometheus metric definitions
//! - [`exporter`] - Event to metric mapping
//! - [`bus`] - In-process event bus
//! - [`ingest`] - Line-delimited JSON input
//! - [`server`] - HTTP server and bootstrap
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use bluetti_exporter::{bus::EventBus, config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     let bus = EventBus::new(config.bus.capacity);
//!     server::start(&config.server, &bus).await?.run().await?;
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod config;
pub mod enums;
pub mod error;
pub mod event;
pub mod exporter;
pub mod fields;
pub mod ingest;
pub mod metrics;
pub mod server;
