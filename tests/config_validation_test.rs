//! Configuration validation tests
//!
//! Tests that verify configuration defaults and structure.

use bluetti_exporter::config::{BusConfig, Config, IngestConfig, ServerConfig};
use bluetti_exporter::error::ExporterError;

#[test]
fn test_default_server_config() {
    // Given: ServerConfig with default values
    let config = ServerConfig::default();

    // Then: Should listen on all interfaces on the exporter's registered port
    assert_eq!(config.addr, "0.0.0.0");
    assert_eq!(config.port, 9219);
}

#[test]
fn test_default_config_is_valid() {
    // Given: A fully defaulted configuration
    let config = Config::default();

    // Then: It passes validation and stdin ingestion is off
    assert!(config.validate().is_ok());
    assert!(!config.ingest.stdin);
    assert_eq!(config.bus.capacity, 1024);
}

#[test]
fn test_zero_port_is_rejected() {
    // Given: A configuration with port 0
    let config = Config {
        server: ServerConfig {
            addr: "127.0.0.1".to_string(),
            port: 0,
        },
        ..Config::default()
    };

    // When: Validating
    let err = config.validate().unwrap_err();

    // Then: A configuration error names the key
    assert!(matches!(err, ExporterError::Config(_)));
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_zero_bus_capacity_is_rejected() {
    // Given: A configuration with an unbuffered bus
    let config = Config {
        bus: BusConfig { capacity: 0 },
        ingest: IngestConfig { stdin: true },
        ..Config::default()
    };

    // When: Validating
    let err = config.validate().unwrap_err();

    // Then: A configuration error names the key
    assert!(err.to_string().contains("bus.capacity"));
}

#[test]
fn test_server_config_construction() {
    // Given: Manual ServerConfig construction
    let config = ServerConfig {
        addr: "127.0.0.1".to_string(),
        port: 8080,
    };

    // Then: Values should be set correctly
    assert_eq!(config.addr, "127.0.0.1");
    assert_eq!(config.port, 8080);
}

#[test]
fn test_environment_overrides_defaults() {
    // Given: A port set through the environment layer
    std::env::set_var("BLUETTI_EXPORTER__SERVER__PORT", "9300");

    // When: Loading without a config file
    let config = Config::load("config/does-not-exist").expect("config should load");
    std::env::remove_var("BLUETTI_EXPORTER__SERVER__PORT");

    // Then: The environment value wins, other keys keep their defaults
    assert_eq!(config.server.port, 9300);
    assert_eq!(config.server.addr, "0.0.0.0");
    assert_eq!(config.bus.capacity, 1024);
}
