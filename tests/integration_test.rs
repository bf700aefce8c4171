use bluetti_exporter::config::Config;

#[test]
fn test_config_load() {
    // This assumes config/Default.toml exists relative to where cargo test is run
    let config_res = Config::load("config/Default.toml");
    assert!(config_res.is_ok(), "Failed to load default config");

    let config = config_res.unwrap();
    assert_eq!(config.server.port, 9219);
    assert!(!config.ingest.stdin);
}

#[test]
fn test_config_load_without_file_uses_defaults() {
    // Given: A path that does not exist (the file source is optional)
    let config = Config::load("config/does-not-exist").expect("defaults should load");

    // Then: Built-in defaults apply
    assert_eq!(config.server.addr, "0.0.0.0");
    assert_eq!(config.server.port, 9219);
    assert_eq!(config.bus.capacity, 1024);
}
