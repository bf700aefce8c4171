use bluetti_exporter::event::DeviceIdentity;
use bluetti_exporter::fields::Field;
use bluetti_exporter::metrics::MetricsCollector;

#[test]
fn test_metrics_registration() {
    // Verify that all metrics can be created and registered without panicking
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");

    // Test that we can render metrics (even if empty)
    let rendered = metrics.render();
    assert!(rendered.is_ok(), "Failed to render metrics");

    // Scalar gauges always appear; labeled families only once they have values
    let output = rendered.unwrap();
    for field in Field::ALL {
        let name = field.metric_name();
        if field.dimension().is_none() {
            assert!(output.contains(&name), "Missing {} metric", name);
        } else {
            assert!(!output.contains(&name), "{} rendered before any value", name);
        }
    }
    assert!(!output.contains("device_info"));
}

#[test]
fn test_every_field_has_an_instrument() {
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");

    for field in Field::ALL {
        match field.dimension() {
            None => assert!(metrics.gauge(*field).is_some(), "{:?}", field),
            Some(_) => assert!(metrics.family(*field).is_some(), "{:?}", field),
        }
    }
}

#[test]
fn test_metrics_update() {
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");

    // Test updating a simple gauge
    metrics.gauge(Field::AcInputPower).unwrap().set(412.0);

    // Test updating a labeled metric
    metrics
        .family(Field::PackVoltage)
        .unwrap()
        .with_label_values(&["1"])
        .set(52.3);

    let rendered = metrics.render().unwrap();
    assert!(
        rendered.contains("bluetti_ac_input_power 412"),
        "ac_input_power not set correctly"
    );
    assert!(
        rendered.contains("bluetti_pack_voltage{pack_num=\"1\"} 52.3"),
        "pack label not found"
    );
}

#[test]
fn test_device_info_keeps_latest_identity() {
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");

    metrics.set_device_info(&DeviceIdentity::new("AC300", "1111"));
    metrics.set_device_info(&DeviceIdentity::new("EB3A", "2222"));

    let rendered = metrics.render().unwrap();
    assert!(rendered.contains("device_info{device=\"EB3A\",sn=\"2222\"} 1"));
    assert!(!rendered.contains("1111"));
}

#[test]
fn test_device_info_never_missing_during_concurrent_scrapes() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    // Given: A collector that already knows a device
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");
    metrics.set_device_info(&DeviceIdentity::new("AC300", "1111"));
    let stop = Arc::new(AtomicBool::new(false));

    // When: Another thread keeps switching between two identities
    let writer = {
        let metrics = metrics.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            let devices = [
                DeviceIdentity::new("AC300", "1111"),
                DeviceIdentity::new("EB3A", "2222"),
            ];
            let mut i = 0usize;
            while !stop.load(Ordering::Relaxed) {
                metrics.set_device_info(&devices[i % 2]);
                i += 1;
            }
        })
    };

    // Then: Every scrape contains a device_info series
    let mut missing = 0;
    for _ in 0..5_000 {
        let rendered = metrics.render().unwrap();
        if !rendered.contains("device_info{") {
            missing += 1;
        }
    }
    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();

    assert_eq!(missing, 0, "scrapes without device_info: {}", missing);
}

#[test]
fn test_same_device_keeps_single_series() {
    let metrics = MetricsCollector::new().expect("Failed to create metrics collector");

    metrics.set_device_info(&DeviceIdentity::new("AC300", "1111"));
    metrics.set_device_info(&DeviceIdentity::new("AC300", "1111"));

    let rendered = metrics.render().unwrap();
    assert_eq!(rendered.matches("device_info{").count(), 1);
}
