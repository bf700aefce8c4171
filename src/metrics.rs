//! Prometheus Metrics Definitions
//!
//! This module owns the Prometheus registry and one instrument per entry of the
//! field registry in [`crate::fields`].
//!
//! # Instruments
//!
//! - **Gauge**: one per unlabeled field, named `bluetti_<field>`
//! - **GaugeVec**: one per pack field, labeled by `pack_num`
//!   (`bluetti_pack_voltage`, `bluetti_pack_battery_percent`)
//! - **device_info**: info record labeled `device` and `sn`, always 1,
//!   holding only the most recently seen device
//!
//! Instruments are created once in [`MetricsCollector::new`] and are never
//! removed; updates overwrite the last value.

use crate::error::{ExporterError, Result};
use crate::event::DeviceIdentity;
use crate::fields::{self, Field, NAMESPACE};
use parking_lot::Mutex;
use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Metrics collector for Bluetti devices
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,

    // Field instruments
    gauges: Arc<BTreeMap<Field, Gauge>>,
    families: Arc<BTreeMap<Field, GaugeVec>>,

    // Device identity
    pub device_info: Arc<GaugeVec>,
    last_device: Arc<Mutex<Option<DeviceIdentity>>>,
}

impl MetricsCollector {
    /// Builds and registers every instrument.
    ///
    /// Fails when the field table is inconsistent or an instrument cannot be
    /// registered, so a broken table stops the exporter at startup.
    pub fn new() -> Result<Self> {
        fields::validate_table()?;

        let registry = Registry::new();
        let mut gauges = BTreeMap::new();
        let mut families = BTreeMap::new();

        for field in Field::ALL {
            let opts = Opts::new(field.name(), field.help()).namespace(NAMESPACE);

            match field.dimension() {
                None => {
                    let gauge = Gauge::with_opts(opts)?;
                    registry.register(Box::new(gauge.clone()))?;
                    gauges.insert(*field, gauge);
                }
                Some(dimension) => {
                    let family = GaugeVec::new(opts, &[dimension.label()])?;
                    registry.register(Box::new(family.clone()))?;
                    families.insert(*field, family);
                }
            }
        }

        if gauges.len() + families.len() != Field::ALL.len() {
            return Err(ExporterError::FieldTable(format!(
                "{} fields but {} instruments",
                Field::ALL.len(),
                gauges.len() + families.len()
            )));
        }

        let device_info = GaugeVec::new(
            Opts::new("device_info", "Info about the device"),
            &["device", "sn"],
        )?;
        registry.register(Box::new(device_info.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            gauges: Arc::new(gauges),
            families: Arc::new(families),
            device_info: Arc::new(device_info),
            last_device: Arc::new(Mutex::new(None)),
        })
    }

    /// Gauge of an unlabeled field
    pub fn gauge(&self, field: Field) -> Option<&Gauge> {
        self.gauges.get(&field)
    }

    /// Gauge family of a labeled field
    pub fn family(&self, field: Field) -> Option<&GaugeVec> {
        self.families.get(&field)
    }

    /// Replaces the device info record with `device`.
    ///
    /// The new series is set before the previous one is removed, so a
    /// concurrent scrape always sees at least one `device_info` series.
    pub fn set_device_info(&self, device: &DeviceIdentity) {
        let mut last_device = self.last_device.lock();

        self.device_info
            .with_label_values(&[device.device_type.as_str(), device.sn.as_str()])
            .set(1.0);

        if let Some(previous) = last_device.as_ref() {
            if previous != device {
                let _ = self.device_info.remove_label_values(&[
                    previous.device_type.as_str(),
                    previous.sn.as_str(),
                ]);
            }
        }

        *last_device = Some(device.clone());
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| ExporterError::Server(format!("metrics output is not UTF-8: {}", e)))
    }
}
