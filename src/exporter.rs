//! Event to Metric Mapping
//!
//! [`MetricsExporter`] turns each [`ParsedEvent`] into metric updates:
//!
//! 1. The device info record is replaced with the event's device identity.
//! 2. Every field known to the registry is mapped according to its kind.
//!    Only numeric, unlabeled fields are written to their gauge.
//! 3. Pack fields are written to the `pack_num`-labeled families.
//! 4. Internal DC input fields are written with their own values.
//!
//! Fields the registry does not know are ignored, so newer devices reporting
//! extra fields do not disturb the exporter.
//!
//! # Known Gap
//!
//! Boolean, Button and Enum fields are mapped to `ON`/`OFF` or to the enum
//! member's symbolic name, but the result is never written: their gauges are
//! registered and stay at 0 forever. Exporting them needs a decision on the
//! numeric encoding from the dashboard owners before it is changed.

use crate::bus::EventBus;
use crate::error::Result;
use crate::event::{FieldValue, ParsedEvent};
use crate::fields::{Field, FieldKind, CELL_VOLTAGES, DC_INPUT_FIELDS, PACK_NUM, PACK_STATUS};
use crate::metrics::MetricsCollector;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Value of a field after kind-specific mapping
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Number(f64),
    /// `ON` or `OFF`
    State(&'static str),
    /// Symbolic name of an enum member
    Name(&'static str),
}

/// Maps a value according to the field's kind.
///
/// Returns `None` when the value's shape does not match the kind.
pub fn map_value(field: Field, value: &FieldValue) -> Option<Payload> {
    match field.kind() {
        FieldKind::Numeric => value.as_number().map(Payload::Number),
        FieldKind::Boolean | FieldKind::Button => value
            .as_bool()
            .map(|on| Payload::State(if on { "ON" } else { "OFF" })),
        FieldKind::Enum(_) => value.as_enum().map(|member| Payload::Name(member.name())),
    }
}

/// Battery pack details carried by a pack-scoped event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackDetails {
    pub status: Option<&'static str>,
    pub percent: Option<f64>,
    pub voltage: Option<f64>,
    pub voltages: Option<Vec<f64>>,
}

impl PackDetails {
    pub fn from_event(event: &ParsedEvent) -> Self {
        Self {
            status: event
                .get(PACK_STATUS)
                .and_then(FieldValue::as_enum)
                .map(|s| s.name()),
            percent: event
                .get(Field::PackBatteryPercent.name())
                .and_then(FieldValue::as_number),
            voltage: event
                .get(Field::PackVoltage.name())
                .and_then(FieldValue::as_number),
            voltages: event
                .get(CELL_VOLTAGES)
                .and_then(FieldValue::as_voltages)
                .map(<[f64]>::to_vec),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.percent.is_none()
            && self.voltage.is_none()
            && self.voltages.is_none()
    }
}

/// Label value for a pack index, `2.0` renders as `"2"`
pub fn pack_label(pack_num: f64) -> String {
    pack_num.to_string()
}

/// Maps parsed device events onto the metrics registry
#[derive(Clone)]
pub struct MetricsExporter {
    metrics: MetricsCollector,
}

impl MetricsExporter {
    pub fn new(metrics: MetricsCollector) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Applies one event to the registry.
    ///
    /// Events whose device identity is blank are rejected before any
    /// instrument is touched.
    pub fn on_event(&self, event: &ParsedEvent) -> Result<()> {
        event.device.validate()?;

        debug!(
            "Got a message from {} {}: {} fields",
            event.device.device_type,
            event.device.sn,
            event.fields.len()
        );

        self.metrics.set_device_info(&event.device);

        for (name, value) in &event.fields {
            let Some(field) = Field::from_name(name) else {
                continue;
            };

            let Some(payload) = map_value(field, value) else {
                warn!(
                    "Ignoring {} from {}: expected {:?}, got {}",
                    name,
                    event.device.sn,
                    field.kind(),
                    value.shape()
                );
                continue;
            };

            // Known gap: State and Name payloads stop here (see module docs)
            if field.kind() != FieldKind::Numeric {
                continue;
            }
            if let (Payload::Number(v), Some(gauge)) = (payload, self.metrics.gauge(field)) {
                gauge.set(v);
            }
        }

        self.publish_pack(event);
        self.publish_dc_input(event);

        Ok(())
    }

    fn publish_pack(&self, event: &ParsedEvent) {
        let Some(pack_num) = event.get(PACK_NUM) else {
            return;
        };
        let details = PackDetails::from_event(event);
        if details.is_empty() {
            return;
        }

        let Some(pack_num) = pack_num.as_number() else {
            warn!(
                "Ignoring pack data from {}: pack_num is {}",
                event.device.sn,
                pack_num.shape()
            );
            return;
        };
        let label = pack_label(pack_num);

        if let (Some(percent), Some(family)) =
            (details.percent, self.metrics.family(Field::PackBatteryPercent))
        {
            family.with_label_values(&[label.as_str()]).set(percent);
        }
        if let (Some(voltage), Some(family)) =
            (details.voltage, self.metrics.family(Field::PackVoltage))
        {
            family.with_label_values(&[label.as_str()]).set(voltage);
        }

        debug!(
            "Pack {} of {}: status={:?} cells={}",
            label,
            event.device.sn,
            details.status,
            details.voltages.as_ref().map_or(0, Vec::len)
        );
    }

    fn publish_dc_input(&self, event: &ParsedEvent) {
        for field in DC_INPUT_FIELDS {
            let value = event.get(field.name()).and_then(FieldValue::as_number);
            if let (Some(value), Some(gauge)) = (value, self.metrics.gauge(field)) {
                gauge.set(value);
            }
        }
    }

    /// Registers the exporter on `bus` and handles events until the bus closes
    pub fn listen(self, bus: &EventBus) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        info!("Exporter registered as event listener");

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let Err(e) = self.on_event(&event) {
                            warn!("Rejected event: {}", e);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Exporter fell behind, skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => {
                        info!("Event bus closed, stopping listener");
                        break;
                    }
                }
            }
        })
    }
}
