//! Parsed Device Events
//!
//! A [`ParsedEvent`] is one decoded message from a device: who sent it and the
//! field values it carried. Events are produced by the protocol layer and
//! delivered to the exporter through the [`crate::bus::EventBus`].
//!
//! # JSON Form
//!
//! Events can also be read as JSON, one object per line:
//!
//! ```json
//! {"device": {"type": "AC300", "sn": "2235000123456"},
//!  "fields": {"ac_input_power": 412.0, "ac_output_on": true, "ac_output_mode": "INVERTER_OUTPUT"}}
//! ```
//!
//! Known fields are decoded according to their kind in [`crate::fields`].
//! Unknown fields are decoded by JSON shape so they survive until the
//! exporter ignores them.

use crate::enums::{EnumType, EnumValue};
use crate::error::{ExporterError, Result};
use crate::fields::{Field, FieldKind, CELL_VOLTAGES, PACK_NUM, PACK_STATUS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Identity of the device that produced an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    #[serde(rename = "type")]
    pub device_type: String,
    pub sn: String,
}

impl DeviceIdentity {
    pub fn new(device_type: impl Into<String>, sn: impl Into<String>) -> Self {
        Self {
            device_type: device_type.into(),
            sn: sn.into(),
        }
    }

    /// Rejects identities with a blank type or serial number
    pub fn validate(&self) -> Result<()> {
        if self.device_type.trim().is_empty() {
            return Err(ExporterError::MalformedEvent(
                "device type is empty".to_string(),
            ));
        }
        if self.sn.trim().is_empty() {
            return Err(ExporterError::MalformedEvent(format!(
                "serial number of {} is empty",
                self.device_type
            )));
        }
        Ok(())
    }
}

/// A typed field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Bool(bool),
    Enum(EnumValue),
    Voltages(Vec<f64>),
    /// String value of a field the registry does not know
    Text(String),
}

impl FieldValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<EnumValue> {
        match self {
            FieldValue::Enum(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_voltages(&self) -> Option<&[f64]> {
        match self {
            FieldValue::Voltages(v) => Some(v),
            _ => None,
        }
    }

    /// Short description of the value's shape, for log messages
    pub fn shape(&self) -> &'static str {
        match self {
            FieldValue::Number(_) => "number",
            FieldValue::Bool(_) => "bool",
            FieldValue::Enum(_) => "enum",
            FieldValue::Voltages(_) => "voltages",
            FieldValue::Text(_) => "text",
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<EnumValue> for FieldValue {
    fn from(value: EnumValue) -> Self {
        FieldValue::Enum(value)
    }
}

impl From<Vec<f64>> for FieldValue {
    fn from(value: Vec<f64>) -> Self {
        FieldValue::Voltages(value)
    }
}

/// One parsed message from a device
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    pub device: DeviceIdentity,
    pub fields: BTreeMap<String, FieldValue>,
}

impl ParsedEvent {
    pub fn new(device: DeviceIdentity) -> Self {
        Self {
            device,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Decodes an event from its JSON form.
    ///
    /// A missing or blank device identity rejects the event. A field whose
    /// value does not fit its kind is dropped with a warning and the rest of
    /// the event is kept.
    pub fn from_json(input: &str) -> Result<Self> {
        let raw: RawEvent = serde_json::from_str(input)?;

        let device = raw.device.ok_or_else(|| {
            ExporterError::MalformedEvent("missing device identity".to_string())
        })?;
        device.validate()?;

        let mut fields = BTreeMap::new();
        for (name, value) in raw.fields {
            match decode_field(&name, value) {
                Ok(Some(decoded)) => {
                    fields.insert(name, decoded);
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping field from {}: {}", device.sn, e),
            }
        }

        Ok(Self { device, fields })
    }
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    device: Option<DeviceIdentity>,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

fn decode_field(name: &str, value: Value) -> Result<Option<FieldValue>> {
    if let Some(field) = Field::from_name(name) {
        return decode_kind(name, field.kind(), value).map(Some);
    }

    match name {
        PACK_NUM => decode_kind(name, FieldKind::Numeric, value).map(Some),
        PACK_STATUS => {
            decode_kind(name, FieldKind::Enum(EnumType::BatteryState), value).map(Some)
        }
        CELL_VOLTAGES => decode_voltages(name, &value).map(Some),
        _ => Ok(decode_by_shape(value)),
    }
}

fn decode_kind(name: &str, kind: FieldKind, value: Value) -> Result<FieldValue> {
    let decoded = match kind {
        FieldKind::Numeric => value.as_f64().map(FieldValue::Number),
        FieldKind::Boolean | FieldKind::Button => value.as_bool().map(FieldValue::Bool),
        FieldKind::Enum(enum_type) => match value.as_str() {
            Some(symbol) => {
                let member = enum_type.parse(symbol).map_err(|e| ExporterError::Decode {
                    field: name.to_string(),
                    reason: e.to_string(),
                })?;
                Some(FieldValue::Enum(member))
            }
            None => None,
        },
    };

    decoded.ok_or_else(|| ExporterError::Decode {
        field: name.to_string(),
        reason: format!("unexpected JSON value {} for {:?} field", value, kind),
    })
}

fn decode_voltages(name: &str, value: &Value) -> Result<FieldValue> {
    let invalid = || ExporterError::Decode {
        field: name.to_string(),
        reason: format!("expected an array of numbers, got {}", value),
    };

    let items = value.as_array().ok_or_else(invalid)?;
    let voltages = items
        .iter()
        .map(Value::as_f64)
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(invalid)?;

    Ok(FieldValue::Voltages(voltages))
}

fn decode_by_shape(value: Value) -> Option<FieldValue> {
    match value {
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::Bool(b) => Some(FieldValue::Bool(b)),
        Value::String(s) => Some(FieldValue::Text(s)),
        Value::Array(items) => items
            .iter()
            .map(Value::as_f64)
            .collect::<Option<Vec<f64>>>()
            .map(FieldValue::Voltages),
        Value::Null | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{BatteryState, OutputMode};

    #[test]
    fn test_decode_known_fields() {
        let event = ParsedEvent::from_json(
            r#"{"device": {"type": "AC300", "sn": "2235000123456"},
                "fields": {"ac_input_power": 412, "ac_output_on": true,
                           "ac_output_mode": "INVERTER_OUTPUT"}}"#,
        )
        .unwrap();

        assert_eq!(event.device, DeviceIdentity::new("AC300", "2235000123456"));
        assert_eq!(event.get("ac_input_power"), Some(&FieldValue::Number(412.0)));
        assert_eq!(event.get("ac_output_on"), Some(&FieldValue::Bool(true)));
        assert_eq!(
            event.get("ac_output_mode"),
            Some(&FieldValue::Enum(EnumValue::OutputMode(
                OutputMode::InverterOutput
            )))
        );
    }

    #[test]
    fn test_decode_pack_fields() {
        let event = ParsedEvent::from_json(
            r#"{"device": {"type": "AC300", "sn": "1"},
                "fields": {"pack_num": 2, "pack_status": "CHARGE",
                           "cell_voltages": [3.31, 3.32]}}"#,
        )
        .unwrap();

        assert_eq!(event.get(PACK_NUM), Some(&FieldValue::Number(2.0)));
        assert_eq!(
            event.get(PACK_STATUS).and_then(FieldValue::as_enum),
            Some(EnumValue::BatteryState(BatteryState::Charge))
        );
        assert_eq!(
            event.get(CELL_VOLTAGES).and_then(FieldValue::as_voltages),
            Some(&[3.31, 3.32][..])
        );
    }

    #[test]
    fn test_unknown_fields_decode_by_shape() {
        let event = ParsedEvent::from_json(
            r#"{"device": {"type": "EB3A", "sn": "9"},
                "fields": {"firmware": "4.02", "nested": {"a": 1}, "missing": null}}"#,
        )
        .unwrap();

        assert_eq!(
            event.get("firmware"),
            Some(&FieldValue::Text("4.02".to_string()))
        );
        assert!(!event.contains("nested"));
        assert!(!event.contains("missing"));
    }

    #[test]
    fn test_missing_identity_is_malformed() {
        let err = ParsedEvent::from_json(r#"{"fields": {}}"#).unwrap_err();
        assert!(matches!(err, ExporterError::MalformedEvent(_)));

        let err =
            ParsedEvent::from_json(r#"{"device": {"type": "AC300", "sn": " "}}"#).unwrap_err();
        assert!(matches!(err, ExporterError::MalformedEvent(_)));
    }

    #[test]
    fn test_wrong_shape_for_known_field() {
        let err = decode_field("ac_output_on", Value::String("yes".to_string())).unwrap_err();
        assert!(matches!(err, ExporterError::Decode { ref field, .. } if field == "ac_output_on"));

        let err = decode_field("led_mode", Value::String("DISCO".to_string())).unwrap_err();
        assert!(err.to_string().contains("led_mode"));
    }

    #[test]
    fn test_bad_field_is_dropped_rest_is_kept() {
        let event = ParsedEvent::from_json(
            r#"{"device": {"type": "AC300", "sn": "1"},
                "fields": {"ac_output_on": "yes", "led_mode": "DISCO",
                           "ac_input_power": 250}}"#,
        )
        .expect("event with a bad field should still decode");

        assert!(!event.contains("ac_output_on"));
        assert!(!event.contains("led_mode"));
        assert_eq!(event.get("ac_input_power"), Some(&FieldValue::Number(250.0)));
    }

    #[test]
    fn test_builder() {
        let event = ParsedEvent::new(DeviceIdentity::new("AC200M", "42"))
            .with_field("pack_num", 3)
            .with_field("pack_voltage", 52.1);
        assert_eq!(event.get("pack_num").and_then(FieldValue::as_number), Some(3.0));
        assert!(event.contains("pack_voltage"));
    }
}
