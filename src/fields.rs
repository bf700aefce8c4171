//! Field Registry
//!
//! The closed set of device fields this exporter publishes. Each field has a
//! stable name (the metric is exported as `bluetti_<name>`), a semantic kind
//! that decides how incoming values are interpreted, and an optional label
//! dimension for fields reported once per battery pack.
//!
//! # Field Kinds
//!
//! - **Numeric**: measured value, exported as a gauge
//! - **Boolean**: on/off switch state
//! - **Enum**: member of one of the device enums in [`crate::enums`]
//! - **Button**: write-only control, reported as on/off
//!
//! # Pack Fields
//!
//! `pack_voltage` and `pack_battery_percent` arrive alongside `pack_num` and
//! are exported as gauge families labeled by pack index. The auxiliary names
//! [`PACK_NUM`], [`PACK_STATUS`] and [`CELL_VOLTAGES`] travel with them but
//! have no instrument of their own.

use crate::enums::EnumType;
use crate::error::{ExporterError, Result};
use std::collections::HashSet;

/// Metric namespace prepended to every field name
pub const NAMESPACE: &str = "bluetti";

/// Index of the battery pack a pack-scoped event describes
pub const PACK_NUM: &str = "pack_num";
/// Charge state of the reported pack
pub const PACK_STATUS: &str = "pack_status";
/// Per-cell voltages of the reported pack
pub const CELL_VOLTAGES: &str = "cell_voltages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Numeric,
    Boolean,
    Enum(EnumType),
    Button,
}

/// Label dimension of a field exported as a gauge family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    PackNum,
}

impl Dimension {
    pub fn label(self) -> &'static str {
        match self {
            Dimension::PackNum => PACK_NUM,
        }
    }
}

macro_rules! field_table {
    ($($variant:ident => $name:literal, $kind:expr, $dim:expr, $help:literal;)+) => {
        /// A field exported by the exporter
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Field {
            $($variant),+
        }

        impl Field {
            /// Every exported field, in registration order
            pub const ALL: &'static [Field] = &[$(Field::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Field::$variant => $name),+
                }
            }

            pub fn kind(self) -> FieldKind {
                match self {
                    $(Field::$variant => $kind),+
                }
            }

            pub fn dimension(self) -> Option<Dimension> {
                match self {
                    $(Field::$variant => $dim),+
                }
            }

            pub fn help(self) -> &'static str {
                match self {
                    $(Field::$variant => $help),+
                }
            }

            /// Looks up a field by its wire name
            pub fn from_name(name: &str) -> Option<Field> {
                match name {
                    $($name => Some(Field::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

use Dimension::PackNum;
use FieldKind::{Boolean, Button, Numeric};

field_table! {
    DcInputPower => "dc_input_power", Numeric, None, "DC input power";
    AcInputPower => "ac_input_power", Numeric, None, "AC input power";
    AcOutputPower => "ac_output_power", Numeric, None, "AC output power";
    DcOutputPower => "dc_output_power", Numeric, None, "DC output power";
    PowerGeneration => "power_generation", Numeric, None, "Power generation";
    TotalBatteryPercent => "total_battery_percent", Numeric, None, "Total battery percent";
    AcOutputOn => "ac_output_on", Boolean, None, "AC output on";
    DcOutputOn => "dc_output_on", Boolean, None, "DC output on";
    AcOutputMode => "ac_output_mode", FieldKind::Enum(EnumType::OutputMode), None, "AC output mode";
    InternalAcVoltage => "internal_ac_voltage", Numeric, None, "Internal AC voltage";
    InternalCurrentOne => "internal_current_one", Numeric, None, "Internal current one";
    InternalPowerOne => "internal_power_one", Numeric, None, "Internal power one";
    InternalAcFrequency => "internal_ac_frequency", Numeric, None, "Internal AC frequency";
    InternalCurrentTwo => "internal_current_two", Numeric, None, "Internal current two";
    InternalPowerTwo => "internal_power_two", Numeric, None, "Internal power two";
    AcInputVoltage => "ac_input_voltage", Numeric, None, "AC input voltage";
    InternalCurrentThree => "internal_current_three", Numeric, None, "Internal current three";
    InternalPowerThree => "internal_power_three", Numeric, None, "Internal power three";
    AcInputFrequency => "ac_input_frequency", Numeric, None, "AC input frequency";
    TotalBatteryVoltage => "total_battery_voltage", Numeric, None, "Total battery voltage";
    TotalBatteryCurrent => "total_battery_current", Numeric, None, "Total battery current";
    UpsMode => "ups_mode", FieldKind::Enum(EnumType::UpsMode), None, "UPS mode";
    SplitPhaseOn => "split_phase_on", Boolean, None, "Split phase on";
    SplitPhaseMachineMode => "split_phase_machine_mode", FieldKind::Enum(EnumType::MachineAddress), None, "Split phase machine mode";
    GridChargeOn => "grid_charge_on", Boolean, None, "Grid charge on";
    TimeControlOn => "time_control_on", Boolean, None, "Time control on";
    BatteryRangeStart => "battery_range_start", Numeric, None, "Battery range start";
    BatteryRangeEnd => "battery_range_end", Numeric, None, "Battery range end";
    MaxGridChargeCurrent => "max_grid_charge_current", Numeric, None, "Max grid charge current";
    LedMode => "led_mode", FieldKind::Enum(EnumType::LedMode), None, "LED mode";
    PowerOff => "power_off", Button, None, "Power off";
    AutoSleepMode => "auto_sleep_mode", FieldKind::Enum(EnumType::AutoSleepMode), None, "Auto sleep mode";
    EcoOn => "eco_on", Boolean, None, "Eco on";
    EcoShutdown => "eco_shutdown", FieldKind::Enum(EnumType::EcoShutdown), None, "Eco shutdown";
    ChargingMode => "charging_mode", FieldKind::Enum(EnumType::ChargingMode), None, "Charging mode";
    PowerLiftingOn => "power_lifting_on", Boolean, None, "Power lifting on";
    DcInputVoltage1 => "dc_input_voltage1", Numeric, None, "DC input voltage1";
    DcInputPower1 => "dc_input_power1", Numeric, None, "DC input power1";
    DcInputCurrent1 => "dc_input_current1", Numeric, None, "DC input current1";
    PackVoltage => "pack_voltage", Numeric, Some(PackNum), "Pack voltage";
    PackBatteryPercent => "pack_battery_percent", Numeric, Some(PackNum), "Pack battery percent";
    InternalDcInputVoltage => "internal_dc_input_voltage", Numeric, None, "Internal DC input voltage";
    InternalDcInputCurrent => "internal_dc_input_current", Numeric, None, "Internal DC input current";
    InternalDcInputPower => "internal_dc_input_power", Numeric, None, "Internal DC input power";
}

impl Field {
    /// Fully qualified metric name, e.g. `bluetti_ac_input_power`
    pub fn metric_name(self) -> String {
        format!("{}_{}", NAMESPACE, self.name())
    }
}

/// Internal DC input fields, written with their own value after the main pass
pub const DC_INPUT_FIELDS: [Field; 3] = [
    Field::InternalDcInputVoltage,
    Field::InternalDcInputPower,
    Field::InternalDcInputCurrent,
];

/// Checks the static table for internal consistency.
///
/// Names must be unique, valid Prometheus name fragments and round-trip
/// through [`Field::from_name`]. Only numeric fields may carry a label
/// dimension, since the families are written with numbers.
pub fn validate_table() -> Result<()> {
    let mut seen = HashSet::new();

    for field in Field::ALL {
        let name = field.name();

        if !seen.insert(name) {
            return Err(ExporterError::FieldTable(format!(
                "duplicate field name '{}'",
                name
            )));
        }

        let valid_chars = name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if name.is_empty() || !valid_chars {
            return Err(ExporterError::FieldTable(format!(
                "'{}' is not a valid metric name fragment",
                name
            )));
        }

        if Field::from_name(name) != Some(*field) {
            return Err(ExporterError::FieldTable(format!(
                "'{}' does not resolve to {:?}",
                name, field
            )));
        }

        if field.dimension().is_some() && field.kind() != FieldKind::Numeric {
            return Err(ExporterError::FieldTable(format!(
                "labeled field '{}' must be numeric",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_consistent() {
        assert!(validate_table().is_ok());
        assert_eq!(Field::ALL.len(), 44);
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(Field::from_name("ac_output_on"), Some(Field::AcOutputOn));
        assert_eq!(Field::from_name("pack_num"), None);
        assert_eq!(Field::from_name("not_a_field"), None);
    }

    #[test]
    fn test_metric_names_are_namespaced() {
        assert_eq!(
            Field::InternalDcInputVoltage.metric_name(),
            "bluetti_internal_dc_input_voltage"
        );
    }

    #[test]
    fn test_only_pack_fields_are_labeled() {
        let labeled: Vec<_> = Field::ALL
            .iter()
            .filter(|f| f.dimension().is_some())
            .collect();
        assert_eq!(labeled, vec![&Field::PackVoltage, &Field::PackBatteryPercent]);
        assert_eq!(Dimension::PackNum.label(), "pack_num");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Field::PowerOff.kind(), FieldKind::Button);
        assert_eq!(
            Field::AcOutputMode.kind(),
            FieldKind::Enum(EnumType::OutputMode)
        );
        assert_eq!(Field::DcInputPower1.kind(), FieldKind::Numeric);
    }
}
