//! Device Enumerations
//!
//! Enumerated register values reported by Bluetti power stations. Every variant
//! carries its exposed symbolic name explicitly, so converting a value to the
//! string used in payloads never depends on the Rust identifier.

use std::fmt;
use std::str::FromStr;

/// Declares a device enum together with its symbolic names.
macro_rules! device_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $symbol:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Symbolic name as exposed in payloads
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $symbol),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownMember;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($symbol => Ok($name::$variant),)+
                    _ => Err(UnknownMember {
                        enum_name: stringify!($name),
                        member: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// A symbolic name that does not belong to the target enum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMember {
    pub enum_name: &'static str,
    pub member: String,
}

impl fmt::Display for UnknownMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a member of {}", self.member, self.enum_name)
    }
}

impl std::error::Error for UnknownMember {}

device_enum! {
    /// AC output mode
    OutputMode {
        Stop => "STOP",
        InverterOutput => "INVERTER_OUTPUT",
        BypassOutputC => "BYPASS_OUTPUT_C",
        BypassOutputD => "BYPASS_OUTPUT_D",
        LoadMatching => "LOAD_MATCHING",
    }
}

device_enum! {
    UpsMode {
        Customized => "CUSTOMIZED",
        PvPriority => "PV_PRIORITY",
        Standard => "STANDARD",
        TimeControl => "TIME_CONTROL",
    }
}

device_enum! {
    /// Role of the unit in a split-phase pair
    MachineAddress {
        Slave => "SLAVE",
        Master => "MASTER",
    }
}

device_enum! {
    LedMode {
        Low => "LOW",
        High => "HIGH",
        Sos => "SOS",
        Off => "OFF",
    }
}

device_enum! {
    AutoSleepMode {
        ThirtySeconds => "THIRTY_SECONDS",
        OneMinute => "ONE_MINUTE",
        FiveMinutes => "FIVE_MINUTES",
        Never => "NEVER",
    }
}

device_enum! {
    /// Delay before the ECO mode powers the unit down
    EcoShutdown {
        OneHour => "ONE_HOUR",
        TwoHours => "TWO_HOURS",
        ThreeHours => "THREE_HOURS",
        FourHours => "FOUR_HOURS",
    }
}

device_enum! {
    ChargingMode {
        Standard => "STANDARD",
        Silent => "SILENT",
        Turbo => "TURBO",
    }
}

device_enum! {
    /// Charge state of a battery pack
    BatteryState {
        Standby => "STANDBY",
        Charge => "CHARGE",
        Discharge => "DISCHARGE",
    }
}

/// Which device enum an Enum-kind field carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumType {
    OutputMode,
    UpsMode,
    MachineAddress,
    LedMode,
    AutoSleepMode,
    EcoShutdown,
    ChargingMode,
    BatteryState,
}

/// A decoded member of any device enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumValue {
    OutputMode(OutputMode),
    UpsMode(UpsMode),
    MachineAddress(MachineAddress),
    LedMode(LedMode),
    AutoSleepMode(AutoSleepMode),
    EcoShutdown(EcoShutdown),
    ChargingMode(ChargingMode),
    BatteryState(BatteryState),
}

impl EnumValue {
    /// Symbolic name of the wrapped member
    pub fn name(self) -> &'static str {
        match self {
            EnumValue::OutputMode(v) => v.name(),
            EnumValue::UpsMode(v) => v.name(),
            EnumValue::MachineAddress(v) => v.name(),
            EnumValue::LedMode(v) => v.name(),
            EnumValue::AutoSleepMode(v) => v.name(),
            EnumValue::EcoShutdown(v) => v.name(),
            EnumValue::ChargingMode(v) => v.name(),
            EnumValue::BatteryState(v) => v.name(),
        }
    }

    pub fn enum_type(self) -> EnumType {
        match self {
            EnumValue::OutputMode(_) => EnumType::OutputMode,
            EnumValue::UpsMode(_) => EnumType::UpsMode,
            EnumValue::MachineAddress(_) => EnumType::MachineAddress,
            EnumValue::LedMode(_) => EnumType::LedMode,
            EnumValue::AutoSleepMode(_) => EnumType::AutoSleepMode,
            EnumValue::EcoShutdown(_) => EnumType::EcoShutdown,
            EnumValue::ChargingMode(_) => EnumType::ChargingMode,
            EnumValue::BatteryState(_) => EnumType::BatteryState,
        }
    }
}

macro_rules! enum_value_from {
    ($($name:ident),+) => {
        $(
            impl From<$name> for EnumValue {
                fn from(value: $name) -> Self {
                    EnumValue::$name(value)
                }
            }
        )+
    };
}

enum_value_from!(
    OutputMode,
    UpsMode,
    MachineAddress,
    LedMode,
    AutoSleepMode,
    EcoShutdown,
    ChargingMode,
    BatteryState
);

impl EnumType {
    /// Parses a symbolic name into a member of this enum
    pub fn parse(self, symbol: &str) -> Result<EnumValue, UnknownMember> {
        Ok(match self {
            EnumType::OutputMode => EnumValue::OutputMode(symbol.parse()?),
            EnumType::UpsMode => EnumValue::UpsMode(symbol.parse()?),
            EnumType::MachineAddress => EnumValue::MachineAddress(symbol.parse()?),
            EnumType::LedMode => EnumValue::LedMode(symbol.parse()?),
            EnumType::AutoSleepMode => EnumValue::AutoSleepMode(symbol.parse()?),
            EnumType::EcoShutdown => EnumValue::EcoShutdown(symbol.parse()?),
            EnumType::ChargingMode => EnumValue::ChargingMode(symbol.parse()?),
            EnumType::BatteryState => EnumValue::BatteryState(symbol.parse()?),
        })
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
