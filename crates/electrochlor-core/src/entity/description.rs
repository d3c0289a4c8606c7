// ── Entity descriptor tables ──
//
// Every sensor, binary sensor and switch the device exposes is one row in
// a static table below. A single generic implementation per platform
// (see `entity::mod`) reads the coordinator's payload through these rows.

use serde::Serialize;
use strum::{AsRefStr, Display};

/// Status sub-object that holds the actuator and cell flags.
pub const STATUS_SCOPE: &str = "status";

/// How a sensor turns the payload into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// The field's own value, rounded if the description asks for it.
    Field,
    /// `"Error"` when the device flags an error, `"OK"` otherwise.
    ChlorinatorStatus,
    /// `"A"`, `"B"` or `"Off"` from the two cell-direction flags.
    CellDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    /// Decimal places for numeric values.
    pub precision: Option<i32>,
    pub kind: SensorKind,
}

impl SensorDescription {
    const fn field(key: &'static str, name: &'static str) -> Self {
        Self {
            key,
            name,
            unit: None,
            precision: None,
            kind: SensorKind::Field,
        }
    }

    const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    const fn precision(mut self, places: i32) -> Self {
        self.precision = Some(places);
        self
    }

    const fn kind(mut self, kind: SensorKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Home-automation device classes used by the binary sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Running,
    Problem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinarySensorKind {
    /// Truthiness of the field (coerced).
    Flag,
    /// On when the salt status is anything but `NORMAL` / `OK`.
    SaltFault,
    /// On while the device reports an error, whether or not a good payload
    /// is cached.
    DeviceFault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub device_class: Option<DeviceClass>,
    /// Object the key is looked up in, if not the whole payload.
    pub scope: Option<&'static str>,
    pub kind: BinarySensorKind,
}

impl BinarySensorDescription {
    const fn status_flag(key: &'static str, name: &'static str) -> Self {
        Self {
            key,
            name,
            device_class: None,
            scope: Some(STATUS_SCOPE),
            kind: BinarySensorKind::Flag,
        }
    }

    const fn class(mut self, class: DeviceClass) -> Self {
        self.device_class = Some(class);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchDescription {
    /// Status field that reports the actuator's state.
    pub key: &'static str,
    pub name: &'static str,
    /// Sub-path under the status path that accepts the command.
    pub command_path: &'static str,
    pub scope: Option<&'static str>,
}

// ── Tables ───────────────────────────────────────────────────────

pub static SENSORS: &[SensorDescription] = &[
    SensorDescription::field("temp", "Pool Temperature")
        .unit("°C")
        .precision(1),
    SensorDescription::field("ph", "Pool pH").unit("pH").precision(2),
    SensorDescription::field("chlorineProduction", "Pool Chlorine Production"),
    SensorDescription::field("operation", "Pool Operation Mode"),
    SensorDescription::field("operationType", "Pool Operation Type"),
    SensorDescription::field("pumpSpeed", "Pool Pump Speed").unit("RPM"),
    SensorDescription::field("lightColor", "Pool Light Colour"),
    SensorDescription::field("saltStatus", "Pool Salt Status"),
    SensorDescription::field("error", "Pool Chlorinator Status").kind(SensorKind::ChlorinatorStatus),
    SensorDescription::field("status", "Pool Chlorinator Cell Direction")
        .kind(SensorKind::CellDirection),
];

pub static BINARY_SENSORS: &[BinarySensorDescription] = &[
    BinarySensorDescription::status_flag("pump", "Pool Pump").class(DeviceClass::Running),
    BinarySensorDescription::status_flag("light", "Pool Light"),
    BinarySensorDescription::status_flag("phPump", "Pool pH Pump").class(DeviceClass::Running),
    BinarySensorDescription::status_flag("valve", "Pool Valve"),
    BinarySensorDescription::status_flag("aux2", "Pool Aux2"),
    BinarySensorDescription::status_flag("cellDirectionA", "Pool Chlorinator Cell Direction A"),
    BinarySensorDescription::status_flag("cellDirectionB", "Pool Chlorinator Cell Direction B"),
    BinarySensorDescription {
        key: "error",
        name: "Pool Chlorinator Error",
        device_class: Some(DeviceClass::Problem),
        scope: None,
        kind: BinarySensorKind::DeviceFault,
    },
    BinarySensorDescription {
        key: "saltStatus",
        name: "Pool Salt Fault",
        device_class: Some(DeviceClass::Problem),
        scope: None,
        kind: BinarySensorKind::SaltFault,
    },
];

pub static SWITCHES: &[SwitchDescription] = &[
    SwitchDescription {
        key: "pump",
        name: "Pool Pump",
        command_path: "state",
        scope: Some(STATUS_SCOPE),
    },
    SwitchDescription {
        key: "light",
        name: "Pool Lights",
        command_path: "light",
        scope: Some(STATUS_SCOPE),
    },
    SwitchDescription {
        key: "valve",
        name: "Pool Valve",
        command_path: "state",
        scope: Some(STATUS_SCOPE),
    },
    SwitchDescription {
        key: "aux2",
        name: "Pool Aux2",
        command_path: "state",
        scope: Some(STATUS_SCOPE),
    },
];

/// Look up a switch row by its status key.
pub fn switch_description(key: &str) -> Option<&'static SwitchDescription> {
    SWITCHES.iter().find(|d| d.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique_per_platform() {
        let sensors: HashSet<_> = SENSORS.iter().map(|d| d.key).collect();
        assert_eq!(sensors.len(), SENSORS.len());
        let binary: HashSet<_> = BINARY_SENSORS.iter().map(|d| d.key).collect();
        assert_eq!(binary.len(), BINARY_SENSORS.len());
        let switches: HashSet<_> = SWITCHES.iter().map(|d| d.key).collect();
        assert_eq!(switches.len(), SWITCHES.len());
    }

    #[test]
    fn light_uses_its_own_command_path() {
        assert_eq!(switch_description("light").map(|d| d.command_path), Some("light"));
        assert_eq!(switch_description("pump").map(|d| d.command_path), Some("state"));
        assert!(switch_description("heater").is_none());
    }
}
