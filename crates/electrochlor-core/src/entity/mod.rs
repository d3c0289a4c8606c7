// ── Entity model ──
//
// Sensors, binary sensors and switches are rows in the descriptor tables
// (`description`). The code here is the one generic reading per platform:
// given a row and the coordinator's state, produce a value and a snapshot
// that hosts can render.

pub mod description;
pub mod device_info;
pub mod icons;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use electrochlor_api::{Payload, coerce_bool, find_key, lookup_scoped};

use crate::coordinator::CoordinatorState;
use crate::switch::{SwitchController, SwitchPhase};

pub use description::{
    BINARY_SENSORS, BinarySensorDescription, BinarySensorKind, DeviceClass, SENSORS, STATUS_SCOPE,
    SWITCHES, SensorDescription, SensorKind, SwitchDescription, switch_description,
};
pub use device_info::DeviceInfo;

/// `{device_id}_{key}`.
pub fn unique_id(device_id: &str, key: &str) -> String {
    format!("{device_id}_{key}")
}

// ── Values ───────────────────────────────────────────────────────

/// A sensor reading as the device reported it (after rounding).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl SensorValue {
    fn from_json(value: &Value, precision: Option<i32>) -> Option<Self> {
        match value {
            Value::Number(n) => {
                let v = n.as_f64()?;
                Some(Self::Number(precision.map_or(v, |places| round_to(v, places))))
            }
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ── Sensor ───────────────────────────────────────────────────────

impl SensorDescription {
    /// Current value, or `None` when the device has never reported it.
    pub fn value(&self, state: &CoordinatorState) -> Option<SensorValue> {
        match self.kind {
            SensorKind::ChlorinatorStatus => chlorinator_status(state),
            SensorKind::CellDirection => state.data().map(cell_direction),
            SensorKind::Field => {
                let value = find_key(state.data()?, self.key)?;
                SensorValue::from_json(value, self.precision)
            }
        }
    }

    pub fn snapshot(&self, device_id: &str, state: &CoordinatorState) -> SensorState {
        let value = self.value(state);
        let rendered = value.as_ref().map(ToString::to_string);
        SensorState {
            unique_id: unique_id(device_id, self.key),
            key: self.key,
            name: self.name,
            unit: self.unit,
            icon: icons::value_icon(self.key, rendered.as_deref()),
            available: state.last_update_success(),
            value,
        }
    }
}

/// `Some(true)` while the last poll was a device error or the cached payload
/// carries a truthy `error`; `None` before the device ever answered.
fn device_fault(state: &CoordinatorState) -> Option<bool> {
    let failed = state
        .last_error()
        .is_some_and(crate::error::PollError::is_device_error);
    let flagged = state
        .data()
        .and_then(|data| find_key(data, "error"))
        .is_some_and(coerce_bool);

    if failed || flagged {
        Some(true)
    } else {
        state.data().map(|_| false)
    }
}

fn chlorinator_status(state: &CoordinatorState) -> Option<SensorValue> {
    device_fault(state).map(|fault| SensorValue::Text(if fault { "Error" } else { "OK" }.into()))
}

fn cell_direction(payload: &Payload) -> SensorValue {
    let flag = |key: &str| lookup_scoped(payload, Some(STATUS_SCOPE), key).is_some_and(coerce_bool);
    let direction = if flag("cellDirectionA") {
        "A"
    } else if flag("cellDirectionB") {
        "B"
    } else {
        "Off"
    };
    SensorValue::Text(direction.into())
}

// ── Binary sensor ────────────────────────────────────────────────

impl BinarySensorDescription {
    /// `None` before the first successful poll, or when a salt status was
    /// never reported.
    pub fn is_on(&self, state: &CoordinatorState) -> Option<bool> {
        let value = || {
            state
                .data()
                .and_then(|data| lookup_scoped(data, self.scope, self.key))
        };
        match self.kind {
            BinarySensorKind::Flag => state.data().map(|_| value().is_some_and(coerce_bool)),
            BinarySensorKind::SaltFault => value().map(salt_fault),
            BinarySensorKind::DeviceFault => device_fault(state),
        }
    }

    pub fn snapshot(&self, device_id: &str, state: &CoordinatorState) -> BinarySensorState {
        let is_on = self.is_on(state);
        let icon = match self.kind {
            BinarySensorKind::Flag | BinarySensorKind::DeviceFault => {
                icons::state_icon(self.key, is_on)
            }
            BinarySensorKind::SaltFault => icons::fault_icon(self.key, is_on),
        };
        BinarySensorState {
            unique_id: unique_id(device_id, self.key),
            key: self.key,
            name: self.name,
            device_class: self.device_class,
            icon,
            available: state.last_update_success(),
            is_on,
        }
    }
}

fn salt_fault(value: &Value) -> bool {
    let status = match value {
        Value::String(s) => s.trim(),
        Value::Null => return false,
        _ => return true,
    };
    !(status.eq_ignore_ascii_case("NORMAL") || status.eq_ignore_ascii_case("OK"))
}

// ── Switch ───────────────────────────────────────────────────────

impl SwitchController {
    pub fn snapshot(&self, device_id: &str) -> SwitchState {
        let is_on = self.is_on();
        SwitchState {
            unique_id: unique_id(device_id, self.key()),
            key: self.key(),
            name: self.description().name,
            icon: icons::state_icon(self.key(), is_on),
            available: self.available(),
            is_on,
            pending: !matches!(self.phase(), SwitchPhase::Idle),
        }
    }
}

// ── Snapshots ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub value: Option<SensorValue>,
    pub icon: &'static str,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinarySensorState {
    pub unique_id: String,
    pub key: &'static str,
    pub name: &'static str,
    pub device_class: Option<DeviceClass>,
    pub is_on: Option<bool>,
    pub icon: &'static str,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchState {
    pub unique_id: String,
    pub key: &'static str,
    pub name: &'static str,
    pub is_on: Option<bool>,
    /// A command is in flight and `is_on` is the requested value.
    pub pending: bool,
    pub icon: &'static str,
    pub available: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::PollError;

    fn state_with(value: Value) -> CoordinatorState {
        let Value::Object(map) = value else {
            panic!("expected object");
        };
        let payload = Arc::new(map);
        CoordinatorState {
            data: Some(Arc::clone(&payload)),
            last_result: Ok(payload),
            poll_count: 1,
            ..CoordinatorState::default()
        }
    }

    fn sensor(key: &str) -> &'static SensorDescription {
        SENSORS.iter().find(|d| d.key == key).unwrap()
    }

    fn binary(key: &str) -> &'static BinarySensorDescription {
        BINARY_SENSORS.iter().find(|d| d.key == key).unwrap()
    }

    #[test]
    fn numeric_sensors_are_rounded() {
        let state = state_with(json!({ "temp": 27.456, "ph": 7.318, "pumpSpeed": 2400 }));
        assert_eq!(sensor("temp").value(&state), Some(SensorValue::Number(27.5)));
        assert_eq!(sensor("ph").value(&state), Some(SensorValue::Number(7.32)));
        assert_eq!(sensor("pumpSpeed").value(&state), Some(SensorValue::Number(2400.0)));
    }

    #[test]
    fn missing_field_has_no_value() {
        let state = state_with(json!({ "temp": 20 }));
        assert_eq!(sensor("lightColor").value(&state), None);
        assert_eq!(sensor("temp").value(&CoordinatorState::default()), None);
    }

    #[test]
    fn chlorinator_status_reports_device_errors() {
        let ok = state_with(json!({ "temp": 20 }));
        assert_eq!(sensor("error").value(&ok), Some(SensorValue::Text("OK".into())));

        let flagged = state_with(json!({ "status": { "error": 1 } }));
        assert_eq!(sensor("error").value(&flagged), Some(SensorValue::Text("Error".into())));

        let mut failed = ok.clone();
        failed.last_result = Err(PollError::DeviceError {
            message: "error flag set".into(),
        });
        assert_eq!(sensor("error").value(&failed), Some(SensorValue::Text("Error".into())));

        assert_eq!(sensor("error").value(&CoordinatorState::default()), None);
    }

    #[test]
    fn error_binary_sensor_follows_device_errors() {
        let ok = state_with(json!({ "temp": 20, "error": false }));
        assert_eq!(binary("error").is_on(&ok), Some(false));

        let mut failed = ok.clone();
        failed.last_result = Err(PollError::DeviceError {
            message: "error flag set".into(),
        });
        assert_eq!(binary("error").is_on(&failed), Some(true));
        assert_eq!(sensor("error").value(&failed), Some(SensorValue::Text("Error".into())));

        let mut timed_out = ok.clone();
        timed_out.last_result = Err(PollError::Timeout { timeout_secs: 10 });
        assert_eq!(binary("error").is_on(&timed_out), Some(false));

        let never_polled = CoordinatorState {
            last_result: Err(PollError::DeviceError {
                message: "error flag set".into(),
            }),
            ..CoordinatorState::default()
        };
        assert_eq!(binary("error").is_on(&never_polled), Some(true));
        assert_eq!(binary("error").is_on(&CoordinatorState::default()), None);
    }

    #[test]
    fn cell_direction_prefers_a() {
        let a = state_with(json!({ "status": { "cellDirectionA": true, "cellDirectionB": true } }));
        let b = state_with(json!({ "status": { "cellDirectionA": false, "cellDirectionB": "on" } }));
        let off = state_with(json!({ "status": {} }));
        assert_eq!(sensor("status").value(&a), Some(SensorValue::Text("A".into())));
        assert_eq!(sensor("status").value(&b), Some(SensorValue::Text("B".into())));
        assert_eq!(sensor("status").value(&off), Some(SensorValue::Text("Off".into())));
    }

    #[test]
    fn status_flags_are_scoped() {
        let state = state_with(json!({ "pump": false, "status": { "pump": "ON" } }));
        assert_eq!(binary("pump").is_on(&state), Some(true));
        assert_eq!(binary("light").is_on(&state), Some(false));
        assert_eq!(binary("pump").is_on(&CoordinatorState::default()), None);
    }

    #[test]
    fn salt_fault_reads_status_text() {
        let normal = state_with(json!({ "saltStatus": "normal" }));
        let low = state_with(json!({ "saltStatus": "LOW" }));
        let absent = state_with(json!({ "temp": 20 }));
        assert_eq!(binary("saltStatus").is_on(&normal), Some(false));
        assert_eq!(binary("saltStatus").is_on(&low), Some(true));
        assert_eq!(binary("saltStatus").is_on(&absent), None);
    }

    #[test]
    fn snapshots_carry_identity_and_availability() {
        let mut state = state_with(json!({ "temp": 27.456 }));
        state.last_result = Err(PollError::Timeout { timeout_secs: 10 });

        let snap = sensor("temp").snapshot("pool", &state);
        assert_eq!(snap.unique_id, "pool_temp");
        assert_eq!(snap.value, Some(SensorValue::Number(27.5)));
        assert_eq!(snap.icon, "mdi:thermometer");
        assert!(!snap.available);
    }
}
