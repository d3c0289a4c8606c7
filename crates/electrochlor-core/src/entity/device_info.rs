// Device registry metadata shared by every entity of one device.

use serde::Serialize;
use serde_json::Value;

use electrochlor_api::Payload;

pub const MANUFACTURER: &str = "Waterco";
pub const DEFAULT_MODEL: &str = "Electrochlor";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// Registry identifier; the device id entities are keyed on.
    pub identifier: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: String,
    pub sw_version: Option<String>,
    pub configuration_url: String,
}

impl DeviceInfo {
    /// Build from the configured host, refined by `model` / `version` in
    /// the latest payload when the firmware reports them.
    pub fn new(device_id: &str, host: &str, payload: Option<&Payload>) -> Self {
        let field = |key: &str| payload.and_then(|p| p.get(key)).and_then(text);
        Self {
            identifier: device_id.to_owned(),
            name: format!("Electrochlor {host}"),
            manufacturer: MANUFACTURER,
            model: field("model").unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            sw_version: field("version"),
            configuration_url: format!("http://{host}"),
        }
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falls_back_without_payload() {
        let info = DeviceInfo::new("pool", "192.168.1.50", None);
        assert_eq!(info.name, "Electrochlor 192.168.1.50");
        assert_eq!(info.model, "Electrochlor");
        assert_eq!(info.sw_version, None);
        assert_eq!(info.configuration_url, "http://192.168.1.50");
    }

    #[test]
    fn reads_model_and_version() {
        let Value::Object(payload) = json!({ "model": "EC-35", "version": 1.81 }) else {
            unreachable!()
        };
        let info = DeviceInfo::new("pool", "pool.local", Some(&payload));
        assert_eq!(info.model, "EC-35");
        assert_eq!(info.sw_version.as_deref(), Some("1.81"));
    }

    #[test]
    fn reads_metadata_sent_beside_result() {
        let payload = electrochlor_api::client::parse_status(
            r#"{"model": "EC-35", "version": "1.8", "result": {"temp": 25.0}}"#,
        )
        .unwrap();
        let info = DeviceInfo::new("pool", "pool.local", Some(&payload));
        assert_eq!(info.model, "EC-35");
        assert_eq!(info.sw_version.as_deref(), Some("1.8"));
    }
}
