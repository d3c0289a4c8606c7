// ── Runtime device configuration ──
//
// Describes *how* to reach and poll one Electrochlor device. Never touches
// disk; `electrochlor-config` (or any other host) builds a `DeviceConfig`
// and hands it in.

use std::time::Duration;

use electrochlor_api::DeviceEndpoint;

/// Seconds between scheduled polls when nothing else is configured.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(60);
/// How often a pending command re-polls the device.
pub const DEFAULT_VERIFY_INTERVAL: Duration = Duration::from_secs(3);
/// How long a pending command waits for the device to agree.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for a single device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Stable identifier used to build entity unique ids.
    pub device_id: String,
    /// Device hostname or IP address.
    pub host: String,
    /// HTTP port of the device's API.
    pub port: u16,
    /// Scheduled poll period. Zero disables the schedule.
    pub scan_interval: Duration,
    /// Per-request network timeout.
    pub request_timeout: Duration,
    /// Re-poll period while verifying a command.
    pub verify_interval: Duration,
    /// Upper bound on command verification.
    pub verify_timeout: Duration,
}

impl DeviceConfig {
    /// Defaults for a device at `host`, identified by its host.
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            device_id: host.clone(),
            host,
            port: DeviceEndpoint::DEFAULT_PORT,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            request_timeout: electrochlor_api::transport::DEFAULT_REQUEST_TIMEOUT,
            verify_interval: DEFAULT_VERIFY_INTERVAL,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
        }
    }

    pub fn endpoint(&self) -> DeviceEndpoint {
        DeviceEndpoint::new(self.host.clone(), self.port)
    }
}
