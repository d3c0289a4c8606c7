//! Shared configuration for Electrochlor tools.
//!
//! TOML device profiles layered with `ELECTROCHLOR_` environment variables,
//! and translation to `electrochlor_core::DeviceConfig`. The CLI adds its
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use electrochlor_core::DeviceConfig;
use electrochlor_core::config::{DEFAULT_SCAN_INTERVAL, DEFAULT_VERIFY_INTERVAL, DEFAULT_VERIFY_TIMEOUT};

/// Prefix for environment overrides; nested keys split on `__`
/// (`ELECTROCHLOR_DEVICES__POOL__HOST`).
pub const ENV_PREFIX: &str = "ELECTROCHLOR_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no device profile named '{name}'")]
    UnknownDevice { name: String },

    #[error("no device configured")]
    NoDevice,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when no `--device` is given.
    pub default_device: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub devices: BTreeMap<String, Profile>,
}

/// Values every profile inherits unless it overrides them. Durations are
/// whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,

    #[serde(default = "default_verify_interval")]
    pub verify_interval: u64,

    #[serde(default = "default_verify_timeout")]
    pub verify_timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            scan_interval: default_scan_interval(),
            verify_interval: default_verify_interval(),
            verify_timeout: default_verify_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL.as_secs()
}
fn default_verify_interval() -> u64 {
    DEFAULT_VERIFY_INTERVAL.as_secs()
}
fn default_verify_timeout() -> u64 {
    DEFAULT_VERIFY_TIMEOUT.as_secs()
}

/// A named device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Hostname or IP address of the controller.
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Seconds between scheduled polls; 0 disables polling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_interval: Option<u64>,

    /// Per-request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_interval: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_timeout: Option<u64>,
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            scan_interval: None,
            timeout: None,
            verify_interval: None,
            verify_timeout: None,
        }
    }
}

impl Config {
    /// Resolve a profile by name, falling back to `default_device`, then to
    /// the only configured device.
    pub fn device(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = match name.or(self.default_device.as_deref()) {
            Some(name) => name,
            None if self.devices.len() == 1 => {
                return self
                    .devices
                    .iter()
                    .next()
                    .map(|(name, profile)| (name.as_str(), profile))
                    .ok_or(ConfigError::NoDevice);
            }
            None => return Err(ConfigError::NoDevice),
        };
        self.devices
            .get_key_value(name)
            .map(|(name, profile)| (name.as_str(), profile))
            .ok_or_else(|| ConfigError::UnknownDevice { name: name.into() })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "electrochlor", "electrochlor").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("electrochlor");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, still layering the environment on top.
/// A missing file contributes nothing.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `DeviceConfig` from a profile and the global defaults.
///
/// The profile name becomes the device id, so entity ids stay stable when
/// the device's address changes.
pub fn profile_to_device_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DeviceConfig, ConfigError> {
    let host = profile.host.trim();
    if host.is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }
    if host.contains('/') {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("expected a hostname or IP address, got '{host}'"),
        });
    }

    let secs = |value: Option<u64>, default: u64| Duration::from_secs(value.unwrap_or(default));

    let mut config = DeviceConfig::new(host);
    config.device_id = profile_name.to_owned();
    if let Some(port) = profile.port {
        config.port = port;
    }
    config.scan_interval = secs(profile.scan_interval, defaults.scan_interval);
    config.request_timeout = secs(profile.timeout, defaults.timeout);
    config.verify_interval = secs(profile.verify_interval, defaults.verify_interval);
    config.verify_timeout = secs(profile.verify_timeout, defaults.verify_timeout);

    if config.request_timeout.is_zero() {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    if config.verify_interval.is_zero() {
        return Err(ConfigError::Validation {
            field: "verify_interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_inherits_defaults() {
        let config = profile_to_device_config(&Profile::new("10.0.0.5"), "pool", &Defaults::default())
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config.device_id, "pool");
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 90);
        assert_eq!(config.scan_interval, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.verify_interval, Duration::from_secs(3));
        assert_eq!(config.verify_timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_urls_as_hosts() {
        let err = profile_to_device_config(
            &Profile::new("http://10.0.0.5/"),
            "pool",
            &Defaults::default(),
        );
        assert!(matches!(err, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn device_lookup_falls_back() {
        let mut config = Config::default();
        assert!(matches!(config.device(None), Err(ConfigError::NoDevice)));

        config.devices.insert("spa".into(), Profile::new("spa.local"));
        assert_eq!(config.device(None).map(|(n, _)| n).ok(), Some("spa"));

        config.devices.insert("pool".into(), Profile::new("pool.local"));
        assert!(matches!(config.device(None), Err(ConfigError::NoDevice)));

        config.default_device = Some("pool".into());
        assert_eq!(config.device(None).map(|(n, _)| n).ok(), Some("pool"));
        assert!(matches!(
            config.device(Some("hot-tub")),
            Err(ConfigError::UnknownDevice { .. })
        ));
    }
}
