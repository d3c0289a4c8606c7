//! Flag-aware device resolution on top of `electrochlor_config`.
//!
//! This is the single boundary where CLI options cross into
//! `electrochlor_core::DeviceConfig`.

use std::time::Duration;

use electrochlor_config::{Config, ConfigError, Profile, profile_to_device_config};
use electrochlor_core::DeviceConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the device to talk to from config, profile and CLI overrides.
///
/// `--host` works without any config file; the profile named by `--device`
/// (or the default one) supplies everything else.
pub fn resolve_device(global: &GlobalOpts) -> Result<DeviceConfig, CliError> {
    let cfg = electrochlor_config::load_config()?;

    let mut config = match global.host.as_deref() {
        Some(host) => {
            // An explicitly named profile keeps its tuning under the new host.
            let mut profile = match global.device {
                Some(_) => selected_profile(&cfg, global)?.1.clone(),
                None => Profile::new(host),
            };
            profile.host = host.to_owned();
            let name = global.device.as_deref().unwrap_or(host);
            profile_to_device_config(&profile, name, &cfg.defaults)?
        }
        None => {
            let (name, profile) = selected_profile(&cfg, global)?;
            profile_to_device_config(profile, name, &cfg.defaults)?
        }
    };

    if let Some(port) = global.port {
        config.port = port;
    }
    if let Some(timeout) = global.timeout {
        if timeout == 0 {
            return Err(CliError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }
        config.request_timeout = Duration::from_secs(timeout);
    }

    tracing::debug!(
        device = %config.device_id,
        host = %config.host,
        port = config.port,
        "resolved device"
    );
    Ok(config)
}

fn selected_profile<'a>(
    cfg: &'a Config,
    global: &GlobalOpts,
) -> Result<(&'a str, &'a Profile), CliError> {
    cfg.device(global.device.as_deref()).map_err(|err| match err {
        ConfigError::UnknownDevice { name } => CliError::ProfileNotFound {
            name,
            available: available_profiles(cfg),
        },
        other => other.into(),
    })
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.devices.is_empty() {
        "(none)".into()
    } else {
        cfg.devices.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
