//! Config subcommand handlers.

use electrochlor_config::{self as config, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::available_profiles;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn save(cfg: &Config, global: &GlobalOpts, message: &str) -> Result<(), CliError> {
    let path = config::save_config(cfg)?;
    if !global.quiet {
        eprintln!("{message} ({})", path.display());
    }
    Ok(())
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    CliError::ProfileNotFound {
        name,
        available: available_profiles(cfg),
    }
}

fn show_table(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# failed to render config: {e}"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = output::render_single(global.output, &cfg, show_table, |c| {
                c.devices.keys().cloned().collect::<Vec<_>>().join("\n")
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Add {
            name,
            host,
            port,
            scan_interval,
            default,
        } => {
            let mut cfg = config::load_config()?;
            let mut profile = Profile::new(host);
            profile.port = port;
            profile.scan_interval = scan_interval;

            // Reject what the device layer would reject before writing it.
            config::profile_to_device_config(&profile, &name, &cfg.defaults)?;

            if default || cfg.default_device.is_none() {
                cfg.default_device = Some(name.clone());
            }
            cfg.devices.insert(name.clone(), profile);
            save(&cfg, global, &format!("Saved device '{name}'"))
        }

        ConfigCommand::Remove { name } => {
            let mut cfg = config::load_config()?;
            if cfg.devices.remove(&name).is_none() {
                return Err(profile_not_found(&cfg, name));
            }
            if cfg.default_device.as_deref() == Some(name.as_str()) {
                cfg.default_device = None;
            }
            save(&cfg, global, &format!("Removed device '{name}'"))
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.devices.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_device = Some(name.clone());
            save(&cfg, global, &format!("Default device is now '{name}'"))
        }
    }
}
