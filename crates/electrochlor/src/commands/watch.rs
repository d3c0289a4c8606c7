//! Watch command: run the polling schedule and print every update.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use electrochlor_core::{CoordinatorState, Device, DeviceConfig};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::status::{self, StatusReport};

#[derive(Debug, Serialize)]
struct WatchUpdate {
    at: Option<DateTime<Utc>>,
    available: bool,
    error: Option<String>,
    #[serde(flatten)]
    report: StatusReport,
}

impl WatchUpdate {
    fn collect(device: &Device, state: &CoordinatorState) -> Self {
        Self {
            at: state.last_attempt_at,
            available: state.last_update_success(),
            error: state.last_error().map(ToString::to_string),
            report: StatusReport::collect(device),
        }
    }
}

/// One line per update: time, then `key=value` for the headline sensors.
fn line(update: &WatchUpdate, color: bool) -> String {
    let time = update
        .at
        .map_or_else(|| "--:--:--".into(), |at| at.with_timezone(&Local).format("%H:%M:%S").to_string());

    let mut parts = vec![format!("[{time}]")];
    parts.extend(
        update
            .report
            .sensors
            .iter()
            .filter(|s| s.value.is_some())
            .map(|s| format!("{}={}", s.key, status::sensor_value(s).replace(' ', ""))),
    );
    parts.extend(
        update
            .report
            .switches
            .iter()
            .map(|s| format!("{}={}", s.key, output::on_off(s.is_on, color))),
    );
    if let Some(ref error) = update.error {
        parts.push(format!("({}: {error})", output::availability(false, color)));
    }
    parts.join(" ")
}

fn print_update(device: &Device, state: &CoordinatorState, global: &GlobalOpts, color: bool) {
    let update = WatchUpdate::collect(device, state);
    let out = match global.output {
        // One document per line so the stream stays parseable.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_compact(&update),
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(&update)),
        OutputFormat::Plain => status::plain(&update.report),
        OutputFormat::Table => line(&update, color),
    };
    output::print_output(&out, global.quiet);
}

pub async fn handle(
    mut config: DeviceConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(interval) = args.interval {
        config.scan_interval = Duration::from_secs(interval);
    }
    if config.scan_interval.is_zero() {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "polling is disabled for this device; pass --interval <seconds>".into(),
        });
    }

    let device = Device::new(config)?;
    device.setup().await?;
    let mut updates = device.coordinator().subscribe();
    let color = output::should_color(global.color);

    print_update(&device, &device.coordinator().state(), global, color);
    let mut printed = 1;

    loop {
        if args.count.is_some_and(|n| printed >= n) {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                print_update(&device, &state, global, color);
                printed += 1;
            }
        }
    }

    device.unload().await;
    Ok(())
}
