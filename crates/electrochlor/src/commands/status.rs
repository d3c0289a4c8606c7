//! Status command: one poll, every entity.

use serde::Serialize;
use tabled::Tabled;

use electrochlor_core::{
    BinarySensorState, Device, DeviceConfig, DeviceInfo, SensorState, SwitchState,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Report ──────────────────────────────────────────────────────────

/// Everything a device exposes at one point in time.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub device: DeviceInfo,
    pub sensors: Vec<SensorState>,
    pub binary_sensors: Vec<BinarySensorState>,
    pub switches: Vec<SwitchState>,
}

impl StatusReport {
    pub fn collect(device: &Device) -> Self {
        Self {
            device: device.device_info(),
            sensors: device.sensors(),
            binary_sensors: device.binary_sensors(),
            switches: device.switches(),
        }
    }
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "Sensor")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct BinarySensorRow {
    #[tabled(rename = "Binary sensor")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Class")]
    class: String,
}

#[derive(Tabled)]
struct SwitchRow {
    #[tabled(rename = "Switch")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Available")]
    available: String,
}

pub fn sensor_value(s: &SensorState) -> String {
    match (&s.value, s.unit) {
        (Some(value), Some(unit)) => format!("{value} {unit}"),
        (Some(value), None) => value.to_string(),
        (None, _) => "-".into(),
    }
}

fn detail(report: &StatusReport, color: bool) -> String {
    let info = &report.device;
    let mut header = format!("{} ({} {})", info.name, info.manufacturer, info.model);
    if let Some(ref version) = info.sw_version {
        header.push_str(&format!(", firmware {version}"));
    }
    if report.sensors.iter().any(|s| !s.available) {
        let marker = output::availability(false, color);
        header.push_str(&format!("\nAvailable: {marker} (showing last known values)"));
    }

    let sensors: Vec<SensorRow> = report
        .sensors
        .iter()
        .map(|s| SensorRow {
            name: s.name.into(),
            value: sensor_value(s),
        })
        .collect();
    let binary: Vec<BinarySensorRow> = report
        .binary_sensors
        .iter()
        .map(|b| BinarySensorRow {
            name: b.name.into(),
            state: output::on_off(b.is_on, color),
            class: b.device_class.map(|c| c.to_string()).unwrap_or_default(),
        })
        .collect();
    let switches: Vec<SwitchRow> = report
        .switches
        .iter()
        .map(|s| SwitchRow {
            name: s.name.into(),
            state: output::on_off(s.is_on, color),
            available: output::availability(s.available, color),
        })
        .collect();

    [
        header,
        output::render_table(&sensors),
        output::render_table(&binary),
        output::render_table(&switches),
    ]
    .join("\n\n")
}

pub fn plain(report: &StatusReport) -> String {
    let unknown = || "unknown".to_owned();
    let on_off = |v: Option<bool>| v.map_or_else(unknown, |on| String::from(if on { "on" } else { "off" }));

    report
        .sensors
        .iter()
        .map(|s| {
            format!(
                "sensor.{}={}",
                s.key,
                s.value.as_ref().map_or_else(unknown, ToString::to_string)
            )
        })
        .chain(
            report
                .binary_sensors
                .iter()
                .map(|b| format!("binary_sensor.{}={}", b.key, on_off(b.is_on))),
        )
        .chain(
            report
                .switches
                .iter()
                .map(|s| format!("switch.{}={}", s.key, on_off(s.is_on))),
        )
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(config: DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let device = Device::new(config)?;
    device.coordinator().first_refresh().await?;

    let report = StatusReport::collect(&device);
    let color = output::should_color(global.color);
    let out = output::render_single(global.output, &report, |r| detail(r, color), plain);
    output::print_output(&out, global.quiet);

    device.unload().await;
    Ok(())
}
