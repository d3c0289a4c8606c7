//! Raw command: the normalized status document as the device sent it.

use serde_json::Value;

use electrochlor_core::{Coordinator, CoreError, DeviceConfig, Payload};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Top-level scalars as `key=value`; nested objects as compact JSON.
fn plain(payload: &Payload) -> String {
    payload
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => format!("{key}={s}"),
            other => format!("{key}={}", output::render_json_compact(other)),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle(config: &DeviceConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let coordinator = Coordinator::new(config)?;
    let payload = coordinator.refresh().await.map_err(CoreError::from)?;

    let out = match global.output {
        OutputFormat::Table | OutputFormat::Json => output::render_json_pretty(&*payload),
        OutputFormat::JsonCompact => output::render_json_compact(&*payload),
        OutputFormat::Yaml => output::render_yaml(&*payload),
        OutputFormat::Plain => plain(&payload),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
