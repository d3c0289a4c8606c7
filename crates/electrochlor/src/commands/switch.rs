//! Switch command: write, then verify by polling.

use std::time::Duration;

use serde::Serialize;

use electrochlor_core::{CommandOutcome, Device, DeviceConfig, SwitchState};

use crate::cli::{GlobalOpts, SwitchArgs};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct SwitchReport {
    switch: SwitchState,
    requested: bool,
    outcome: CommandOutcome,
}

fn detail(report: &SwitchReport, color: bool) -> String {
    let state = output::on_off(Some(report.requested), color);
    match report.outcome {
        CommandOutcome::Converged { polls, elapsed_ms } => {
            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            let secs = elapsed_ms as f64 / 1000.0;
            format!(
                "{} is {state} (confirmed after {polls} poll{}, {secs:.1}s)",
                report.switch.name,
                if polls == 1 { "" } else { "s" }
            )
        }
        CommandOutcome::TimedOut { .. } | CommandOutcome::Cancelled => {
            format!("{} was not confirmed {state}", report.switch.name)
        }
    }
}

fn plain(report: &SwitchReport) -> String {
    format!(
        "switch.{}={}",
        report.switch.key,
        if report.requested { "on" } else { "off" }
    )
}

pub async fn handle(
    mut config: DeviceConfig,
    args: SwitchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(seconds) = args.verify_timeout {
        config.verify_timeout = Duration::from_secs(seconds);
    }
    let verify_secs = config.verify_timeout.as_secs();

    let device = Device::new(config)?;
    device.coordinator().first_refresh().await?;

    let key = args.target.key();
    let requested = args.state.as_bool();
    let word = if requested { "on" } else { "off" };
    if !global.quiet {
        eprintln!("Turning {key} {word}...");
    }

    let outcome = if requested {
        device.turn_on(key).await?
    } else {
        device.turn_off(key).await?
    };
    let switch = device.switch(key)?.snapshot(&device.config().device_id);
    device.unload().await;

    match outcome {
        CommandOutcome::Converged { .. } => {
            let report = SwitchReport {
                switch,
                requested,
                outcome,
            };
            let color = output::should_color(global.color);
            let out = output::render_single(global.output, &report, |r| detail(r, color), plain);
            output::print_output(&out, global.quiet);
            Ok(())
        }
        CommandOutcome::TimedOut { .. } => Err(CliError::Unconfirmed {
            switch: key.into(),
            desired: word.into(),
            seconds: verify_secs,
        }),
        CommandOutcome::Cancelled => Err(CliError::Cancelled {
            reason: format!("{key} command interrupted"),
        }),
    }
}
