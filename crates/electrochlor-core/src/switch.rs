// ── Command-and-verify switch controller ──
//
// A command cycle runs Idle → Commanding → Polling → (Converged | TimedOut
// | Cancelled) → Idle. While the cycle is in Commanding or Polling the
// switch reports the requested value (the optimistic override); every exit
// path drops back to Idle, after which reads come from the coordinator's
// cache again.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use electrochlor_api::{Payload, coerce_bool, lookup_scoped};

use crate::config::DeviceConfig;
use crate::coordinator::Coordinator;
use crate::entity::SwitchDescription;

// ── State machine ────────────────────────────────────────────────

/// Where a switch is in its command cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SwitchPhase {
    /// No command pending; reads come from the device.
    #[default]
    Idle,
    /// The write request is being sent.
    Commanding { desired: bool },
    /// Waiting for the device to report `desired`; `attempt` counts polls.
    Polling { desired: bool, attempt: u32 },
}

impl SwitchPhase {
    /// The optimistic value shown while a command is pending.
    pub fn pending(&self) -> Option<bool> {
        match *self {
            Self::Idle => None,
            Self::Commanding { desired } | Self::Polling { desired, .. } => Some(desired),
        }
    }
}

/// How a command cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// The device reported the requested value.
    Converged { polls: u32, elapsed_ms: u64 },
    /// The device never agreed within the verification window.
    TimedOut { polls: u32 },
    /// The coordinator shut down mid-cycle.
    Cancelled,
}

impl CommandOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }
}

/// Resets the phase to `Idle` when the cycle ends, however it ends.
struct OverrideGuard<'a> {
    phase: &'a watch::Sender<SwitchPhase>,
}

impl<'a> OverrideGuard<'a> {
    fn engage(phase: &'a watch::Sender<SwitchPhase>, desired: bool) -> Self {
        phase.send_replace(SwitchPhase::Commanding { desired });
        Self { phase }
    }
}

impl Drop for OverrideGuard<'_> {
    fn drop(&mut self) {
        self.phase.send_replace(SwitchPhase::Idle);
    }
}

// ── SwitchController ─────────────────────────────────────────────

/// One actuator (pump, lights, valve, aux) and its command cycle.
pub struct SwitchController {
    description: &'static SwitchDescription,
    coordinator: Coordinator,
    phase: watch::Sender<SwitchPhase>,
    last_outcome: watch::Sender<Option<CommandOutcome>>,
    /// Serializes command cycles so only one override exists at a time.
    command_lock: Mutex<()>,
    verify_interval: Duration,
    verify_timeout: Duration,
}

impl SwitchController {
    pub fn new(
        description: &'static SwitchDescription,
        coordinator: Coordinator,
        config: &DeviceConfig,
    ) -> Self {
        Self::with_timing(
            description,
            coordinator,
            config.verify_interval,
            config.verify_timeout,
        )
    }

    pub fn with_timing(
        description: &'static SwitchDescription,
        coordinator: Coordinator,
        verify_interval: Duration,
        verify_timeout: Duration,
    ) -> Self {
        let (phase, _) = watch::channel(SwitchPhase::Idle);
        let (last_outcome, _) = watch::channel(None);
        Self {
            description,
            coordinator,
            phase,
            last_outcome,
            command_lock: Mutex::new(()),
            verify_interval,
            verify_timeout,
        }
    }

    pub fn description(&self) -> &'static SwitchDescription {
        self.description
    }

    pub fn key(&self) -> &'static str {
        self.description.key
    }

    pub fn phase(&self) -> SwitchPhase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SwitchPhase> {
        self.phase.subscribe()
    }

    pub fn last_outcome(&self) -> Option<CommandOutcome> {
        *self.last_outcome.borrow()
    }

    /// Displayed state: the pending value during a command, otherwise what
    /// the device last reported. `None` before any successful poll.
    pub fn is_on(&self) -> Option<bool> {
        self.phase().pending().or_else(|| self.actual_state())
    }

    /// What the device last reported, ignoring any pending command.
    pub fn actual_state(&self) -> Option<bool> {
        self.coordinator
            .data()
            .map(|payload| self.description.read(&payload))
    }

    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }

    pub async fn turn_on(&self) -> CommandOutcome {
        self.set_state(true).await
    }

    pub async fn turn_off(&self) -> CommandOutcome {
        self.set_state(false).await
    }

    /// Run one command cycle: show `desired` immediately, write it, then
    /// re-poll until the device agrees or the verification window closes.
    ///
    /// A failed write is logged and verification still runs.
    pub async fn set_state(&self, desired: bool) -> CommandOutcome {
        let _serial = self.command_lock.lock().await;
        let started = Instant::now();
        let key = self.description.key;

        let outcome = {
            let _override = OverrideGuard::engage(&self.phase, desired);
            let cancel = self.coordinator.cancellation().clone();

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(switch = key, "command abandoned, coordinator shut down");
                    CommandOutcome::Cancelled
                }
                outcome = self.command_and_verify(desired, started) => outcome,
            }
        };

        match outcome {
            CommandOutcome::Converged { polls, elapsed_ms } => {
                info!(switch = key, desired, polls, elapsed_ms, "switch state confirmed");
            }
            CommandOutcome::TimedOut { polls } => {
                warn!(
                    switch = key,
                    desired,
                    polls,
                    "polling timeout; device state may not match requested state"
                );
            }
            CommandOutcome::Cancelled => {}
        }

        self.last_outcome.send_replace(Some(outcome));
        outcome
    }

    async fn command_and_verify(&self, desired: bool, started: Instant) -> CommandOutcome {
        let endpoint = self.coordinator.endpoint();
        if let Err(e) = self
            .coordinator
            .client()
            .send_command(&endpoint, self.description.command_path, desired)
            .await
        {
            error!(
                switch = self.description.key,
                path = self.description.command_path,
                error = %e,
                "failed to send command, verifying anyway"
            );
        }

        match tokio::time::timeout(self.verify_timeout, self.poll_until(desired)).await {
            Ok(polls) => CommandOutcome::Converged {
                polls,
                elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            },
            Err(_) => CommandOutcome::TimedOut {
                polls: match self.phase() {
                    SwitchPhase::Polling { attempt, .. } => attempt,
                    _ => 0,
                },
            },
        }
    }

    /// Refresh, then read the result of that refresh, until it matches.
    /// Failed polls are retried, never counted as a mismatch.
    async fn poll_until(&self, desired: bool) -> u32 {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.phase
                .send_replace(SwitchPhase::Polling { desired, attempt });

            match self.coordinator.refresh().await {
                Ok(payload) if self.description.read(&payload) == desired => return attempt,
                Ok(_) => {}
                Err(err) => {
                    debug!(switch = self.description.key, error = %err, "verification poll failed");
                }
            }

            tokio::time::sleep(self.verify_interval).await;
        }
    }
}

impl SwitchDescription {
    /// Interpret this switch's status field in `payload`. Missing is off.
    pub fn read(&self, payload: &Payload) -> bool {
        lookup_scoped(payload, self.scope, self.key).is_some_and(coerce_bool)
    }
}

/// Shared handle type used by [`Device`](crate::Device).
pub type SharedSwitch = Arc<SwitchController>;
