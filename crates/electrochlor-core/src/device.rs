// ── Device ──
//
// Everything one configured device owns: its coordinator, one switch
// controller per switch row, and the entity snapshots hosts render. Each
// `Device` is independent; hosts managing several devices hold several.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use crate::config::DeviceConfig;
use crate::coordinator::{Coordinator, PollResult};
use crate::entity::{
    BINARY_SENSORS, BinarySensorState, DeviceInfo, SENSORS, SWITCHES, SensorState, SwitchState,
};
use crate::error::CoreError;
use crate::switch::{CommandOutcome, SharedSwitch, SwitchController};

/// A configured device and its entities.
#[derive(Clone)]
pub struct Device {
    config: Arc<ArcSwap<DeviceConfig>>,
    coordinator: Coordinator,
    switches: Arc<[SharedSwitch]>,
}

impl Device {
    /// Build the coordinator and switch controllers. Does NOT poll --
    /// call [`setup()`](Self::setup).
    pub fn new(config: DeviceConfig) -> Result<Self, CoreError> {
        let coordinator = Coordinator::new(&config)?;
        Ok(Self::with_coordinator(config, coordinator))
    }

    pub fn with_coordinator(config: DeviceConfig, coordinator: Coordinator) -> Self {
        let switches = SWITCHES
            .iter()
            .map(|desc| Arc::new(SwitchController::new(desc, coordinator.clone(), &config)))
            .collect();
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            coordinator,
            switches,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// First poll, then the scheduled job. A failed first poll leaves the
    /// device un-started so the host can retry setup later.
    pub async fn setup(&self) -> Result<(), CoreError> {
        self.coordinator.first_refresh().await?;
        self.coordinator.start().await;
        let config = self.config.load();
        info!(
            device = %config.device_id,
            host = %config.host,
            interval = ?config.scan_interval,
            "device ready"
        );
        Ok(())
    }

    /// Stop polling and abandon any pending command verification.
    pub async fn unload(&self) {
        self.coordinator.shutdown().await;
        info!(device = %self.config.load().device_id, "device unloaded");
    }

    /// Apply an edited configuration (address and/or scan interval) and
    /// poll once against it.
    pub async fn reconfigure(&self, config: DeviceConfig) -> PollResult {
        let result = self.coordinator.reconfigure(&config).await;
        self.config.store(Arc::new(config));
        result
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn config(&self) -> Arc<DeviceConfig> {
        self.config.load_full()
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn device_info(&self) -> DeviceInfo {
        let config = self.config.load();
        let data = self.coordinator.data();
        DeviceInfo::new(&config.device_id, &config.host, data.as_deref())
    }

    // ── Entities ─────────────────────────────────────────────────

    pub fn sensors(&self) -> Vec<SensorState> {
        let state = self.coordinator.state();
        let config = self.config.load();
        SENSORS
            .iter()
            .map(|desc| desc.snapshot(&config.device_id, &state))
            .collect()
    }

    pub fn binary_sensors(&self) -> Vec<BinarySensorState> {
        let state = self.coordinator.state();
        let config = self.config.load();
        BINARY_SENSORS
            .iter()
            .map(|desc| desc.snapshot(&config.device_id, &state))
            .collect()
    }

    pub fn switches(&self) -> Vec<SwitchState> {
        let config = self.config.load();
        self.switches
            .iter()
            .map(|switch| switch.snapshot(&config.device_id))
            .collect()
    }

    /// The controller for switch `key` (`pump`, `light`, `valve`, `aux2`).
    pub fn switch(&self, key: &str) -> Result<&SharedSwitch, CoreError> {
        self.switches
            .iter()
            .find(|switch| switch.key() == key)
            .ok_or_else(|| CoreError::UnknownEntity {
                kind: "switch",
                key: key.to_owned(),
            })
    }

    pub async fn turn_on(&self, key: &str) -> Result<CommandOutcome, CoreError> {
        Ok(self.switch(key)?.turn_on().await)
    }

    pub async fn turn_off(&self, key: &str) -> Result<CommandOutcome, CoreError> {
        Ok(self.switch(key)?.turn_off().await)
    }
}
