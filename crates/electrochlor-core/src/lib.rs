// electrochlor-core: Polling, command verification, and entities for Electrochlor devices.

pub mod config;
pub mod coordinator;
pub mod device;
pub mod entity;
pub mod error;
pub mod switch;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::DeviceConfig;
pub use coordinator::{Coordinator, CoordinatorState, PollResult};
pub use device::Device;
pub use entity::{
    BinarySensorState, DeviceClass, DeviceInfo, SensorState, SensorValue, SwitchState,
};
pub use error::{CoreError, PollError};
pub use switch::{CommandOutcome, SharedSwitch, SwitchController, SwitchPhase};

pub use electrochlor_api::{DeviceEndpoint, Payload};
