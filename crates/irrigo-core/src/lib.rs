//! Hardware-independent core library for irrigo-rs
//!
//! This crate contains all platform-agnostic logic for the irrigation
//! controller: sensor trait definitions, the irrigation policy, the pump
//! relay driver, the rate-limited telemetry reporter, network bring-up and
//! the control loop that ties them together.
//!
//! It is `#![no_std]` so it compiles on both embedded targets (ESP32-S3) and
//! desktop hosts (for the simulator and tests).

#![cfg_attr(not(test), no_std)]

pub mod actuator;
pub mod config;
pub mod controller;
pub mod network;
pub mod policy;
pub mod reading;
pub mod sensors;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

pub use actuator::{ActuatorError, Polarity, PumpRelay};
pub use controller::{Controller, ControllerError, RunState, TickReport};
pub use network::{ConnectPolicy, Network, NetworkError};
pub use policy::{Decision, Thresholds};
pub use reading::Reading;
pub use sensors::{AnalogInput, ClimateSample, ClimateSensor, Sample, SensorError, SensorReader};
pub use telemetry::{TelemetryError, TelemetryReporter, TelemetryTransport, UploadResult};
