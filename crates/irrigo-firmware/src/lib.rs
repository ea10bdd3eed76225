//! ESP32-S3 firmware-specific modules for irrigo-rs
//!
//! This crate contains hardware-specific code that cannot compile on desktop
//! targets: ESP32 peripheral initialization, ADC channels, Wi-Fi bring-up,
//! the HTTP telemetry transport and build-time credentials.

#![no_std]

pub mod hardware;
pub mod network;
pub mod secrets;
pub mod telemetry;
