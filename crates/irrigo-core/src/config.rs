//! Compile-time configuration for the irrigation controller
//!
//! Everything here is a constant. Secrets (Wi-Fi credentials, telemetry
//! channel and key) are not defined in this crate; the firmware injects them
//! at build time and hands them over as [`WifiConfig`] / [`ChannelConfig`].

use embassy_time::Duration;

use crate::network::ConnectPolicy;
use crate::policy::Thresholds;

/// Resolution the thresholds are expressed in. Samples from wider ADCs are
/// shifted down to this with [`crate::sensors::normalize`].
pub const THRESHOLD_RESOLUTION_BITS: u32 = 10;

/// Rain sensor reading below this value means it is raining.
pub const RAIN_THRESHOLD: u16 = 800;

/// Soil sensor reading above this value means the soil is dry.
pub const SOIL_MOISTURE_THRESHOLD: u16 = 800;

/// Minimum time between two telemetry uploads (ThingSpeak free tier limit).
pub const UPLOAD_INTERVAL: Duration = Duration::from_millis(15_000);

/// Upper bound for a single upload attempt, connect to response.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between two control loop ticks.
pub const TICK_DELAY: Duration = Duration::from_millis(2_000);

/// ThingSpeak update endpoint. Plain HTTP, the write key travels in the body.
pub const TELEMETRY_URL: &str = "http://api.thingspeak.com/update";

/// While offline, how often a single reconnect attempt is made.
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(60);

/// Network bring-up bounds used at startup.
pub const CONNECT_POLICY: ConnectPolicy = ConnectPolicy {
    attempt_timeout: Duration::from_secs(20),
    initial_backoff: Duration::from_secs(1),
    max_backoff: Duration::from_secs(30),
    max_attempts: 8,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct WifiConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
}

/// Remote telemetry channel: numeric id plus write API key.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig<'a> {
    pub id: u32,
    pub api_key: &'a str,
}

/// Timing and policy parameters of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub thresholds: Thresholds,
    pub tick_delay: Duration,
    pub upload_interval: Duration,
    pub upload_timeout: Duration,
    pub reconnect_interval: Duration,
}

impl ControllerConfig {
    pub const DEFAULT: Self = Self {
        thresholds: Thresholds::DEFAULT,
        tick_delay: TICK_DELAY,
        upload_interval: UPLOAD_INTERVAL,
        upload_timeout: UPLOAD_TIMEOUT,
        reconnect_interval: RECONNECT_INTERVAL,
    };
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
