//! Credentials baked in at build time from `.env` (see `build.rs`).

use irrigo_core::config::{ChannelConfig, WifiConfig};

mod generated {
    include!(concat!(env!("OUT_DIR"), "/secrets.rs"));
}

pub use generated::{API_KEY, CHANNEL_ID, WIFI_PASSWORD, WIFI_SSID};

pub const WIFI: WifiConfig<'static> = WifiConfig {
    ssid: WIFI_SSID,
    password: WIFI_PASSWORD,
};

pub const CHANNEL: ChannelConfig<'static> = ChannelConfig {
    id: CHANNEL_ID,
    api_key: API_KEY,
};
