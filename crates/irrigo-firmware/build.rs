//! Bakes the secrets from `.env` (or the build environment) into
//! `$OUT_DIR/secrets.rs` as plain constants.

use std::env;
use std::fs;
use std::path::PathBuf;

const SECRETS: [&str; 4] = [
    "IRRIGO_WIFI_SSID",
    "IRRIGO_WIFI_PASSWORD",
    "IRRIGO_CHANNEL_ID",
    "IRRIGO_API_KEY",
];

fn main() {
    if let Err(e) = dotenvy::dotenv() {
        println!("cargo:warning=no .env loaded ({e}), using build environment only");
    }

    let var = |key: &str| env::var(key).unwrap_or_default();

    let channel_id = var("IRRIGO_CHANNEL_ID");
    let channel_id: u32 = if channel_id.is_empty() {
        0
    } else {
        channel_id
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("IRRIGO_CHANNEL_ID must be a number: {e}"))
    };

    let secrets = format!(
        "pub const WIFI_SSID: &str = {:?};\n\
         pub const WIFI_PASSWORD: &str = {:?};\n\
         pub const CHANNEL_ID: u32 = {};\n\
         pub const API_KEY: &str = {:?};\n",
        var("IRRIGO_WIFI_SSID"),
        var("IRRIGO_WIFI_PASSWORD"),
        channel_id,
        var("IRRIGO_API_KEY"),
    );

    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out.join("secrets.rs"), secrets).expect("failed to write secrets.rs");

    for key in SECRETS {
        println!("cargo:rerun-if-env-changed={key}");
    }
    println!("cargo:rerun-if-changed=.env");

    println!("cargo:rustc-link-arg=-Tlinkall.x");
}
