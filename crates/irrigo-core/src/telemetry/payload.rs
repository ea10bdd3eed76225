//! ThingSpeak channel update payload
//!
//! A channel update carries up to eight numeric fields; this controller uses
//! five of them:
//!
//! | Field    | Value                  |
//! |----------|------------------------|
//! | `field1` | temperature (°C)       |
//! | `field2` | relative humidity (%)  |
//! | `field3` | raw rain sensor value  |
//! | `field4` | raw soil sensor value  |
//! | `field5` | pump state (0 or 1)    |

use core::fmt::Write;

use heapless::String;

use super::TelemetryError;
use crate::reading::Reading;

/// Capacity of an encoded update body.
pub const BODY_CAPACITY: usize = 192;

pub type Body = String<BODY_CAPACITY>;

/// The five values submitted per upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryPayload {
    pub temperature_c: Option<f32>,
    pub humidity_percent: Option<f32>,
    pub rain_raw: u16,
    pub soil_raw: u16,
    pub pump_on: bool,
}

impl From<&Reading> for TelemetryPayload {
    fn from(reading: &Reading) -> Self {
        Self {
            temperature_c: reading.temperature_c(),
            humidity_percent: reading.humidity_percent(),
            rain_raw: reading.rain_raw(),
            soil_raw: reading.soil_raw(),
            pump_on: reading.pump_on(),
        }
    }
}

impl TelemetryPayload {
    /// Encode as an `application/x-www-form-urlencoded` update body.
    ///
    /// Floats carry five decimals. A missing value is sent as an empty field,
    /// which the channel stores as null.
    pub fn encode(&self, api_key: &str) -> Result<Body, TelemetryError> {
        let mut body = Body::new();
        self.write_form(&mut body, api_key)
            .map_err(|_| TelemetryError::PayloadOverflow {
                capacity: BODY_CAPACITY,
            })?;
        Ok(body)
    }

    fn write_form(&self, out: &mut Body, api_key: &str) -> core::fmt::Result {
        out.write_str("api_key=")?;
        write_form_encoded(out, api_key)?;
        write_float(out, 1, self.temperature_c)?;
        write_float(out, 2, self.humidity_percent)?;
        write!(out, "&field3={}", self.rain_raw)?;
        write!(out, "&field4={}", self.soil_raw)?;
        write!(out, "&field5={}", u8::from(self.pump_on))
    }
}

/// Percent-encode everything outside the URL unreserved set.
fn write_form_encoded(out: &mut Body, value: &str) -> core::fmt::Result {
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.write_char(char::from(byte))?;
        } else {
            write!(out, "%{:02X}", byte)?;
        }
    }
    Ok(())
}

fn write_float(out: &mut Body, field: u8, value: Option<f32>) -> core::fmt::Result {
    write!(out, "&field{}=", field)?;
    match value {
        Some(v) => write!(out, "{:.5}", v),
        None => Ok(()),
    }
}
