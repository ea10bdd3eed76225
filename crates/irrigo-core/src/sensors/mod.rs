#[cfg(feature = "sensor-sht40")]
pub mod sht40;

use core::future::Future;

use log::warn;
use thiserror_no_std::Error;

use crate::config::THRESHOLD_RESOLUTION_BITS;

#[cfg(feature = "sensor-sht40")]
pub use sht40::Sht40Sensor;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor}: {operation} failed ({details})")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
    #[error("{sensor}: timed out during {operation}")]
    Timeout {
        sensor: &'static str,
        operation: &'static str,
    },
}

/// One-shot analog input (rain or soil probe behind an ADC channel).
pub trait AnalogInput {
    /// Perform a single conversion and return the raw sample.
    fn read(&mut self) -> Result<u16, SensorError>;
}

/// Combined temperature/humidity sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateSample {
    pub temperature_c: f32,
    pub humidity_percent: f32,
}

/// Trait for temperature/humidity sensors.
pub trait ClimateSensor {
    fn measure(&mut self) -> impl Future<Output = Result<ClimateSample, SensorError>>;
}

/// Raw values sampled during one tick, before the policy runs.
///
/// Climate values are `None` when the sensor could not produce a valid
/// sample. They are never replaced by a default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub rain_raw: u16,
    pub soil_raw: u16,
    pub temperature_c: Option<f32>,
    pub humidity_percent: Option<f32>,
}

/// Reads all irrigation sensors.
pub struct SensorReader<R, S, C> {
    rain: R,
    soil: S,
    climate: C,
}

impl<R, S, C> SensorReader<R, S, C>
where
    R: AnalogInput,
    S: AnalogInput,
    C: ClimateSensor,
{
    pub const fn new(rain: R, soil: S, climate: C) -> Self {
        Self {
            rain,
            soil,
            climate,
        }
    }

    /// Sample every sensor once.
    ///
    /// Analog failures fail the whole sample because the policy cannot run
    /// without them. A climate failure only blanks the climate values.
    pub async fn sample(&mut self) -> Result<Sample, SensorError> {
        let rain_raw = self.rain.read()?;
        let soil_raw = self.soil.read()?;

        let (temperature_c, humidity_percent) = match self.climate.measure().await {
            Ok(climate) => (
                finite(climate.temperature_c),
                finite(climate.humidity_percent),
            ),
            Err(e) => {
                warn!("Climate sensor unavailable this tick: {}", e);
                (None, None)
            }
        };

        Ok(Sample {
            rain_raw,
            soil_raw,
            temperature_c,
            humidity_percent,
        })
    }
}

/// Rescale a raw sample taken by an `adc_bits`-wide converter to the
/// resolution the thresholds are expressed in (10 bits).
///
/// A 12-bit ESP32 sample of 3200 becomes 800.
pub const fn normalize(raw: u16, adc_bits: u32) -> u16 {
    if adc_bits >= THRESHOLD_RESOLUTION_BITS {
        raw >> (adc_bits - THRESHOLD_RESOLUTION_BITS)
    } else {
        raw << (THRESHOLD_RESOLUTION_BITS - adc_bits)
    }
}

fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}
