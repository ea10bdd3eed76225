//! Hardware initialization for the irrigation controller
//!
//! Pin map (ESP32-S3 DevKit):
//! - Rain sensor (analog): GPIO1 / ADC1
//! - Soil sensor (analog): GPIO2 / ADC1
//! - Relay (pump):         GPIO5
//! - I2C (SHT40):          SDA=GPIO8, SCL=GPIO9

use core::cell::RefCell;

use esp_hal::Blocking;
use esp_hal::analog::adc::{self, Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::i2c::master::{Config as I2cConfig, ConfigError, I2c};
use esp_hal::peripherals::{ADC1, GPIO1, GPIO2, GPIO5, GPIO8, GPIO9, I2C0};
use esp_hal::time::Rate;
use irrigo_core::actuator::{ActuatorError, Polarity, PumpRelay};
use irrigo_core::sensors::{self, AnalogInput, SensorError};
use log::{error, info};
use static_cell::StaticCell;

/// The relay board switches on a high input.
pub const RELAY_POLARITY: Polarity = Polarity::ActiveHigh;

/// ADC1 one-shot conversions are 12 bits wide (0..=4095 at 11 dB).
const ADC_BITS: u32 = 12;

pub type SensorAdc = Adc<'static, ADC1<'static>, Blocking>;

/// One ADC1 channel. Both probes share the converter, one conversion at a time.
pub struct AnalogChannel<PIN> {
    name: &'static str,
    adc: &'static RefCell<SensorAdc>,
    pin: AdcPin<PIN, ADC1<'static>>,
}

impl<PIN: adc::AdcChannel> AnalogInput for AnalogChannel<PIN> {
    fn read(&mut self) -> Result<u16, SensorError> {
        let mut adc = self.adc.try_borrow_mut().map_err(|_| SensorError::ReadFailed {
            sensor: self.name,
            operation: "oneshot conversion",
            details: "ADC already in use",
        })?;

        let raw = nb::block!(adc.read_oneshot(&mut self.pin)).map_err(|()| {
            error!("{}: ADC conversion failed", self.name);
            SensorError::ReadFailed {
                sensor: self.name,
                operation: "oneshot conversion",
                details: "ADC returned an error",
            }
        })?;

        // Thresholds are 10-bit values
        Ok(sensors::normalize(raw, ADC_BITS))
    }
}

/// Configure ADC1 with the rain and soil probes at full-scale attenuation.
pub fn init_analog(
    adc1: ADC1<'static>,
    rain_pin: GPIO1<'static>,
    soil_pin: GPIO2<'static>,
) -> (AnalogChannel<GPIO1<'static>>, AnalogChannel<GPIO2<'static>>) {
    let mut config = AdcConfig::new();
    let rain = config.enable_pin(rain_pin, Attenuation::_11dB);
    let soil = config.enable_pin(soil_pin, Attenuation::_11dB);

    static ADC1_CELL: StaticCell<RefCell<SensorAdc>> = StaticCell::new();
    let adc = ADC1_CELL.init(RefCell::new(Adc::new(adc1, config)));

    info!("ADC1 ready (rain=GPIO1, soil=GPIO2)");

    (
        AnalogChannel {
            name: "rain sensor",
            adc,
            pin: rain,
        },
        AnalogChannel {
            name: "soil sensor",
            adc,
            pin: soil,
        },
    )
}

/// Take the relay pin and drive the pump off before anything else runs.
pub fn init_pump(relay_pin: GPIO5<'static>) -> Result<PumpRelay<Output<'static>>, ActuatorError> {
    let initial = match RELAY_POLARITY {
        Polarity::ActiveHigh => Level::Low,
        Polarity::ActiveLow => Level::High,
    };
    let pin = Output::new(relay_pin, initial, OutputConfig::default());
    PumpRelay::new(pin, RELAY_POLARITY)
}

/// Initialize the I2C bus hardware
///
/// Creates the I2C peripheral for the climate sensor at 100 kHz.
pub fn create_i2c_bus(
    i2c0: I2C0<'static>,
    sda: GPIO8<'static>,
    scl: GPIO9<'static>,
) -> Result<I2c<'static, esp_hal::Async>, ConfigError> {
    let bus = I2c::new(i2c0, I2cConfig::default().with_frequency(Rate::from_khz(100)))?
        .with_sda(sda)
        .with_scl(scl)
        .into_async();

    info!("I2C bus initialized on GPIO8/GPIO9");
    Ok(bus)
}
