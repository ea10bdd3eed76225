//! Desktop simulator for the irrigo-rs irrigation controller.
//!
//! Runs the real [`Controller`] loop against a simulated garden: soil dries
//! out over time, rain showers come and go, and the pump wets the soil while
//! it runs. Telemetry is printed instead of uploaded.
//!
//! Set `RUST_LOG=debug` to see every relay write and skipped upload.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embassy_executor::Spawner;
use embedded_hal::digital::{ErrorType, OutputPin};
use log::{error, info};

use irrigo_core::config::{CONNECT_POLICY, ChannelConfig, ControllerConfig};
use irrigo_core::network::{Network, NetworkError};
use irrigo_core::sensors::{AnalogInput, ClimateSample, ClimateSensor, SensorError, SensorReader};
use irrigo_core::telemetry::{TelemetryError, TelemetryReporter, TelemetryTransport};
use irrigo_core::{Controller, Polarity, PumpRelay};

// ---------------------------------------------------------------------------
// Garden model
// ---------------------------------------------------------------------------

/// Soil moisture lost per tick to evaporation.
const EVAPORATION: f32 = 0.03;
/// Soil moisture gained per tick while the pump runs.
const PUMP_FLOW: f32 = 0.12;
/// Soil moisture gained per tick while it rains.
const RAIN_FLOW: f32 = 0.06;

/// Every n-th climate measurement fails, like a flaky I2C bus.
const CLIMATE_FAILURE_PERIOD: u32 = 7;
/// Every n-th upload is answered with 503.
const UPLOAD_FAILURE_PERIOD: u32 = 5;

#[derive(Debug, Default)]
struct Garden {
    step: u32,
    /// 0.0 (bone dry) to 1.0 (waterlogged).
    moisture: f32,
    pump_running: bool,
}

impl Garden {
    fn is_raining(&self) -> bool {
        (self.step as f32 / 12.0).sin() > 0.7
    }

    /// Advance one tick. Called once per soil reading.
    fn advance(&mut self) {
        self.step += 1;
        let mut moisture = self.moisture - EVAPORATION;
        if self.pump_running {
            moisture += PUMP_FLOW;
        }
        if self.is_raining() {
            moisture += RAIN_FLOW;
        }
        self.moisture = moisture.clamp(0.0, 1.0);
    }

    /// Rain probe: low while wet.
    fn rain_raw(&self) -> u16 {
        if self.is_raining() { 350 } else { 1_100 }
    }

    /// Soil probe: high while dry.
    fn soil_raw(&self) -> u16 {
        (400.0 + (1.0 - self.moisture) * 800.0) as u16
    }

    fn climate(&self) -> ClimateSample {
        let t = self.step as f32;
        ClimateSample {
            temperature_c: 22.0 + 4.0 * (t / 40.0).sin(),
            humidity_percent: if self.is_raining() { 85.0 } else { 45.0 + 5.0 * (t / 25.0).cos() },
        }
    }
}

type SharedGarden = Rc<RefCell<Garden>>;

// ---------------------------------------------------------------------------
// Simulated hardware
// ---------------------------------------------------------------------------

struct RainProbe(SharedGarden);

impl AnalogInput for RainProbe {
    fn read(&mut self) -> Result<u16, SensorError> {
        Ok(self.0.borrow().rain_raw())
    }
}

struct SoilProbe(SharedGarden);

impl AnalogInput for SoilProbe {
    fn read(&mut self) -> Result<u16, SensorError> {
        let mut garden = self.0.borrow_mut();
        garden.advance();
        Ok(garden.soil_raw())
    }
}

struct ClimateProbe {
    garden: SharedGarden,
    reads: u32,
}

impl ClimateSensor for ClimateProbe {
    async fn measure(&mut self) -> Result<ClimateSample, SensorError> {
        self.reads += 1;
        if self.reads % CLIMATE_FAILURE_PERIOD == 0 {
            return Err(SensorError::Timeout {
                sensor: "simulated climate",
                operation: "measure",
            });
        }
        Ok(self.garden.borrow().climate())
    }
}

/// Relay coil: high runs the pump.
struct PumpPin(SharedGarden);

impl ErrorType for PumpPin {
    type Error = Infallible;
}

impl OutputPin for PumpPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().pump_running = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().pump_running = true;
        Ok(())
    }
}

/// Prints update bodies instead of posting them.
#[derive(Default)]
struct ConsoleTransport {
    uploads: u32,
}

impl TelemetryTransport for ConsoleTransport {
    async fn submit(
        &mut self,
        channel: &ChannelConfig<'_>,
        body: &str,
    ) -> Result<u16, TelemetryError> {
        self.uploads += 1;
        info!("[channel {}] {}", channel.id, body);
        if self.uploads % UPLOAD_FAILURE_PERIOD == 0 {
            Ok(503)
        } else {
            Ok(200)
        }
    }
}

/// Access point that refuses the first association.
#[derive(Default)]
struct FlakyNetwork {
    attempts: u32,
}

impl Network for FlakyNetwork {
    async fn connect(&mut self) -> Result<(), NetworkError> {
        self.attempts += 1;
        if self.attempts == 1 {
            Err(NetworkError::Association {
                details: "simulated access point busy",
            })
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

const SIMULATED_CHANNEL: ChannelConfig<'static> = ChannelConfig {
    id: 0,
    api_key: "SIMULATOR",
};

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("irrigo-simulator starting");

    let garden = Rc::new(RefCell::new(Garden {
        moisture: 0.4,
        ..Garden::default()
    }));

    let reader = SensorReader::new(
        RainProbe(garden.clone()),
        SoilProbe(garden.clone()),
        ClimateProbe {
            garden: garden.clone(),
            reads: 0,
        },
    );

    let pump = match PumpRelay::new(PumpPin(garden.clone()), Polarity::ActiveHigh) {
        Ok(pump) => pump,
        Err(e) => {
            error!("Relay init failed: {}", e);
            return;
        }
    };

    let config = ControllerConfig::default();
    let mut controller = Controller::new(reader, pump, &config);

    let reporter = TelemetryReporter::new(
        ConsoleTransport::default(),
        SIMULATED_CHANNEL,
        config.upload_interval,
        config.upload_timeout,
    );
    let mut network = FlakyNetwork::default();
    controller.connect(&mut network, &CONNECT_POLICY, reporter).await;

    controller.run(Some(&mut network)).await
}
