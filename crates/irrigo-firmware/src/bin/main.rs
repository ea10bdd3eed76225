#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::Output;
use esp_hal::timer::timg::TimerGroup;
use irrigo_core::config::{CONNECT_POLICY, ControllerConfig};
use irrigo_core::sensors::{SensorReader, Sht40Sensor};
use irrigo_core::telemetry::TelemetryReporter;
use irrigo_core::{Controller, RunState};
use irrigo_firmware::hardware::{self, AnalogChannel};
use irrigo_firmware::network::{WifiLink, init_wifi};
use irrigo_firmware::secrets;
use irrigo_firmware::telemetry::HttpTransport;
use log::{error, info, warn};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

type RainChannel = AnalogChannel<esp_hal::peripherals::GPIO1<'static>>;
type SoilChannel = AnalogChannel<esp_hal::peripherals::GPIO2<'static>>;
type Climate = Sht40Sensor<esp_hal::i2c::master::I2c<'static, esp_hal::Async>>;
type Irrigator =
    Controller<'static, RainChannel, SoilChannel, Climate, Output<'static>, HttpTransport>;

/// Park forever after a fault that leaves the board unable to irrigate.
async fn halt(reason: &str) -> ! {
    error!("{}; halting", reason);
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    // Relay first so the pump is off as early as possible.
    let pump = match hardware::init_pump(peripherals.GPIO5) {
        Ok(pump) => pump,
        Err(e) => {
            error!("Relay init failed: {}", e);
            halt("pump relay unavailable").await
        }
    };

    let i2c = hardware::create_i2c_bus(peripherals.I2C0, peripherals.GPIO8, peripherals.GPIO9);
    let i2c = match i2c {
        Ok(bus) => bus,
        Err(e) => {
            error!("I2C bus configuration failed: {:?}", e);
            halt("I2C unavailable").await
        }
    };
    let climate = Sht40Sensor::new(i2c);

    let (rain, soil) =
        hardware::init_analog(peripherals.ADC1, peripherals.GPIO1, peripherals.GPIO2);

    let controller_config = ControllerConfig::DEFAULT;
    let mut controller: Irrigator = Controller::new(
        SensorReader::new(rain, soil, climate),
        pump,
        &controller_config,
    );

    // Dropping the link drops its WifiController, which deinitializes the
    // radio. It must stay bound here for as long as the loop runs.
    let mut link: Option<WifiLink> = None;

    match init_wifi(spawner, peripherals.WIFI, secrets::WIFI) {
        Ok((wifi_link, stack)) => {
            let link = link.insert(wifi_link);
            let reporter = TelemetryReporter::new(
                HttpTransport::new(stack),
                secrets::CHANNEL,
                controller_config.upload_interval,
                controller_config.upload_timeout,
            );
            if controller.connect(link, &CONNECT_POLICY, reporter).await == RunState::Offline {
                warn!("Continuing without telemetry until the network comes back");
            }
        }
        Err(e) => error!("Wi-Fi init failed: {}", e),
    }

    controller.run(link.as_mut()).await
}
