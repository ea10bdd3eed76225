//! Wi-Fi station bring-up and the embassy-net stack
//!
//! [`init_wifi`] only prepares the radio and the IP stack. Joining the
//! access point happens through [`WifiLink`], which the controller drives
//! with a bounded retry policy.

use embassy_executor::{SpawnError, Spawner};
use embassy_net::{Runner, Stack, StackResources};
use esp_hal::peripherals::WIFI;
use esp_hal::rng::Rng;
use esp_radio::Controller;
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiError};
use irrigo_core::config::WifiConfig;
use irrigo_core::network::{Network, NetworkError};
use log::{debug, info, warn};
use static_cell::StaticCell;
use thiserror_no_std::Error;

/// DHCP, DNS and the single TCP socket used for telemetry.
const SOCKET_COUNT: usize = 3;

#[derive(Error, Debug)]
pub enum WifiInitError {
    #[error("radio initialization failed")]
    Radio,
    #[error("Wi-Fi controller creation failed: {0:?}")]
    Controller(WifiError),
    #[error("failed to spawn network task: {0:?}")]
    Spawn(SpawnError),
}

/// Bring up the radio, create the network stack and start its runner task.
///
/// Returns the station link (not yet associated) and the stack handle.
pub fn init_wifi(
    spawner: Spawner,
    wifi: WIFI<'static>,
    credentials: WifiConfig<'static>,
) -> Result<(WifiLink, Stack<'static>), WifiInitError> {
    static RADIO: StaticCell<Controller<'static>> = StaticCell::new();
    let radio = RADIO.init(esp_radio::init().map_err(|_| WifiInitError::Radio)?);

    let (controller, interfaces) = esp_radio::wifi::new(radio, wifi, Default::default())
        .map_err(WifiInitError::Controller)?;

    let rng = Rng::new();
    let seed = (u64::from(rng.random()) << 32) | u64::from(rng.random());

    static RESOURCES: StaticCell<StackResources<SOCKET_COUNT>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::new()),
        seed,
    );

    spawner.spawn(net_task(runner).map_err(WifiInitError::Spawn)?);
    info!("Network stack created, station idle");

    Ok((
        WifiLink {
            controller,
            stack,
            credentials,
            started: false,
        },
        stack,
    ))
}

/// Station-mode Wi-Fi link. A connect attempt covers association plus DHCP.
pub struct WifiLink {
    controller: WifiController<'static>,
    stack: Stack<'static>,
    credentials: WifiConfig<'static>,
    started: bool,
}

impl WifiLink {
    async fn start(&mut self) -> Result<(), NetworkError> {
        if self.started {
            return Ok(());
        }

        let client = ClientConfig::default()
            .with_ssid(self.credentials.ssid.into())
            .with_password(self.credentials.password.into());

        self.controller
            .set_config(&ModeConfig::Client(client))
            .map_err(|e| {
                warn!("Wi-Fi set_config failed: {:?}", e);
                NetworkError::Configuration {
                    details: "invalid station configuration",
                }
            })?;

        self.controller.start_async().await.map_err(|e| {
            warn!("Wi-Fi start failed: {:?}", e);
            NetworkError::Association {
                details: "radio failed to start",
            }
        })?;

        self.started = true;
        info!("Wi-Fi started in station mode");
        Ok(())
    }
}

impl Network for WifiLink {
    async fn connect(&mut self) -> Result<(), NetworkError> {
        self.start().await?;

        debug!("Joining '{}'", self.credentials.ssid);
        self.controller.connect_async().await.map_err(|e| {
            warn!("Wi-Fi association failed: {:?}", e);
            NetworkError::Association {
                details: "access point rejected or not found",
            }
        })?;

        self.stack.wait_link_up().await;
        self.stack.wait_config_up().await;

        match self.stack.config_v4() {
            Some(config) => info!("Wi-Fi connected, address {}", config.address),
            None => info!("Wi-Fi connected"),
        }
        Ok(())
    }
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}
