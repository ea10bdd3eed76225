//! Irrigation control loop
//!
//! The [`Controller`] owns every piece of state that outlives a tick: the
//! sensors, the pump relay and the telemetry reporter (with its upload
//! clock). A tick runs sensor reader → policy → relay → reporter, then the
//! loop sleeps for the fixed tick delay.

use embassy_time::{Duration, Instant, Timer, with_timeout};
use log::{error, info, warn};
use thiserror_no_std::Error;

use crate::actuator::{ActuatorError, PumpRelay};
use crate::config::{CONNECT_POLICY, ControllerConfig};
use crate::network::{self, ConnectPolicy, Network, NetworkError};
use crate::policy::Thresholds;
use crate::reading::Reading;
use crate::sensors::{AnalogInput, ClimateSensor, SensorError, SensorReader};
use crate::telemetry::{TelemetryReporter, TelemetryTransport, UploadResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Bringing the network up. Initial state.
    Connecting,
    /// Network up, irrigating and uploading.
    Running,
    /// Network bring-up gave up. Irrigating without uploads, retrying the
    /// network now and then.
    Offline,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Sensor error: {0}")]
    Sensor(SensorError),
    #[error("Actuator error: {0}")]
    Actuator(ActuatorError),
}

impl From<SensorError> for ControllerError {
    fn from(value: SensorError) -> Self {
        Self::Sensor(value)
    }
}

impl From<ActuatorError> for ControllerError {
    fn from(value: ActuatorError) -> Self {
        Self::Actuator(value)
    }
}

/// What happened during one successful tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub reading: Reading,
    pub upload: UploadResult,
}

pub struct Controller<'a, R, S, C, P, T> {
    reader: SensorReader<R, S, C>,
    pump: PumpRelay<P>,
    reporter: Option<TelemetryReporter<'a, T>>,
    thresholds: Thresholds,
    tick_delay: Duration,
    run_state: RunState,
    attempt_timeout: Duration,
    reconnect_interval: Duration,
    last_reconnect: Instant,
}

impl<'a, R, S, C, P, T> Controller<'a, R, S, C, P, T>
where
    R: AnalogInput,
    S: AnalogInput,
    C: ClimateSensor,
    P: embedded_hal::digital::OutputPin,
    T: TelemetryTransport,
{
    pub fn new(
        reader: SensorReader<R, S, C>,
        pump: PumpRelay<P>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            reader,
            pump,
            reporter: None,
            thresholds: config.thresholds,
            tick_delay: config.tick_delay,
            run_state: RunState::Connecting,
            attempt_timeout: CONNECT_POLICY.attempt_timeout,
            reconnect_interval: config.reconnect_interval,
            last_reconnect: Instant::from_ticks(0),
        }
    }

    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    pub const fn pump(&self) -> &PumpRelay<P> {
        &self.pump
    }

    pub fn reporter(&self) -> Option<&TelemetryReporter<'a, T>> {
        self.reporter.as_ref()
    }

    /// Leave [`RunState::Connecting`].
    ///
    /// The reporter is installed either way. On success the controller is
    /// [`RunState::Running`]. If bring-up gives up it runs
    /// [`RunState::Offline`] until [`Controller::reconnect`] succeeds.
    pub async fn connect<N: Network>(
        &mut self,
        network: &mut N,
        policy: &ConnectPolicy,
        reporter: TelemetryReporter<'a, T>,
    ) -> RunState {
        if self.run_state != RunState::Connecting {
            warn!("connect() called in state {:?}, ignoring", self.run_state);
            return self.run_state;
        }

        self.reporter = Some(reporter);
        self.attempt_timeout = policy.attempt_timeout;

        self.run_state = match network::establish(network, policy).await {
            Ok(_) => RunState::Running,
            Err(e) => {
                error!(
                    "Network unavailable ({}), irrigating offline, retrying every {} s",
                    e,
                    self.reconnect_interval.as_secs()
                );
                RunState::Offline
            }
        };

        info!("Controller state: {:?}", self.run_state);
        self.run_state
    }

    /// While [`RunState::Offline`], make one bounded connect attempt once the
    /// reconnect interval has passed since the previous one.
    ///
    /// Success moves the controller to [`RunState::Running`]. Without a
    /// reporter there is nothing to reconnect for and no attempt is made.
    pub async fn reconnect<N: Network>(&mut self, network: &mut N, now: Instant) -> RunState {
        if self.run_state != RunState::Offline || self.reporter.is_none() {
            return self.run_state;
        }

        let due = now
            .checked_duration_since(self.last_reconnect)
            .is_some_and(|elapsed| elapsed >= self.reconnect_interval);
        if !due {
            return self.run_state;
        }
        self.last_reconnect = now;

        match with_timeout(self.attempt_timeout, network.connect()).await {
            Ok(Ok(())) => {
                info!("Network back, resuming telemetry");
                self.run_state = RunState::Running;
            }
            Ok(Err(e)) => warn!("Reconnect failed: {}", e),
            Err(_) => warn!("Reconnect failed: {}", NetworkError::AttemptTimeout),
        }

        self.run_state
    }

    /// Run one control cycle at time `now`.
    ///
    /// If the sensors cannot be read the pump is switched off and no upload
    /// is attempted. Uploads only happen while [`RunState::Running`].
    pub async fn tick(&mut self, now: Instant) -> Result<TickReport, ControllerError> {
        let sample = match self.reader.sample().await {
            Ok(sample) => sample,
            Err(e) => {
                if let Err(off) = self.pump.set_pump(false) {
                    error!("Could not switch pump off after sensor failure: {}", off);
                }
                return Err(e.into());
            }
        };

        let reading = Reading::new(sample, &self.thresholds);
        info!("{}", reading);

        self.pump.set_pump(reading.pump_on())?;

        let upload = match (self.run_state, self.reporter.as_mut()) {
            (RunState::Running, Some(reporter)) => reporter.maybe_upload(&reading, now).await,
            _ => UploadResult::Skipped,
        };

        Ok(TickReport { reading, upload })
    }

    /// Tick forever. Errors are logged and the loop carries on.
    ///
    /// While offline, `network` (if any) gets a reconnect attempt every
    /// reconnect interval.
    pub async fn run<N: Network>(&mut self, mut network: Option<&mut N>) -> ! {
        if self.run_state == RunState::Connecting {
            warn!("Control loop started before network bring-up, running offline");
            self.run_state = RunState::Offline;
        }

        info!("Control loop running, tick every {} ms", self.tick_delay.as_millis());

        loop {
            if let Some(network) = network.as_deref_mut() {
                self.reconnect(network, Instant::now()).await;
            }
            if let Err(e) = self.tick(Instant::now()).await {
                error!("Tick failed: {}", e);
            }
            Timer::after(self.tick_delay).await;
        }
    }
}
