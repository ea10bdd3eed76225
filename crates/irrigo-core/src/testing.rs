//! Hardware stand-ins shared by the unit tests.
//!
//! Scripted mocks replay their values in order and then keep returning the
//! last one.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use crate::config::ChannelConfig;
use crate::network::{Network, NetworkError};
use crate::sensors::{AnalogInput, ClimateSample, ClimateSensor, SensorError};
use crate::telemetry::{TelemetryError, TelemetryTransport};

struct Script<T: Clone> {
    items: VecDeque<T>,
    last: Option<T>,
}

impl<T: Clone> Script<T> {
    fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
            last: None,
        }
    }

    fn next(&mut self) -> Option<T> {
        if let Some(item) = self.items.pop_front() {
            self.last = Some(item.clone());
        }
        self.last.clone()
    }
}

pub struct MockAnalog {
    script: Script<Result<u16, SensorError>>,
}

impl MockAnalog {
    pub const ERROR: SensorError = SensorError::ReadFailed {
        sensor: "mock ADC",
        operation: "oneshot conversion",
        details: "scripted failure",
    };

    pub fn new(values: impl IntoIterator<Item = u16>) -> Self {
        Self::sequence(values.into_iter().map(Ok))
    }

    pub fn sequence(results: impl IntoIterator<Item = Result<u16, SensorError>>) -> Self {
        Self {
            script: Script::new(results),
        }
    }

    pub fn failing() -> Self {
        Self::sequence([Err(Self::ERROR)])
    }
}

impl AnalogInput for MockAnalog {
    fn read(&mut self) -> Result<u16, SensorError> {
        self.script.next().unwrap_or(Err(Self::ERROR))
    }
}

pub struct MockClimate {
    script: Script<Result<(f32, f32), SensorError>>,
}

impl MockClimate {
    pub const ERROR: SensorError = SensorError::Timeout {
        sensor: "mock climate",
        operation: "measure",
    };

    pub fn new(results: impl IntoIterator<Item = Result<(f32, f32), SensorError>>) -> Self {
        Self {
            script: Script::new(results),
        }
    }

    pub fn failing() -> Self {
        Self::new([Err(Self::ERROR)])
    }
}

impl ClimateSensor for MockClimate {
    async fn measure(&mut self) -> Result<ClimateSample, SensorError> {
        let (temperature_c, humidity_percent) = self.script.next().unwrap_or(Err(Self::ERROR))?;
        Ok(ClimateSample {
            temperature_c,
            humidity_percent,
        })
    }
}

#[derive(Debug)]
pub struct MockPinError;

impl digital::Error for MockPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Default)]
struct PinState {
    level: Option<bool>,
    writes: usize,
    transitions: usize,
    failing: bool,
}

/// Output pin recording what was written. Clones share state.
#[derive(Clone, Default)]
pub struct MockPin {
    state: Rc<RefCell<PinState>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> Option<bool> {
        self.state.borrow().level
    }

    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }

    /// Number of physical level changes, not counting the first write.
    pub fn transitions(&self) -> usize {
        self.state.borrow().transitions
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.borrow_mut().failing = failing;
    }

    fn write(&mut self, high: bool) -> Result<(), MockPinError> {
        let mut state = self.state.borrow_mut();
        if state.failing {
            return Err(MockPinError);
        }
        if state.level.is_some_and(|level| level != high) {
            state.transitions += 1;
        }
        state.level = Some(high);
        state.writes += 1;
        Ok(())
    }
}

impl ErrorType for MockPin {
    type Error = MockPinError;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

#[derive(Default)]
struct TransportLog {
    bodies: Vec<String>,
    channels: Vec<u32>,
}

/// Telemetry transport answering with scripted status codes (200 by default).
#[derive(Clone)]
pub struct MockTransport {
    responses: Rc<RefCell<VecDeque<Result<u16, TelemetryError>>>>,
    log: Rc<RefCell<TransportLog>>,
    hang: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_responses([])
    }

    pub fn with_responses(
        responses: impl IntoIterator<Item = Result<u16, TelemetryError>>,
    ) -> Self {
        Self {
            responses: Rc::new(RefCell::new(responses.into_iter().collect())),
            log: Rc::default(),
            hang: false,
        }
    }

    /// Never answers.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new()
        }
    }

    pub fn submissions(&self) -> usize {
        self.log.borrow().bodies.len()
    }

    pub fn last_body(&self) -> Option<String> {
        self.log.borrow().bodies.last().cloned()
    }

    pub fn last_channel(&self) -> Option<u32> {
        self.log.borrow().channels.last().copied()
    }
}

impl TelemetryTransport for MockTransport {
    async fn submit(
        &mut self,
        channel: &ChannelConfig<'_>,
        body: &str,
    ) -> Result<u16, TelemetryError> {
        {
            let mut log = self.log.borrow_mut();
            log.bodies.push(body.into());
            log.channels.push(channel.id);
        }
        if self.hang {
            core::future::pending::<()>().await;
        }
        self.responses.borrow_mut().pop_front().unwrap_or(Ok(200))
    }
}

/// Network whose connect attempts follow a script. Once the script runs out
/// every further attempt fails.
pub struct MockNetwork {
    script: VecDeque<Option<Result<(), NetworkError>>>,
    attempts: u32,
}

impl MockNetwork {
    pub fn new(results: impl IntoIterator<Item = Result<(), NetworkError>>) -> Self {
        Self {
            script: results.into_iter().map(Some).collect(),
            attempts: 0,
        }
    }

    pub fn always_failing() -> Self {
        Self::new([])
    }

    /// First attempt never completes, then follow `results`.
    pub fn hanging_then(results: impl IntoIterator<Item = Result<(), NetworkError>>) -> Self {
        let mut network = Self::new(results);
        network.script.push_front(None);
        network
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Network for MockNetwork {
    async fn connect(&mut self) -> Result<(), NetworkError> {
        self.attempts += 1;
        match self.script.pop_front() {
            Some(Some(result)) => result,
            Some(None) => core::future::pending().await,
            None => Err(NetworkError::Association {
                details: "access point not found",
            }),
        }
    }
}
