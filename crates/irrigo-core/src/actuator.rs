//! Pump relay driver

use embedded_hal::digital::OutputPin;
use log::{debug, error, info};
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    #[error("{actuator}: failed to switch {state}")]
    WriteFailed {
        actuator: &'static str,
        state: &'static str,
    },
}

/// Electrical level that switches the relay on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// Output high = pump on.
    #[default]
    ActiveHigh,
    /// Output low = pump on (inverting driver stage).
    ActiveLow,
}

/// Relay output driving the pump.
///
/// Every call to [`PumpRelay::set_pump`] writes the pin, whether or not the
/// requested state differs from the previous one.
pub struct PumpRelay<P> {
    pin: P,
    polarity: Polarity,
    on: bool,
}

impl<P: OutputPin> PumpRelay<P> {
    /// Take ownership of the relay pin and switch the pump off.
    pub fn new(pin: P, polarity: Polarity) -> Result<Self, ActuatorError> {
        let mut relay = Self {
            pin,
            polarity,
            on: false,
        };
        relay.write(false)?;
        Ok(relay)
    }

    pub fn set_pump(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.write(on)?;

        if on != self.on {
            info!("Pump {}", if on { "ON" } else { "OFF" });
        } else {
            debug!("Pump stays {}", if on { "ON" } else { "OFF" });
        }
        self.on = on;

        Ok(())
    }

    /// Last state successfully written to the relay.
    pub const fn is_on(&self) -> bool {
        self.on
    }

    /// Give the pin back, e.g. to reconfigure it.
    pub fn release(self) -> P {
        self.pin
    }

    fn write(&mut self, on: bool) -> Result<(), ActuatorError> {
        let high = match self.polarity {
            Polarity::ActiveHigh => on,
            Polarity::ActiveLow => !on,
        };
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };

        result.map_err(|e| {
            error!("Relay pin write failed: {:?}", e);
            ActuatorError::WriteFailed {
                actuator: "pump relay",
                state: if on { "on" } else { "off" },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPin;

    #[test]
    fn test_new_switches_pump_off() {
        let pin = MockPin::new();
        let relay = PumpRelay::new(pin.clone(), Polarity::ActiveHigh).unwrap();

        assert!(!relay.is_on());
        assert_eq!(pin.level(), Some(false));
    }

    #[test]
    fn test_active_high_levels() {
        let pin = MockPin::new();
        let mut relay = PumpRelay::new(pin.clone(), Polarity::ActiveHigh).unwrap();

        relay.set_pump(true).unwrap();
        assert_eq!(pin.level(), Some(true));

        relay.set_pump(false).unwrap();
        assert_eq!(pin.level(), Some(false));
    }

    #[test]
    fn test_active_low_levels() {
        let pin = MockPin::new();
        let mut relay = PumpRelay::new(pin.clone(), Polarity::ActiveLow).unwrap();
        assert_eq!(pin.level(), Some(true));

        relay.set_pump(true).unwrap();
        assert_eq!(pin.level(), Some(false));
        assert!(relay.is_on());
    }

    #[test]
    fn test_repeated_state_is_idempotent() {
        let pin = MockPin::new();
        let mut relay = PumpRelay::new(pin.clone(), Polarity::ActiveHigh).unwrap();

        relay.set_pump(true).unwrap();
        let transitions = pin.transitions();

        relay.set_pump(true).unwrap();

        assert_eq!(pin.level(), Some(true));
        assert_eq!(pin.transitions(), transitions);
        // Still written every call, no edge triggering
        assert_eq!(pin.writes(), 3);
    }

    #[test]
    fn test_write_failure_keeps_last_state() {
        let pin = MockPin::new();
        let mut relay = PumpRelay::new(pin.clone(), Polarity::ActiveHigh).unwrap();

        pin.set_failing(true);
        let err = relay.set_pump(true).unwrap_err();

        assert_eq!(
            err,
            ActuatorError::WriteFailed {
                actuator: "pump relay",
                state: "on",
            }
        );
        assert!(!relay.is_on());
    }

    #[test]
    fn test_release_returns_pin() {
        let pin = MockPin::new();
        let relay = PumpRelay::new(pin.clone(), Polarity::ActiveHigh).unwrap();

        let released = relay.release();

        assert_eq!(released.level(), Some(false));
    }
}
