//! Per-tick reading: raw sensor values plus the policy decision.

use core::fmt;

use crate::policy::{Decision, Thresholds};
use crate::sensors::Sample;

/// Everything known about one tick.
///
/// Built once from a [`Sample`] and never modified afterwards, so the
/// derived flags always agree with the raw values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    sample: Sample,
    decision: Decision,
}

impl Reading {
    pub const fn new(sample: Sample, thresholds: &Thresholds) -> Self {
        Self {
            decision: thresholds.decide(sample.rain_raw, sample.soil_raw),
            sample,
        }
    }

    pub const fn rain_raw(&self) -> u16 {
        self.sample.rain_raw
    }

    pub const fn soil_raw(&self) -> u16 {
        self.sample.soil_raw
    }

    pub const fn temperature_c(&self) -> Option<f32> {
        self.sample.temperature_c
    }

    pub const fn humidity_percent(&self) -> Option<f32> {
        self.sample.humidity_percent
    }

    pub const fn is_raining(&self) -> bool {
        self.decision.is_raining
    }

    pub const fn soil_is_dry(&self) -> bool {
        self.decision.soil_is_dry
    }

    pub const fn pump_on(&self) -> bool {
        self.decision.pump_on
    }

    pub const fn decision(&self) -> Decision {
        self.decision
    }
}

/// One diagnostic line, e.g.
/// `rain=900 (DRY) soil=850 (DRY) temp=21.50°C humidity=40.00% pump=ON`.
impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rain={} ({}) soil={} ({}) temp=",
            self.rain_raw(),
            if self.is_raining() { "RAINING" } else { "DRY" },
            self.soil_raw(),
            if self.soil_is_dry() { "DRY" } else { "WET" },
        )?;
        match self.temperature_c() {
            Some(t) => write!(f, "{:.2}°C", t)?,
            None => f.write_str("n/a")?,
        }
        f.write_str(" humidity=")?;
        match self.humidity_percent() {
            Some(h) => write!(f, "{:.2}%", h)?,
            None => f.write_str("n/a")?,
        }
        write!(f, " pump={}", if self.pump_on() { "ON" } else { "OFF" })
    }
}
