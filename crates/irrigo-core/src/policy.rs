//! Irrigation policy
//!
//! Converts the two raw analog samples into a pump decision. Pure and
//! stateless: no hysteresis, no debounce.

use crate::config::{RAIN_THRESHOLD, SOIL_MOISTURE_THRESHOLD};

/// Threshold pair used by [`Thresholds::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Rain readings strictly below this are "raining".
    pub rain: u16,
    /// Soil readings strictly above this are "dry".
    pub soil_moisture: u16,
}

impl Thresholds {
    pub const DEFAULT: Self = Self {
        rain: RAIN_THRESHOLD,
        soil_moisture: SOIL_MOISTURE_THRESHOLD,
    };

    /// Decide whether the pump should run for the given raw samples.
    ///
    /// Values exactly at a threshold are neither raining nor dry.
    pub const fn decide(&self, rain_raw: u16, soil_raw: u16) -> Decision {
        let is_raining = rain_raw < self.rain;
        let soil_is_dry = soil_raw > self.soil_moisture;

        Decision {
            is_raining,
            soil_is_dry,
            pump_on: soil_is_dry && !is_raining,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Outcome of the policy for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Decision {
    pub is_raining: bool,
    pub soil_is_dry: bool,
    pub pump_on: bool,
}

/// [`Thresholds::decide`] with the compile-time default thresholds.
pub const fn decide(rain_raw: u16, soil_raw: u16) -> Decision {
    Thresholds::DEFAULT.decide(rain_raw, soil_raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rain_threshold_is_strict() {
        assert!(decide(0, 0).is_raining);
        assert!(decide(RAIN_THRESHOLD - 1, 0).is_raining);
        assert!(!decide(RAIN_THRESHOLD, 0).is_raining);
        assert!(!decide(RAIN_THRESHOLD + 1, 0).is_raining);
        assert!(!decide(u16::MAX, 0).is_raining);
    }

    #[test]
    fn test_soil_threshold_is_strict() {
        assert!(!decide(0, 0).soil_is_dry);
        assert!(!decide(0, SOIL_MOISTURE_THRESHOLD).soil_is_dry);
        assert!(decide(0, SOIL_MOISTURE_THRESHOLD + 1).soil_is_dry);
        assert!(decide(0, u16::MAX).soil_is_dry);
    }

    #[test]
    fn test_pump_truth_table() {
        // dry + no rain -> on
        assert!(decide(900, 850).pump_on);
        // dry + rain -> off
        assert!(!decide(700, 850).pump_on);
        // wet + no rain -> off
        assert!(!decide(900, 500).pump_on);
        // wet + rain -> off
        assert!(!decide(700, 500).pump_on);
    }

    #[test]
    fn test_dry_soil_without_rain() {
        let decision = decide(900, 850);

        assert_eq!(
            decision,
            Decision {
                is_raining: false,
                soil_is_dry: true,
                pump_on: true,
            }
        );
    }

    #[test]
    fn test_rain_overrides_dry_soil() {
        let decision = decide(700, 850);

        assert!(decision.is_raining);
        assert!(decision.soil_is_dry);
        assert!(!decision.pump_on);
    }

    #[test]
    fn test_pump_on_implies_dry_and_not_raining() {
        for rain in (0..=1100u16).step_by(50) {
            for soil in (0..=1100u16).step_by(50) {
                let d = decide(rain, soil);
                if d.pump_on {
                    assert!(d.soil_is_dry && !d.is_raining, "rain={rain} soil={soil}");
                }
                assert_eq!(d.pump_on, d.soil_is_dry && !d.is_raining);
            }
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = Thresholds {
            rain: 2000,
            soil_moisture: 3000,
        };

        assert!(thresholds.decide(1999, 3001).is_raining);
        assert!(!thresholds.decide(2000, 3001).is_raining);
        assert!(thresholds.decide(2000, 3001).pump_on);
        assert!(!thresholds.decide(2000, 3000).pump_on);
    }
}
