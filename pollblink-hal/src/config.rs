//! Blink timing configuration
//!
//! The blink rate is fixed for the life of the program. It is configured as
//! a tick rate (what the counter was started with) and a half period (how
//! long each pattern is held); the tick threshold the loop polls for is
//! derived from the two.

use core::fmt;

use fugit::{HertzU32, MicrosDurationU32, MicrosDurationU64};

use crate::delay::Threshold;

/// Errors detected while turning a configuration into register values.
///
/// None of these can happen once the blink loop is running.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The half period is shorter than one counter tick.
    PeriodTooShort,
    /// The half period needs more ticks than the counter can count.
    PeriodTooLong {
        /// Largest count the counter reaches.
        max_ticks: u32,
    },
    /// The threshold lies above the counter range, so the wait would
    /// never finish.
    ThresholdUnreachable {
        /// Requested threshold in ticks.
        threshold: u32,
        /// Largest count the counter reaches.
        max_ticks: u32,
    },
    /// No prescaler setting gives the requested tick rate.
    DividerOutOfRange,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::PeriodTooShort => f.write_str("half period is shorter than one tick"),
            ConfigError::PeriodTooLong { max_ticks } => {
                write!(f, "half period needs more than {} ticks", max_ticks)
            }
            ConfigError::ThresholdUnreachable {
                threshold,
                max_ticks,
            } => write!(
                f,
                "threshold of {} ticks is above the counter maximum of {}",
                threshold, max_ticks
            ),
            ConfigError::DividerOutOfRange => f.write_str("tick rate is out of prescaler range"),
        }
    }
}

/// Tick rate and half period of the blink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkConfig {
    /// Rate of the free-running counter.
    pub tick_rate: HertzU32,
    /// How long each pattern is held.
    pub half_period: MicrosDurationU32,
}

impl BlinkConfig {
    /// 1 MHz tick, 15 625 µs per pattern: a 31.25 ms cycle, 32 blinks a
    /// second.
    pub const DEFAULT: Self = Self::new(HertzU32::MHz(1), MicrosDurationU32::micros(15_625));

    /// Create a configuration.
    pub const fn new(tick_rate: HertzU32, half_period: MicrosDurationU32) -> Self {
        Self {
            tick_rate,
            half_period,
        }
    }

    /// Threshold for a counter that counts up to `max_ticks`.
    pub fn threshold(&self, max_ticks: u32) -> Result<Threshold, ConfigError> {
        let threshold = Threshold::from_duration(self.half_period, self.tick_rate)?;
        if threshold.ticks() > max_ticks {
            return Err(ConfigError::PeriodTooLong { max_ticks });
        }
        Ok(threshold)
    }

    /// One full on/off cycle.
    pub fn cycle_period(&self) -> MicrosDurationU64 {
        MicrosDurationU64::micros(u64::from(self.half_period.ticks()) * 2)
    }
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fugit::{ExtU32, RateExtU32};

    #[test]
    fn default_is_a_32_hz_blink() {
        let config = BlinkConfig::default();
        assert_eq!(config.threshold(0xffff).unwrap().ticks(), 15_625);
        assert_eq!(config.cycle_period().ticks(), 31_250);
        assert_eq!(1_000_000 / config.cycle_period().ticks(), 32);
    }

    #[test]
    fn slower_tick_needs_fewer_ticks() {
        let config = BlinkConfig::new(62_500.Hz(), 500.millis());
        assert_eq!(config.threshold(0xffff).unwrap().ticks(), 31_250);
    }

    #[test]
    fn too_short_for_the_tick() {
        let config = BlinkConfig::new(1.kHz(), 400.micros());
        assert_eq!(config.threshold(0xffff), Err(ConfigError::PeriodTooShort));
    }

    #[test]
    fn too_long_for_a_16_bit_counter() {
        let config = BlinkConfig::new(1.MHz(), 100.millis());
        assert_eq!(
            config.threshold(0xffff),
            Err(ConfigError::PeriodTooLong { max_ticks: 0xffff })
        );
        assert!(config.threshold(u32::MAX).is_ok());
    }
}
