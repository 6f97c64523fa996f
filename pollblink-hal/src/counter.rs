//! Free-running counter
//!
//! A hardware counter that the peripheral increments at a fixed tick rate,
//! independent of the CPU. Software only starts it, zeroes it and reads it.
//! No interrupt is ever enabled; the blink loop polls [`TickCounter::ticks`].

use fugit::HertzU32;

use crate::reg::Reg;

/// Operations the blink loop needs from a tick source.
pub trait TickCounter {
    /// Start counting in the configured mode.
    fn start(&mut self);

    /// Set the count back to zero.
    fn reset(&mut self);

    /// Current count.
    fn ticks(&self) -> u32;

    /// Highest count the counter reaches before wrapping.
    fn max_ticks(&self) -> u32;

    /// Rate at which the count advances.
    fn tick_rate(&self) -> HertzU32;
}

/// Configuration words that start a counter, and the tick rate they yield.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterMode {
    /// Written to the control register; carries the enable bit.
    pub control: u32,
    /// Written to the prescale register, if the counter has one.
    pub prescale: u32,
    /// Tick rate once started with these words.
    pub tick_rate: HertzU32,
}

impl CounterMode {
    /// Build a mode from raw register words.
    pub const fn new(control: u32, prescale: u32, tick_rate: HertzU32) -> Self {
        Self {
            control,
            prescale,
            tick_rate,
        }
    }
}

/// Counter peripheral driven through its control and value registers.
pub struct FreeRunningCounter<'r> {
    control: &'r Reg<u32>,
    prescale: Option<&'r Reg<u32>>,
    value: &'r Reg<u32>,
    max_count: u32,
    mode: CounterMode,
}

impl<'r> FreeRunningCounter<'r> {
    /// Wrap the counter registers.
    ///
    /// `max_count` must be of the form `2^n - 1`; the count read back is
    /// masked with it. `prescale` is `None` for counters whose divider
    /// lives in the control word.
    pub fn new(
        control: &'r Reg<u32>,
        prescale: Option<&'r Reg<u32>>,
        value: &'r Reg<u32>,
        max_count: u32,
        mode: CounterMode,
    ) -> Self {
        Self {
            control,
            prescale,
            value,
            max_count,
            mode,
        }
    }

    /// Mode written by [`TickCounter::start`].
    pub fn mode(&self) -> CounterMode {
        self.mode
    }
}

impl TickCounter for FreeRunningCounter<'_> {
    fn start(&mut self) {
        if let Some(prescale) = self.prescale {
            prescale.write(self.mode.prescale);
        }
        self.value.write(0);
        // Enable bit goes out last so the first tick already runs at the
        // configured rate.
        self.control.write(self.mode.control);
    }

    #[inline]
    fn reset(&mut self) {
        self.value.write(0);
    }

    #[inline]
    fn ticks(&self) -> u32 {
        self.value.read() & self.max_count
    }

    fn max_ticks(&self) -> u32 {
        self.max_count
    }

    fn tick_rate(&self) -> HertzU32 {
        self.mode.tick_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fugit::RateExtU32;

    // T1CON-style control word: enabled, 1:256
    // prescale, internal clock.
    const TIMER1_ON_DIV256: u32 = 0x8030;

    #[test]
    fn start_writes_prescale_then_control() {
        let control = Reg::new(0);
        let prescale = Reg::new(0);
        let value = Reg::new(0x1234);
        let mode = CounterMode::new(0x1, 125 << 4, 1.MHz());
        let mut counter = FreeRunningCounter::new(&control, Some(&prescale), &value, 0xffff, mode);

        counter.start();
        assert_eq!(prescale.read(), 125 << 4);
        assert_eq!(control.read(), 0x1);
        assert_eq!(value.read(), 0);
        assert_eq!(counter.tick_rate(), HertzU32::MHz(1));
    }

    #[test]
    fn control_word_only_counter() {
        let control = Reg::new(0);
        let value = Reg::new(0);
        let mode = CounterMode::new(TIMER1_ON_DIV256, 0, 62_500.Hz());
        let mut counter = FreeRunningCounter::new(&control, None, &value, 0xffff, mode);

        counter.start();
        assert_eq!(control.read(), TIMER1_ON_DIV256);
    }

    #[test]
    fn reset_zeroes_and_ticks_are_masked() {
        let control = Reg::new(0);
        let value = Reg::new(0x0001_2345);
        let mode = CounterMode::new(1, 0, 1.MHz());
        let mut counter = FreeRunningCounter::new(&control, None, &value, 0xffff, mode);

        assert_eq!(counter.ticks(), 0x2345);
        counter.reset();
        assert_eq!(counter.ticks(), 0);
        assert_eq!(counter.max_ticks(), 0xffff);
    }
}
