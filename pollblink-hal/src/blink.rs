//! Port configuration and the blink loop
//!
//! [`Blinker::new`] runs once: it makes the bank an output and starts the
//! counter. [`Blinker::run`] then alternates the bank between
//! [`Pattern::AllOn`] and [`Pattern::AllOff`], forever:
//!
//! 1. write the pattern,
//! 2. zero the counter,
//! 3. poll until the counter reaches the threshold,
//! 4. switch to the other pattern and repeat.
//!
//! The first pattern written is always `AllOn`. Each phase is timed from its
//! own counter reset, so time spent writing and resetting adds to the
//! period instead of being absorbed by it.

use crate::config::ConfigError;
use crate::counter::TickCounter;
use crate::delay::{self, Threshold};
use crate::port::{OutputBank, Pattern};

/// Owns an output bank and a counter and blinks the one using the other.
pub struct Blinker<P, C> {
    port: P,
    counter: C,
    threshold: Threshold,
    next: Pattern,
}

impl<P, C> Blinker<P, C>
where
    P: OutputBank,
    C: TickCounter,
{
    /// Configure the bank as outputs and start the counter.
    ///
    /// Fails if the counter wraps before it could ever reach `threshold`.
    /// A threshold equal to the counter maximum is accepted: a phase ends on
    /// that count, or on the wrap that follows it if the poll misses it.
    pub fn new(mut port: P, mut counter: C, threshold: Threshold) -> Result<Self, ConfigError> {
        let max_ticks = counter.max_ticks();
        if threshold.ticks() > max_ticks {
            return Err(ConfigError::ThresholdUnreachable {
                threshold: threshold.ticks(),
                max_ticks,
            });
        }

        port.make_outputs();
        counter.start();

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "blink: {} per pattern, {} ticks/s",
            threshold,
            counter.tick_rate().to_Hz()
        );

        Ok(Self {
            port,
            counter,
            threshold,
            next: Pattern::AllOn,
        })
    }

    /// Hold the next pattern for one threshold, then return it.
    #[inline]
    pub fn step(&mut self) -> Pattern {
        self.step_with(core::hint::spin_loop)
    }

    /// Like [`step`](Self::step), calling `relax` between counter reads.
    pub fn step_with<F: FnMut()>(&mut self, relax: F) -> Pattern {
        let pattern = self.next;
        self.port.write(pattern);
        self.counter.reset();
        delay::wait_with(&self.counter, self.threshold, relax);
        self.next = pattern.toggled();
        pattern
    }

    /// Blink forever with a tight poll.
    pub fn run(mut self) -> ! {
        loop {
            self.step();
        }
    }

    /// Blink forever, calling `relax` between counter reads.
    ///
    /// `relax` runs while a phase is pending, so anything slow in it delays
    /// the next toggle.
    pub fn run_with<F: FnMut()>(mut self, mut relax: F) -> ! {
        loop {
            self.step_with(&mut relax);
        }
    }

    /// Pattern the next [`step`](Self::step) writes.
    pub fn next_pattern(&self) -> Pattern {
        self.next
    }

    /// Ticks each pattern is held for.
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// The output bank.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// The counter.
    pub fn counter(&self) -> &C {
        &self.counter
    }

    /// Give back the bank and the counter.
    pub fn release(self) -> (P, C) {
        (self.port, self.counter)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::delay::tests::SimCounter;
    use crate::port::{DirectionPolarity, OutputPort};
    use crate::reg::Reg;
    use core::cell::Cell;
    use std::vec::Vec;

    /// Records each write with the value of a shared clock.
    struct RecordingBank<'t> {
        outputs: bool,
        writes: Vec<(Pattern, u64)>,
        clock: &'t Cell<u64>,
    }

    impl<'t> RecordingBank<'t> {
        fn new(clock: &'t Cell<u64>) -> Self {
            Self {
                outputs: false,
                writes: Vec::new(),
                clock,
            }
        }
    }

    impl OutputBank for RecordingBank<'_> {
        fn make_outputs(&mut self) {
            self.outputs = true;
        }

        fn write(&mut self, pattern: Pattern) {
            self.writes.push((pattern, self.clock.get()));
        }
    }

    #[test]
    fn configures_before_the_first_phase() {
        let clock = Cell::new(0);
        let blinker = Blinker::new(
            RecordingBank::new(&clock),
            SimCounter::new(0xffff),
            Threshold::DEFAULT,
        )
        .unwrap();
        assert_eq!(blinker.next_pattern(), Pattern::AllOn);

        let (bank, counter) = blinker.release();
        assert!(bank.outputs);
        assert!(counter.started);
        assert!(bank.writes.is_empty());
    }

    #[test]
    fn alternates_starting_with_on() {
        let clock = Cell::new(0);
        let mut blinker = Blinker::new(
            RecordingBank::new(&clock),
            SimCounter::with_clock(0xffff, &clock),
            Threshold::new(5).unwrap(),
        )
        .unwrap();

        let held: Vec<Pattern> = (0..6).map(|_| blinker.step()).collect();
        assert_eq!(
            held,
            [
                Pattern::AllOn,
                Pattern::AllOff,
                Pattern::AllOn,
                Pattern::AllOff,
                Pattern::AllOn,
                Pattern::AllOff,
            ]
        );

        let (bank, _) = blinker.release();
        let written: Vec<Pattern> = bank.writes.iter().map(|(p, _)| *p).collect();
        assert_eq!(written, held);
    }

    #[test]
    fn on_and_off_phases_last_equally_long() {
        let clock = Cell::new(0);
        let threshold = Threshold::new(15_625).unwrap();
        let mut blinker = Blinker::new(
            RecordingBank::new(&clock),
            SimCounter::with_clock(0xffff, &clock),
            threshold,
        )
        .unwrap();
        for _ in 0..5 {
            blinker.step();
        }

        let (bank, counter) = blinker.release();
        assert_eq!(counter.resets.get(), 5);
        let durations: Vec<u64> = bank.writes.windows(2).map(|w| w[1].1 - w[0].1).collect();
        // threshold reads that come up short plus the one that finishes
        assert!(durations
            .iter()
            .all(|d| *d == u64::from(threshold.ticks()) + 1));
    }

    #[test]
    fn yield_hook_runs_once_per_short_read() {
        let clock = Cell::new(0);
        let mut blinker = Blinker::new(
            RecordingBank::new(&clock),
            SimCounter::new(0xffff),
            Threshold::new(100).unwrap(),
        )
        .unwrap();
        let mut yields = 0;
        assert_eq!(blinker.step_with(|| yields += 1), Pattern::AllOn);
        assert_eq!(blinker.step_with(|| yields += 1), Pattern::AllOff);
        assert_eq!(yields, 200);
    }

    #[test]
    fn register_port_only_ever_holds_two_values() {
        let dir = Reg::new(0xffff);
        let out = Reg::new(0);
        let port = OutputPort::new(&dir, &out, 0xffff, DirectionPolarity::OutputWhenClear);
        let mut blinker =
            Blinker::new(port, SimCounter::new(0xffff), Threshold::new(3).unwrap()).unwrap();
        assert_eq!(dir.read(), 0);

        for expected in [0xffff, 0x0000, 0xffff, 0x0000] {
            blinker.step();
            assert_eq!(out.read(), expected);
        }
    }

    #[test]
    fn rejects_threshold_above_counter_range() {
        let clock = Cell::new(0);
        let result = Blinker::new(
            RecordingBank::new(&clock),
            SimCounter::new(0xff),
            Threshold::new(0x100).unwrap(),
        );
        assert!(matches!(
            result,
            Err(ConfigError::ThresholdUnreachable {
                threshold: 0x100,
                max_ticks: 0xff
            })
        ));
    }

    #[test]
    fn threshold_equal_to_counter_max_is_reachable() {
        let clock = Cell::new(0);
        let mut blinker = Blinker::new(
            RecordingBank::new(&clock),
            SimCounter::new(0xff),
            Threshold::new(0xff).unwrap(),
        )
        .unwrap();
        assert_eq!(blinker.step(), Pattern::AllOn);
        assert_eq!(blinker.threshold().ticks(), 0xff);
    }

    #[test]
    fn fast_counter_that_skips_the_threshold_still_toggles() {
        let clock = Cell::new(0);
        let mut blinker = Blinker::new(
            RecordingBank::new(&clock),
            SimCounter::with_step(0xff, 2),
            Threshold::new(0xff).unwrap(),
        )
        .unwrap();
        for expected in [Pattern::AllOn, Pattern::AllOff, Pattern::AllOn] {
            assert_eq!(blinker.step(), expected);
        }

        let (bank, counter) = blinker.release();
        assert_eq!(bank.writes.len(), 3);
        // 128 even counts below the threshold and the wrapped read, per phase
        assert_eq!(counter.reads.get(), 3 * 129);
    }
}
