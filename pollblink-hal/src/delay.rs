//! Tick threshold and the poll primitive
//!
//! Waiting is done by reading the counter until it reaches the threshold.
//! Nothing else runs meanwhile; if the counter stops advancing the wait never
//! finishes, and that hang is the failure behaviour.
//!
//! A counter that ticks faster than it is read can step over the threshold
//! value and wrap. A reading lower than the previous one therefore also ends
//! the wait: after a wrap, more than `max_ticks` ticks have passed, which is
//! at least the threshold.
//!
//! [`PhaseWait::poll`] is the non-blocking form (one read per call, like an
//! `embedded-hal` 0.2 `CountDown::wait`). [`wait`] spins on it with no yield
//! point; [`wait_with`] hands control to a caller-supplied function between
//! reads instead.

use core::num::NonZeroU32;

use fugit::{HertzU32, MicrosDurationU32, MicrosDurationU64};
use void::Void;

use crate::config::ConfigError;
use crate::counter::TickCounter;

/// Number of counter ticks each pattern is held for. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Threshold(NonZeroU32);

impl Threshold {
    /// 15 625 ticks; a 15.625 ms half period at a 1 MHz tick.
    pub const DEFAULT: Self = match Self::new(15_625) {
        Some(threshold) => threshold,
        None => panic!("default threshold is zero"),
    };

    /// Threshold of `ticks` ticks, `None` if `ticks` is zero.
    pub const fn new(ticks: u32) -> Option<Self> {
        match NonZeroU32::new(ticks) {
            Some(ticks) => Some(Self(ticks)),
            None => None,
        }
    }

    /// Number of ticks for `half_period` at `tick_rate`, rounded to the
    /// nearest tick.
    pub fn from_duration(
        half_period: MicrosDurationU32,
        tick_rate: HertzU32,
    ) -> Result<Self, ConfigError> {
        let ticks = (u64::from(half_period.ticks()) * u64::from(tick_rate.to_Hz()) + 500_000)
            / 1_000_000;
        let ticks = u32::try_from(ticks).map_err(|_| ConfigError::PeriodTooLong {
            max_ticks: u32::MAX,
        })?;
        Self::new(ticks).ok_or(ConfigError::PeriodTooShort)
    }

    /// Tick count.
    #[inline]
    pub const fn ticks(self) -> u32 {
        self.0.get()
    }

    /// Time spent holding one pattern at `tick_rate`.
    pub fn half_period(self, tick_rate: HertzU32) -> MicrosDurationU64 {
        let hz = u64::from(tick_rate.to_Hz()).max(1);
        MicrosDurationU64::micros(u64::from(self.ticks()) * 1_000_000 / hz)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Threshold {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} ticks", self.ticks())
    }
}

/// A pending wait for the counter to reach a threshold.
pub struct PhaseWait<'c, C> {
    counter: &'c C,
    threshold: Threshold,
    last: u32,
}

impl<'c, C: TickCounter> PhaseWait<'c, C> {
    /// Wait on `counter`, which the caller has just reset.
    pub fn new(counter: &'c C, threshold: Threshold) -> Self {
        Self {
            counter,
            threshold,
            last: 0,
        }
    }

    /// Read the counter once.
    ///
    /// Done as soon as the count equals the threshold, or as soon as it reads
    /// lower than on the previous call (the counter wrapped).
    #[inline]
    pub fn poll(&mut self) -> nb::Result<(), Void> {
        let now = self.counter.ticks();
        if now >= self.threshold.ticks() || now < self.last {
            Ok(())
        } else {
            self.last = now;
            Err(nb::Error::WouldBlock)
        }
    }
}

/// Block until `counter` reaches `threshold`.
#[inline]
pub fn wait<C: TickCounter>(counter: &C, threshold: Threshold) {
    wait_with(counter, threshold, core::hint::spin_loop)
}

/// Block until `counter` reaches `threshold`, calling `relax` after every
/// read that comes up short.
pub fn wait_with<C, F>(counter: &C, threshold: Threshold, mut relax: F)
where
    C: TickCounter,
    F: FnMut(),
{
    let mut pending = PhaseWait::new(counter, threshold);
    loop {
        match pending.poll() {
            Ok(()) => return,
            Err(nb::Error::WouldBlock) => relax(),
            Err(nb::Error::Other(never)) => match never {},
        }
    }
}

/// [`DelayNs`](embedded_hal::delay::DelayNs) on top of any [`TickCounter`].
///
/// Delays longer than the counter range are split into several resets and
/// waits. The counter must already be started.
pub struct CounterDelay<C> {
    counter: C,
}

impl<C: TickCounter> CounterDelay<C> {
    /// Take ownership of a running counter.
    pub fn new(counter: C) -> Self {
        Self { counter }
    }

    /// Give the counter back.
    pub fn free(self) -> C {
        self.counter
    }

    fn delay_ticks(&mut self, mut ticks: u64) {
        let chunk_max = u64::from(self.counter.max_ticks());
        while ticks > 0 {
            let chunk = ticks.min(chunk_max);
            self.counter.reset();
            // chunk is at most `max_ticks`, a u32
            if let Some(threshold) = Threshold::new(chunk as u32) {
                wait(&self.counter, threshold);
            }
            ticks -= chunk;
        }
    }
}

impl<C: TickCounter> embedded_hal::delay::DelayNs for CounterDelay<C> {
    fn delay_ns(&mut self, ns: u32) {
        let hz = u64::from(self.counter.tick_rate().to_Hz());
        let ticks = (u64::from(ns) * hz).div_ceil(1_000_000_000);
        self.delay_ticks(ticks)
    }

    fn delay_us(&mut self, us: u32) {
        let hz = u64::from(self.counter.tick_rate().to_Hz());
        let ticks = (u64::from(us) * hz).div_ceil(1_000_000);
        self.delay_ticks(ticks)
    }

    fn delay_ms(&mut self, ms: u32) {
        let hz = u64::from(self.counter.tick_rate().to_Hz());
        let ticks = (u64::from(ms) * hz).div_ceil(1_000);
        self.delay_ticks(ticks)
    }
}
