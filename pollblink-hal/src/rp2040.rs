//! RP2040 binding
//!
//! - Output bank: the SIO `GPIO_OE` and `GPIO_OUT` registers of bank 0
//!   (GPIO0 to GPIO29). Pins in the bank are routed to SIO on construction.
//! - Counter: one PWM slice in free-running divider mode. Its 16-bit `CTR`
//!   register counts at `clk_sys / DIV`, can be written to zero, and wraps at
//!   `TOP`. The slice output is never routed to a pin and its wrap interrupt
//!   stays disabled.
//!
//! Clocks, boot stage 2 and the runtime are set up elsewhere (see the
//! `blinky` example); this module only needs `clk_sys` to be running.
//!
//! See [Chapter 2 Section 3.1 and Chapter 4 Section 5](https://datasheets.raspberrypi.com/rp2040/rp2040-datasheet.pdf)
//! for the register layouts.

use bitfield::bitfield;
use fugit::HertzU32;

use crate::config::ConfigError;
use crate::counter::{CounterMode, FreeRunningCounter, TickCounter};
use crate::pac;
use crate::pac::io_bank0::gpio::gpio_ctrl::FUNCSEL_A;
use crate::port::{DirectionPolarity, OutputBank, OutputPort, Pattern};
use crate::reg::Reg;
use crate::resets::SubsystemReset;

const DIVMODE_FREE_RUNNING: u8 = 0;

/// Every pin of GPIO bank 0.
pub const BANK0_PINS: u32 = 0x3fff_ffff;

/// Largest count of a PWM slice counter.
pub const PWM_COUNTER_MAX: u32 = 0xffff;

bitfield! {
    /// PWM slice control and status word (`CHn_CSR`).
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct PwmCsr(u32);
    impl Debug;
    /// Slice enable.
    pub en, set_en: 0;
    /// Phase-correct (up/down) counting.
    pub ph_correct, set_ph_correct: 1;
    /// Invert output A.
    pub a_inv, set_a_inv: 2;
    /// Invert output B.
    pub b_inv, set_b_inv: 3;
    /// Counter clock source; 0 is the free-running fractional divider.
    pub u8, divmode, set_divmode: 5, 4;
}

bitfield! {
    /// PWM slice clock divider (`CHn_DIV`), 8.4 fixed point.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct PwmDiv(u32);
    impl Debug;
    /// Fractional part, in sixteenths.
    pub u8, frac, set_frac: 3, 0;
    /// Integer part, 1 to 255.
    pub u8, int, set_int: 11, 4;
}

/// Free-running counter mode for a PWM slice clocked from `sys_clk`,
/// counting as close to `tick_rate` as the 8.4 divider allows.
///
/// The returned mode carries the tick rate actually achieved.
pub fn free_running_mode(
    sys_clk: HertzU32,
    tick_rate: HertzU32,
) -> Result<CounterMode, ConfigError> {
    let sys_hz = u64::from(sys_clk.to_Hz());
    let tick_hz = u64::from(tick_rate.to_Hz());
    if tick_hz == 0 {
        return Err(ConfigError::DividerOutOfRange);
    }

    let div16 = (sys_hz * 16 + tick_hz / 2) / tick_hz;
    if !(0x10..=0xfff).contains(&div16) {
        return Err(ConfigError::DividerOutOfRange);
    }

    let mut div = PwmDiv(0);
    div.set_int((div16 >> 4) as u8);
    div.set_frac((div16 & 0xf) as u8);

    let mut csr = PwmCsr(0);
    csr.set_divmode(DIVMODE_FREE_RUNNING);
    csr.set_en(true);

    // div16 >= 16, so the achieved rate is at most sys_clk and fits a u32
    let achieved = (sys_hz * 16 / div16) as u32;
    Ok(CounterMode::new(csr.0, div.0, HertzU32::from_raw(achieved)))
}

/// Output bank made of SIO-driven pins of GPIO bank 0.
pub struct Bank0Port {
    _sio: pac::SIO,
    _io_bank0: pac::IO_BANK0,
    _pads_bank0: pac::PADS_BANK0,
    port: OutputPort<'static>,
}

impl Bank0Port {
    /// Route the pins in `mask` to SIO and wrap them as one bank.
    ///
    /// Bits above GPIO29 are ignored. The pins stay inputs until
    /// [`OutputBank::make_outputs`] is called.
    pub fn new(
        sio: pac::SIO,
        io_bank0: pac::IO_BANK0,
        pads_bank0: pac::PADS_BANK0,
        resets: &mut pac::RESETS,
        mask: u32,
    ) -> Self {
        io_bank0.reset_bring_up(resets);
        pads_bank0.reset_bring_up(resets);

        let mask = mask & BANK0_PINS;
        for pin in (0..30).filter(|pin| mask & (1 << pin) != 0) {
            io_bank0
                .gpio(pin)
                .gpio_ctrl()
                .write(|w| w.funcsel().variant(FUNCSEL_A::SIO));
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("bank0: pins {=u32:#x} routed to SIO", mask);

        // Safety: SIO is owned by this port and nothing else writes OE or OUT
        let (oe, out) = unsafe {
            let regs = &*pac::SIO::ptr();
            (
                Reg::<u32>::at(regs.gpio_oe().as_ptr() as usize),
                Reg::<u32>::at(regs.gpio_out().as_ptr() as usize),
            )
        };

        Self {
            _sio: sio,
            _io_bank0: io_bank0,
            _pads_bank0: pads_bank0,
            port: OutputPort::new(oe, out, mask, DirectionPolarity::OutputWhenSet),
        }
    }

    /// Current state of the bank, `None` if it is mixed.
    pub fn read_pattern(&self) -> Option<Pattern> {
        self.port.read_pattern()
    }

    /// Release the peripherals.
    pub fn free(self) -> (pac::SIO, pac::IO_BANK0, pac::PADS_BANK0) {
        (self._sio, self._io_bank0, self._pads_bank0)
    }
}

impl OutputBank for Bank0Port {
    fn make_outputs(&mut self) {
        self.port.make_outputs()
    }

    #[inline]
    fn write(&mut self, pattern: Pattern) {
        self.port.write(pattern)
    }
}

/// PWM slice used as the counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum SliceId {
    Pwm0,
    Pwm1,
    Pwm2,
    Pwm3,
    Pwm4,
    Pwm5,
    Pwm6,
    Pwm7,
}

impl SliceId {
    /// Registers of this slice.
    ///
    /// # Safety
    ///
    /// The caller must own the PWM block.
    unsafe fn regs(self) -> &'static pac::pwm::CH {
        (*pac::PWM::ptr()).ch(self as usize)
    }
}

/// A PWM slice counting freely, read through its `CTR` register.
pub struct PwmCounter {
    _pwm: pac::PWM,
    slice: SliceId,
    counter: FreeRunningCounter<'static>,
}

impl PwmCounter {
    /// Take the PWM block and set up `slice` for `mode`.
    ///
    /// The slice does not count until [`TickCounter::start`].
    pub fn new(pwm: pac::PWM, slice: SliceId, mode: CounterMode, resets: &mut pac::RESETS) -> Self {
        pwm.reset_bring_up(resets);

        // Safety: the PWM block is owned by this counter
        let ch = unsafe { slice.regs() };
        ch.csr().write(|w| w.en().clear_bit());
        ch.top()
            .write(|w| unsafe { w.top().bits(PWM_COUNTER_MAX as u16) });

        // Safety: as above; the counter is the only user of these registers
        let (csr, div, ctr) = unsafe {
            (
                Reg::<u32>::at(ch.csr().as_ptr() as usize),
                Reg::<u32>::at(ch.div().as_ptr() as usize),
                Reg::<u32>::at(ch.ctr().as_ptr() as usize),
            )
        };

        #[cfg(feature = "defmt")]
        defmt::trace!("{}: {}", slice, mode);

        Self {
            _pwm: pwm,
            slice,
            counter: FreeRunningCounter::new(csr, Some(div), ctr, PWM_COUNTER_MAX, mode),
        }
    }

    /// Slice in use.
    pub fn slice(&self) -> SliceId {
        self.slice
    }

    /// Release the PWM block. The slice keeps counting.
    pub fn free(self) -> pac::PWM {
        self._pwm
    }
}

impl TickCounter for PwmCounter {
    fn start(&mut self) {
        self.counter.start()
    }

    #[inline]
    fn reset(&mut self) {
        self.counter.reset()
    }

    #[inline]
    fn ticks(&self) -> u32 {
        self.counter.ticks()
    }

    fn max_ticks(&self) -> u32 {
        self.counter.max_ticks()
    }

    fn tick_rate(&self) -> HertzU32 {
        self.counter.tick_rate()
    }
}
