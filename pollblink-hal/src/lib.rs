//! Timer-polled blinker for bare-metal microcontrollers
//!
//! Drives a bank of output pins between two fixed patterns (all-on and
//! all-off), holding each one for a fixed number of ticks of a free-running
//! hardware counter. The counter is polled, never interrupt driven, and the
//! loop never returns.
//!
//! The crate is split the same way the hardware is:
//!
//! - [`reg`] wraps raw register addresses in a typed volatile cell.
//! - [`port`] is the output bank: set-direction and write-pattern.
//! - [`counter`] is the free-running counter: start, reset and read.
//! - [`delay`] holds the tick threshold and the poll primitive.
//! - [`blink`] configures both and runs the two-phase loop.
//! - [`rp2040`] binds all of the above to SIO bank 0 and a PWM slice.
//!
//! ```no_run
//! use pollblink_hal::fugit::RateExtU32;
//! use pollblink_hal::{pac, rp2040, BlinkConfig, Blinker};
//!
//! let mut pac = pac::Peripherals::take().unwrap();
//! let config = BlinkConfig::DEFAULT;
//! let mode = rp2040::free_running_mode(125.MHz(), config.tick_rate).unwrap();
//!
//! let port = rp2040::Bank0Port::new(
//!     pac.SIO,
//!     pac.IO_BANK0,
//!     pac.PADS_BANK0,
//!     &mut pac.RESETS,
//!     1 << 25,
//! );
//! let counter = rp2040::PwmCounter::new(pac.PWM, rp2040::SliceId::Pwm0, mode, &mut pac.RESETS);
//!
//! let threshold = config.threshold(rp2040::PWM_COUNTER_MAX).unwrap();
//! Blinker::new(port, counter, threshold).unwrap().run()
//! ```

#![warn(missing_docs)]
#![no_std]

pub extern crate rp2040_pac as pac;

pub mod blink;
pub mod config;
pub mod counter;
pub mod delay;
pub mod port;
pub mod reg;
pub(crate) mod resets;
pub mod rp2040;

pub use blink::Blinker;
pub use config::{BlinkConfig, ConfigError};
pub use counter::{CounterMode, FreeRunningCounter, TickCounter};
pub use delay::{CounterDelay, Threshold};
pub use port::{DirectionPolarity, OutputBank, OutputPort, Pattern};
pub use reg::Reg;

pub use fugit;
