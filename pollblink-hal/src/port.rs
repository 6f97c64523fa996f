//! Output bank
//!
//! A bank is a group of pins whose combined state is one register word. The
//! blinker only ever writes two values to it: every bank bit set
//! ([`Pattern::AllOn`]) or every bank bit clear ([`Pattern::AllOff`]), each as
//! a single register write. Latch bits outside the bank keep their value.

use core::convert::Infallible;

use crate::reg::Reg;

/// The two steady states of the output bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    /// Every pin of the bank driven high.
    AllOn,
    /// Every pin of the bank driven low.
    AllOff,
}

impl Pattern {
    /// Register value for this pattern on a bank covering `mask`.
    #[inline]
    pub const fn bits(self, mask: u32) -> u32 {
        match self {
            Pattern::AllOn => mask,
            Pattern::AllOff => 0,
        }
    }

    /// The other pattern.
    #[inline]
    pub const fn toggled(self) -> Self {
        match self {
            Pattern::AllOn => Pattern::AllOff,
            Pattern::AllOff => Pattern::AllOn,
        }
    }
}

/// Meaning of a set bit in the direction register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DirectionPolarity {
    /// A set bit makes the pin an output (output-enable style).
    OutputWhenSet,
    /// A cleared bit makes the pin an output (tri-state style).
    OutputWhenClear,
}

/// Operations the blink loop needs from an output bank.
pub trait OutputBank {
    /// Put every pin of the bank into output mode.
    fn make_outputs(&mut self);

    /// Drive the whole bank to `pattern` in one register write, leaving pins
    /// outside the bank alone.
    fn write(&mut self, pattern: Pattern);
}

/// Output bank backed by a direction register and an output latch.
///
/// A write sets the `mask` bits of the latch all to one or all to zero;
/// bits outside `mask` are read back and written unchanged.
pub struct OutputPort<'r> {
    direction: &'r Reg<u32>,
    output: &'r Reg<u32>,
    mask: u32,
    polarity: DirectionPolarity,
}

impl<'r> OutputPort<'r> {
    /// Wrap a direction register and an output latch.
    ///
    /// `mask` selects the pins that make up the bank.
    pub fn new(
        direction: &'r Reg<u32>,
        output: &'r Reg<u32>,
        mask: u32,
        polarity: DirectionPolarity,
    ) -> Self {
        Self {
            direction,
            output,
            mask,
            polarity,
        }
    }

    /// Pins that make up the bank.
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Decode the output latch.
    ///
    /// Returns `None` if the bank pins are neither all set nor all clear.
    pub fn read_pattern(&self) -> Option<Pattern> {
        match self.output.read() & self.mask {
            0 => Some(Pattern::AllOff),
            bits if bits == self.mask => Some(Pattern::AllOn),
            _ => None,
        }
    }
}

impl OutputBank for OutputPort<'_> {
    fn make_outputs(&mut self) {
        let mask = self.mask;
        match self.polarity {
            DirectionPolarity::OutputWhenSet => self.direction.modify(|v| v | mask),
            DirectionPolarity::OutputWhenClear => self.direction.modify(|v| v & !mask),
        }
    }

    #[inline]
    fn write(&mut self, pattern: Pattern) {
        let mask = self.mask;
        self.output.modify(|v| (v & !mask) | pattern.bits(mask));
    }
}

impl embedded_hal::digital::ErrorType for OutputPort<'_> {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for OutputPort<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(Pattern::AllOff);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(Pattern::AllOn);
        Ok(())
    }
}

impl embedded_hal::digital::StatefulOutputPin for OutputPort<'_> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read_pattern() == Some(Pattern::AllOn))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read_pattern() == Some(Pattern::AllOff))
    }
}
