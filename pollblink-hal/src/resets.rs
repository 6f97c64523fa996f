//! Subsystem Resets
// See [Chapter 2 Section 14](https://datasheets.raspberrypi.org/rp2040/rp2040_datasheet.pdf) for more details
use crate::pac;

mod private {
    pub trait SubsystemReset {
        fn reset_bring_up(&self, resets: &mut super::pac::RESETS);
    }
}

pub(crate) use private::SubsystemReset;

macro_rules! generate_reset {
    ($MODULE:ident, $module:ident) => {
        impl SubsystemReset for pac::$MODULE {
            fn reset_bring_up(&self, resets: &mut pac::RESETS) {
                resets.reset().modify(|_, w| w.$module().clear_bit());
                while resets.reset_done().read().$module().bit_is_clear() {}
            }
        }
    };
}

// Only the blocks the blinker drives, in datasheet order
generate_reset!(PWM, pwm);
generate_reset!(PADS_BANK0, pads_bank0);
generate_reset!(IO_BANK0, io_bank0);
