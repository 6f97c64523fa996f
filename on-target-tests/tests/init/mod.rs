use rp2040_hal as hal;

use hal::pac;

/// When test cases are run from a debugger, there may not be a complete
/// system reset between test cases. To get clean initial conditions, reset
/// core1, the spinlocks and the PWM block.
///
/// This must only be called immediatly after booting core0, ie. at the start
/// of the `#[init]` function.
pub unsafe fn reset_cleanup() {
    unsafe {
        (*pac::PSM::PTR)
            .frce_off()
            .modify(|_, w| w.proc1().set_bit());
        while !(*pac::PSM::PTR).frce_off().read().proc1().bit_is_set() {
            cortex_m::asm::nop();
        }
        (*pac::PSM::PTR)
            .frce_off()
            .modify(|_, w| w.proc1().clear_bit());
        // A slice left running by a previous run would skew the first phase.
        (*pac::RESETS::PTR)
            .reset()
            .modify(|_, w| w.pwm().set_bit());
        hal::sio::spinlock_reset();
    }
}
