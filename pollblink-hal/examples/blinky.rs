//! # Polled Blinky Example
//!
//! Blinks the LED on a Pico board (GP25) together with GP0 to GP3, holding
//! each state for a fixed number of PWM-slice ticks and polling the counter
//! instead of using interrupts.
//!
//! The half period and tick rate are fixed at build time:
//!
//! ```text
//! POLLBLINK_HALF_PERIOD_US=250000 cargo build --example blinky --features defmt --target thumbv6m-none-eabi
//! ```
//!
//! It may need to be adapted to your particular board layout and/or pin assignment.
#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;

// Clocks and boot stage 2 come from the HAL; the blink itself from this crate.
use rp2040_hal as hal;

use cortex_m_rt::entry;
use fugit::{HertzU32, MicrosDurationU32};
use hal::Clock;
use pollblink_hal::rp2040::{self, Bank0Port, PwmCounter, SliceId};
use pollblink_hal::{BlinkConfig, Blinker};

/// The linker will place this boot block at the start of our program image. We
/// need this to help the ROM bootloader get our code up and running.
#[link_section = ".boot2"]
#[used]
pub static BOOT2: [u8; 256] = rp2040_boot2::BOOT_LOADER_GENERIC_03H;

/// External high-speed crystal on the Raspberry Pi Pico board is 12 MHz. Adjust
/// if your board has a different frequency
const XTAL_FREQ_HZ: u32 = 12_000_000u32;

/// The on-board LED and the first four header pins.
const BANK_PINS: u32 = (1 << 25) | 0b1111;

/// `HALF_PERIOD_US` and `TICK_HZ`, checked and generated by `build.rs`.
mod settings {
    include!(concat!(env!("OUT_DIR"), "/blink_settings.rs"));
}

/// Requested blink timing. The tick rate is refined once the PWM divider is
/// known.
const CONFIG: BlinkConfig = BlinkConfig::new(
    HertzU32::from_raw(settings::TICK_HZ),
    MicrosDurationU32::from_ticks(settings::HALF_PERIOD_US),
);

#[entry]
fn main() -> ! {
    let mut pac = hal::pac::Peripherals::take().unwrap();
    let mut watchdog = hal::Watchdog::new(pac.WATCHDOG);

    let clocks = hal::clocks::init_clocks_and_plls(
        XTAL_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    let mode = rp2040::free_running_mode(clocks.system_clock.freq(), CONFIG.tick_rate).unwrap();
    let config = BlinkConfig::new(mode.tick_rate, CONFIG.half_period);
    let threshold = config.threshold(rp2040::PWM_COUNTER_MAX).unwrap();
    defmt::info!(
        "tick {} Hz, {} per pattern, {} us per cycle",
        mode.tick_rate.to_Hz(),
        threshold,
        config.cycle_period().ticks()
    );

    let port = Bank0Port::new(
        pac.SIO,
        pac.IO_BANK0,
        pac.PADS_BANK0,
        &mut pac.RESETS,
        BANK_PINS,
    );
    let counter = PwmCounter::new(pac.PWM, SliceId::Pwm0, mode, &mut pac.RESETS);

    Blinker::new(port, counter, threshold).unwrap().run()
}

// End of file
