//! Linker script placement and build-time blink settings.
//!
//! `POLLBLINK_HALF_PERIOD_US` and `POLLBLINK_TICK_HZ` are read from the
//! environment, checked, and written to `$OUT_DIR/blink_settings.rs` as
//! typed constants, with the stock 15 625 µs / 1 MHz values when unset. A
//! value that is not a positive `u32` fails the build.

use std::env;
use std::fs;
use std::path::PathBuf;

struct Setting {
    var: &'static str,
    constant: &'static str,
    default: u32,
}

const SETTINGS: [Setting; 2] = [
    Setting {
        var: "POLLBLINK_HALF_PERIOD_US",
        constant: "HALF_PERIOD_US",
        default: 15_625,
    },
    Setting {
        var: "POLLBLINK_TICK_HZ",
        constant: "TICK_HZ",
        default: 1_000_000,
    },
];

fn read_setting(setting: &Setting) -> u32 {
    println!("cargo:rerun-if-env-changed={}", setting.var);
    let Ok(raw) = env::var(setting.var) else {
        return setting.default;
    };
    let value = match raw.trim().replace('_', "").parse::<u32>() {
        Ok(0) => panic!("{} must be greater than zero", setting.var),
        Ok(value) => value,
        Err(e) => panic!("{}={:?} is not a valid u32: {}", setting.var, raw, e),
    };
    println!(
        "cargo:warning=Using {} from environment: {}",
        setting.var, value
    );
    value
}

fn main() {
    let out = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));

    let mut generated = String::from("// Generated by build.rs from the environment\n\n");
    for setting in &SETTINGS {
        let value = read_setting(setting);
        generated.push_str(&format!("pub const {}: u32 = {};\n", setting.constant, value));
    }
    fs::write(out.join("blink_settings.rs"), generated).expect("write blink_settings.rs");

    // Only the firmware image needs the memory layout and runtime scripts.
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("none") {
        return;
    }

    fs::write(out.join("memory.x"), include_bytes!("memory.x")).expect("write memory.x");
    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rerun-if-changed=memory.x");

    println!("cargo:rustc-link-arg-examples=--nmagic");
    println!("cargo:rustc-link-arg-examples=-Tlink.x");
    println!("cargo:rustc-link-arg-examples=-Tdefmt.x");
}
