//! Board configuration constants

use pmic_core::led::ColorOrder;

/// Number of LEDs on the status chain.
pub const N_LEDS: usize = 1;

/// Wire order of the LED color bytes. Fixed per board at compile time.
pub const COLOR_ORDER: ColorOrder = ColorOrder::Grb;

/// Settle time after power-on before the rail is enabled, in milliseconds.
pub const BOOT_SETTLE_MS: u32 = 1000;

/// Primary bus address the slave engine answers on.
pub const BUS_ADDRESS: u8 = pmic_core::regmap::DEFAULT_ADDRESS;
