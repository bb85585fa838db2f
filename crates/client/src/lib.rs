//! # PMIC register client
//!
//! Host-side driver for the PMIC's 32-byte register map over I2C.
//! Wraps any [`embedded_hal::i2c::I2c`] bus at the device's default
//! address 0x09.
//!
//! ```no_run
//! use pmic_client::{Error, Pmic};
//! # use embedded_hal::i2c::I2c;
//! # fn example<I: I2c>(i2c: I) -> Result<(), Error<I::Error>> {
//! let mut pmic = Pmic::new(i2c);
//!
//! // Decode the whole map in one bus transaction
//! let snapshot = pmic.read_registers()?;
//! let _uptime_ms = snapshot.millis;
//!
//! // Color plus trigger in a single burst: the device repaints once
//! pmic.set_led(0xFF, 0x00, 0x80)?;
//!
//! // Ask the device to cut its own power rail
//! pmic.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Async support
//!
//! With the `async` feature enabled, [`AsyncPmic`] mirrors the same API
//! over [`embedded_hal_async::i2c::I2c`].

#![no_std]

mod driver;
#[cfg(feature = "async")]
mod driver_async;
mod error;
mod types;

pub use driver::Pmic;
#[cfg(feature = "async")]
pub use driver_async::AsyncPmic;
pub use error::Error;
pub use types::{LedColor, RegisterSnapshot};

pub use pmic_core::convert::adc_to_vbat;
pub use pmic_core::input::InputState;
pub use pmic_core::regmap::DEFAULT_ADDRESS;
