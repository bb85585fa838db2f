//! pmic_sitl - Software-in-the-loop simulation of the PMIC
//!
//! Runs the real firmware (`pmic_firmware::device::Device`) against
//! simulated peripherals on the host:
//!
//! - [`SimBus`] implements `embedded_hal::i2c::I2c` and feeds every
//!   transaction byte-by-byte into the device's bus interrupt surface, so
//!   the host-side client crate talks to the simulated device exactly as
//!   it would over a real bus, including NACKs and injected faults.
//! - The simulated LED strip replays the firmware's just-in-time frame
//!   pull at pulse granularity, making the documented in-flight-mutation
//!   race observable in tests.
//! - Shared handles let tests flip GPIO levels, script ADC samples and
//!   observe the power rail while the device owns the peripherals.
//!
//! The integration tests under `tests/` drive the full stack through
//! these pieces.

pub mod bus;
pub mod device;
pub mod error;
pub mod platform;

pub use bus::SimBus;
pub use device::{SimDevice, SimHandles};
pub use error::SimBusError;
pub use platform::{AdcHandle, InputHandles, RailHandle, SimAdc, SimInputs, SimLedStrip, SimRail,
    SimStatusLed, StatusLedHandle, StripHandle};
