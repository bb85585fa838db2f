//! Platform abstraction
//!
//! Peripheral access behind small traits so the device runtime is
//! identical on hardware and on the host. The mock board in [`mock`] is
//! always available; it is the platform used by the unit tests here and
//! by the simulation crate's building blocks.

pub mod mock;
pub mod traits;

pub use traits::{AdcError, BatteryAdc, InputPins, LedBusy, LedStrip, PowerRail, StatusLed};
