//! Simulated peripherals
//!
//! Each peripheral comes in two halves: the struct the device owns
//! (implementing the firmware's platform trait) and a cloneable handle the
//! test keeps, backed by shared cells. Flipping a handle is the simulated
//! equivalent of electrons on a pin.

pub mod adc;
pub mod gpio;
pub mod rail;
pub mod strip;

pub use adc::{AdcHandle, SimAdc};
pub use gpio::{InputHandles, SimInputs};
pub use rail::{RailHandle, SimRail, SimStatusLed, StatusLedHandle};
pub use strip::{SimLedStrip, StripHandle};
