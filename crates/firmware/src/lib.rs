//! pmic_firmware - Device runtime for the PMIC
//!
//! Wires the pure state machines from `pmic_core` to peripheral hardware
//! behind narrow traits, so the whole device can run against mocks on the
//! host exactly as it runs against a real board.
//!
//! # Execution model
//!
//! Single core, two contexts:
//!
//! - **Interrupt**: the bus peripheral ISR calls the `isr_*` methods on
//!   [`device::Device`]; each runs to completion per bus byte event and
//!   never blocks.
//! - **Foreground**: a cooperative loop calls
//!   [`device::Device::run_iteration`] forever. Within one iteration the
//!   order is fixed: LED update trigger, then the periodic battery sample,
//!   then shutdown-trigger consumption and GPIO refresh.
//!
//! # Modules
//!
//! - [`platform`]: peripheral traits and the in-tree mock board
//! - [`device`]: the device runtime (boot, ISR glue, foreground task)
//! - [`config`]: board constants (LED count, color order, bus address)

#![no_std]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod device;
pub mod platform;
