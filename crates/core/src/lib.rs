//! pmic_core - Pure no_std business logic for the PMIC firmware
//!
//! This crate contains the platform-agnostic state machines and data
//! structures of the power-management controller. Everything here is
//! testable on host without any peripheral or runtime dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: no feature-gated code paths beyond optional
//!   `defmt::Format` derives
//! - **Pure no_std**: no std library dependencies
//! - **No locks**: the register map relies on per-byte atomics and a
//!   single-writer-per-field discipline instead of mutual exclusion
//!
//! # Modules
//!
//! - [`regmap`]: the 32-byte shared register file and its capability ports
//! - [`busslave`]: the interrupt-context bus slave protocol state machine
//! - [`led`]: NZR pulse encoding for the addressable status LED
//! - [`supervisor`]: battery hysteresis and power-state tracking
//! - [`input`]: the input-state bitfield at register offset 14
//! - [`convert`]: ADC-to-voltage conversion shared with the host tooling

#![no_std]

#[cfg(test)]
extern crate std;

pub mod busslave;
pub mod convert;
pub mod input;
pub mod led;
pub mod regmap;
pub mod supervisor;
