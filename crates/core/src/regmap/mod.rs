//! Shared register map
//!
//! The 32-byte register file is the only channel between the bus host and
//! the device. It is written from two execution contexts (the bus interrupt
//! handler and the foreground supervisor loop) under a strict
//! single-writer-per-field discipline, so no field is ever protected by a
//! lock. Each byte is an atomic cell; multi-byte fields are assembled from
//! individual byte loads and may therefore tear when read concurrently with
//! their writer. That race is part of the device contract, see
//! [`RegisterFile::load_u32_le`].
//!
//! Access from the two roles goes through narrow capability ports:
//!
//! - [`BusPort`]: what the bus slave engine may do (read anything, write
//!   host-owned bytes, never the device-id block)
//! - [`SupervisorPort`]: what the foreground loop may do (publish samples
//!   and status, consume the edge-triggered trigger bytes)

pub mod file;
pub mod layout;
pub mod ports;

pub use file::RegisterFile;
pub use layout::*;
pub use ports::{BusPort, RegisterFrameSource, SupervisorPort};
