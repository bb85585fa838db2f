//! The raw register file
//!
//! A fixed array of atomic bytes. All loads and stores use relaxed
//! ordering: there is no cross-byte ordering requirement anywhere in the
//! register contract, only per-byte atomicity.

use core::sync::atomic::{AtomicU8, Ordering};

use super::layout::REGISTER_COUNT;

/// The 32-byte shared register region.
///
/// Allocated once at boot (typically as a `static`) and never resized or
/// freed. Byte-granular atomic access makes it safe to share between the
/// bus interrupt handler and the foreground loop without locking.
pub struct RegisterFile {
    bytes: [AtomicU8; REGISTER_COUNT],
}

impl RegisterFile {
    /// Creates a zeroed register file. `const` so it can back a `static`.
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const ZERO: AtomicU8 = AtomicU8::new(0);
        Self {
            bytes: [ZERO; REGISTER_COUNT],
        }
    }

    /// Reads one byte. Out-of-range offsets read as zero.
    pub fn load(&self, offset: u8) -> u8 {
        self.bytes
            .get(offset as usize)
            .map(|b| b.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Writes one byte. Returns false (and writes nothing) when the offset
    /// is outside the map.
    pub fn store(&self, offset: u8, value: u8) -> bool {
        match self.bytes.get(offset as usize) {
            Some(b) => {
                b.store(value, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Atomically replaces one byte, returning the previous value. Used by
    /// the consumers of the edge-triggered trigger bytes.
    pub fn swap(&self, offset: u8, value: u8) -> u8 {
        self.bytes
            .get(offset as usize)
            .map(|b| b.swap(value, Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Atomically clears one byte if it currently holds `expected`.
    /// Returns true when the exchange happened.
    pub fn consume_if(&self, offset: u8, expected: u8) -> bool {
        self.bytes
            .get(offset as usize)
            .map(|b| {
                b.compare_exchange(expected, 0, Ordering::Relaxed, Ordering::Relaxed)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Reads a little-endian u16 starting at `offset`.
    ///
    /// The two byte loads are independent: a reader racing the field's
    /// writer may observe a torn value mixing old and new bytes. This is
    /// the documented behavior of multi-byte register reads over the bus,
    /// not something to paper over with a lock.
    pub fn load_u16_le(&self, offset: u8) -> u16 {
        u16::from_le_bytes([self.load(offset), self.load(offset.wrapping_add(1))])
    }

    /// Writes a little-endian u16 starting at `offset`, one byte at a time.
    pub fn store_u16_le(&self, offset: u8, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.store(offset, lo);
        self.store(offset.wrapping_add(1), hi);
    }

    /// Reads a little-endian u32 starting at `offset`. Same tearing caveat
    /// as [`Self::load_u16_le`].
    pub fn load_u32_le(&self, offset: u8) -> u32 {
        u32::from_le_bytes([
            self.load(offset),
            self.load(offset.wrapping_add(1)),
            self.load(offset.wrapping_add(2)),
            self.load(offset.wrapping_add(3)),
        ])
    }

    /// Writes a little-endian u32 starting at `offset`, one byte at a time.
    pub fn store_u32_le(&self, offset: u8, value: u32) {
        for (i, byte) in value.to_le_bytes().iter().enumerate() {
            self.store(offset.wrapping_add(i as u8), *byte);
        }
    }

    /// Copies the whole map into a plain array. Byte-wise consistent only;
    /// fields being written concurrently may appear torn.
    pub fn snapshot(&self) -> [u8; REGISTER_COUNT] {
        let mut out = [0u8; REGISTER_COUNT];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.bytes[i].load(Ordering::Relaxed);
        }
        out
    }

    /// Zeroes the entire map. Boot-time only; after the bus engine is live
    /// the single-writer discipline applies.
    pub fn clear(&self) {
        for byte in &self.bytes {
            byte.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}
