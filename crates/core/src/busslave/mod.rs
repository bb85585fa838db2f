//! Bus slave protocol engine
//!
//! Interrupt-context state machine that services host transactions against
//! the register map. The peripheral ISR translates bus conditions into the
//! `on_*` calls below; each call runs to completion, there is no blocking
//! anywhere on this path.
//!
//! Transaction shapes (host side):
//!
//! - write: `START addr+W, pointer, data..., STOP`
//! - read: `START addr+W, pointer, RESTART addr+R, data..., STOP`
//!
//! The first byte of a write phase sets the register pointer; every data
//! byte after it writes at the pointer and auto-increments. The pointer is
//! clamped at the end of the map: writes past it are discarded (never
//! wrapped) and reads past it return zero.
//!
//! A completed write burst invokes a registered [`WriteHook`] with the
//! first data offset and the number of bytes actually applied, still in
//! interrupt context, so side effects such as the shutdown rail can be
//! evaluated without waiting for the next foreground iteration.

use crate::regmap::BusPort;

/// Callback invoked synchronously after a write burst completes.
///
/// Implementations choose between acting immediately (push) and parking
/// the notification in a single-slot mailbox for the foreground loop.
pub trait WriteHook {
    /// `offset` is the register the burst started at, `len` the number of
    /// bytes that were actually applied to the map.
    fn on_register_write(&mut self, offset: u8, len: u8);
}

/// Hook that does nothing. For read-only deployments and tests.
pub struct NullHook;

impl WriteHook for NullHook {
    fn on_register_write(&mut self, _offset: u8, _len: u8) {}
}

/// Protocol engine state.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No transaction in progress.
    Idle,
    /// Address matched in write direction; pointer byte expected next.
    Addressed,
    /// Pointer received; data bytes would start a write burst.
    RegisterSelect,
    /// At least one data byte received in this transaction.
    WriteBurst,
    /// Streaming bytes out from the pointer.
    ReadBurst,
    /// A bus fault occurred; cleared by the next start condition.
    Error,
}

/// Per-address slave state machine.
///
/// One instance per bus address; a secondary address gets its own engine
/// over its own register file, with fully independent state.
pub struct SlaveEngine {
    state: EngineState,
    pointer: u8,
    burst_start: u8,
    burst_applied: u8,
    read_only: bool,
}

impl SlaveEngine {
    /// Engine for a writable register map.
    pub fn new() -> Self {
        Self::with_read_only(false)
    }

    /// `read_only` devices acknowledge every incoming write byte at the
    /// bus level but discard it without touching the map; the write hook
    /// never fires for them.
    pub fn with_read_only(read_only: bool) -> Self {
        Self {
            state: EngineState::Idle,
            pointer: 0,
            burst_start: 0,
            burst_applied: 0,
            read_only,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Current register pointer (survives between transactions, so a read
    /// can follow a pointer-only write).
    pub fn pointer(&self) -> u8 {
        self.pointer
    }

    /// Address matched. `read` is the transaction direction bit.
    ///
    /// A repeated start in read direction ends any in-progress write
    /// phase, completing its burst (hook included) before the read side
    /// begins streaming.
    pub fn on_address_match(&mut self, read: bool, hook: &mut dyn WriteHook) {
        self.complete_write_burst(hook);
        self.state = if read {
            EngineState::ReadBurst
        } else {
            EngineState::Addressed
        };
    }

    /// Data byte arrived from the host.
    pub fn on_byte_received(&mut self, port: &BusPort, byte: u8) {
        match self.state {
            EngineState::Addressed => {
                self.pointer = byte;
                self.burst_start = byte;
                self.burst_applied = 0;
                self.state = EngineState::RegisterSelect;
            }
            EngineState::RegisterSelect | EngineState::WriteBurst => {
                self.state = EngineState::WriteBurst;
                if !self.read_only && port.write_byte(self.pointer, byte) {
                    self.burst_applied += 1;
                }
                self.pointer = self.pointer.saturating_add(1);
            }
            // A stray byte without an address phase is a protocol
            // violation; drop it
            EngineState::Idle | EngineState::ReadBurst | EngineState::Error => {}
        }
    }

    /// Host is clocking a byte out of us.
    pub fn on_byte_requested(&mut self, port: &BusPort) -> u8 {
        match self.state {
            EngineState::ReadBurst => {
                let value = port.read_byte(self.pointer);
                self.pointer = self.pointer.saturating_add(1);
                value
            }
            _ => 0,
        }
    }

    /// Stop condition.
    pub fn on_stop(&mut self, hook: &mut dyn WriteHook) {
        self.complete_write_burst(hook);
        self.state = EngineState::Idle;
    }

    /// Bus error or arbitration loss. Bytes already fully received stay
    /// applied; everything else about the transaction is forgotten and no
    /// hook fires. The host is responsible for retrying.
    pub fn on_bus_fault(&mut self) {
        self.burst_applied = 0;
        self.state = EngineState::Error;
    }

    fn complete_write_burst(&mut self, hook: &mut dyn WriteHook) {
        if self.state == EngineState::WriteBurst && self.burst_applied > 0 {
            hook.on_register_write(self.burst_start, self.burst_applied);
        }
        self.burst_applied = 0;
    }
}

impl Default for SlaveEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regmap::{RegisterFile, REG_DEVICE_ID};
    use std::vec::Vec;

    struct RecordingHook {
        calls: Vec<(u8, u8)>,
    }

    impl RecordingHook {
        fn new() -> Self {
            Self { calls: Vec::new() }
        }
    }

    impl WriteHook for RecordingHook {
        fn on_register_write(&mut self, offset: u8, len: u8) {
            self.calls.push((offset, len));
        }
    }

    /// Drives a full host write transaction through the engine.
    fn write_transaction(
        engine: &mut SlaveEngine,
        port: &BusPort,
        hook: &mut dyn WriteHook,
        pointer: u8,
        data: &[u8],
    ) {
        engine.on_address_match(false, hook);
        engine.on_byte_received(port, pointer);
        for byte in data {
            engine.on_byte_received(port, *byte);
        }
        engine.on_stop(hook);
    }

    /// Drives a pointer write plus repeated-start read transaction.
    fn read_transaction(
        engine: &mut SlaveEngine,
        port: &BusPort,
        hook: &mut dyn WriteHook,
        pointer: u8,
        len: usize,
    ) -> Vec<u8> {
        engine.on_address_match(false, hook);
        engine.on_byte_received(port, pointer);
        engine.on_address_match(true, hook);
        let out = (0..len).map(|_| engine.on_byte_requested(port)).collect();
        engine.on_stop(hook);
        out
    }

    #[test]
    fn write_then_read_back() {
        let regs = RegisterFile::new();
        let port = BusPort::new(&regs);
        let mut engine = SlaveEngine::new();
        let mut hook = RecordingHook::new();

        write_transaction(&mut engine, &port, &mut hook, 8, &[0xAA, 0xBB, 0xCC]);
        assert_eq!(engine.state(), EngineState::Idle);

        let read = read_transaction(&mut engine, &port, &mut hook, 8, 3);
        assert_eq!(read, &[0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn hook_reports_start_offset_and_applied_length() {
        let regs = RegisterFile::new();
        let port = BusPort::new(&regs);
        let mut engine = SlaveEngine::new();
        let mut hook = RecordingHook::new();

        write_transaction(&mut engine, &port, &mut hook, 8, &[1, 2, 3, 4]);
        assert_eq!(hook.calls, &[(8, 4)]);
    }

    #[test]
    fn pointer_only_write_sets_pointer_without_hook() {
        let regs = RegisterFile::new();
        let port = BusPort::new(&regs);
        let mut engine = SlaveEngine::new();
        let mut hook = RecordingHook::new();

        write_transaction(&mut engine, &port, &mut hook, 14, &[]);
        assert!(hook.calls.is_empty());
        assert_eq!(engine.pointer(), 14);

        // A plain read transaction continues from the stored pointer
        regs.store(14, 0x55);
        engine.on_address_match(true, &mut hook);
        assert_eq!(engine.on_byte_requested(&port), 0x55);
        engine.on_stop(&mut hook);
    }

    #[test]
    fn burst_past_map_end_is_clamped_not_wrapped() {
        let regs = RegisterFile::new();
        regs.store(0, 0x77);
        let port = BusPort::new(&regs);
        let mut engine = SlaveEngine::new();
        let mut hook = RecordingHook::new();

        // Burst targeting 30..=33: only 30 and 31 exist
        write_transaction(&mut engine, &port, &mut hook, 30, &[0xA0, 0xA1, 0xA2, 0xA3]);

        assert_eq!(regs.load(30), 0xA0);
        assert_eq!(regs.load(31), 0xA1);
        // Nothing wrapped onto offset 0
        assert_eq!(regs.load(0), 0x77);
        assert_eq!(hook.calls, &[(30, 2)]);
    }

    #[test]
    fn read_past_map_end_returns_zero() {
        let regs = RegisterFile::new();
        regs.store(30, 0x30);
        regs.store(31, 0x31);
        let port = BusPort::new(&regs);
        let mut engine = SlaveEngine::new();
        let mut hook = NullHook;

        let read = read_transaction(&mut engine, &port, &mut hook, 30, 5);
        assert_eq!(read, &[0x30, 0x31, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn device_id_block_rejects_bus_writes() {
        let regs = RegisterFile::new();
        let port = BusPort::new(&regs);
        let mut engine = SlaveEngine::new();
        let mut hook = RecordingHook::new();

        // Burst straddling the read-only block: 15 applies, 16.. do not
        write_transaction(&mut engine, &port, &mut hook, 15, &[0x0F, 0x10, 0x11]);
        assert_eq!(regs.load(15), 0x0F);
        assert_eq!(regs.load(REG_DEVICE_ID), 0);
        assert_eq!(regs.load(REG_DEVICE_ID + 1), 0);
        assert_eq!(hook.calls, &[(15, 1)]);
    }

    #[test]
    fn read_only_engine_acks_and_discards() {
        let regs = RegisterFile::new();
        let port = BusPort::new(&regs);
        let mut engine = SlaveEngine::with_read_only(true);
        let mut hook = RecordingHook::new();

        write_transaction(&mut engine, &port, &mut hook, 8, &[0xAA, 0xBB]);
        assert_eq!(regs.load(8), 0);
        assert_eq!(regs.load(9), 0);
        // No mutation, no side effects
        assert!(hook.calls.is_empty());

        // Reads still work
        regs.store(8, 0x42);
        let read = read_transaction(&mut engine, &port, &mut hook, 8, 1);
        assert_eq!(read, &[0x42]);
    }

    #[test]
    fn bus_fault_resets_without_hook_and_keeps_applied_bytes() {
        let regs = RegisterFile::new();
        let port = BusPort::new(&regs);
        let mut engine = SlaveEngine::new();
        let mut hook = RecordingHook::new();

        engine.on_address_match(false, &mut hook);
        engine.on_byte_received(&port, 8);
        engine.on_byte_received(&port, 0xAA);
        engine.on_byte_received(&port, 0xBB);
        engine.on_bus_fault();

        assert_eq!(engine.state(), EngineState::Error);
        // Fully-received bytes stay applied; the burst hook never fires
        assert_eq!(regs.load(8), 0xAA);
        assert_eq!(regs.load(9), 0xBB);
        assert!(hook.calls.is_empty());

        // Stray bytes in Error state are dropped
        engine.on_byte_received(&port, 0xCC);
        assert_eq!(regs.load(10), 0);

        // Next start condition recovers the engine
        write_transaction(&mut engine, &port, &mut hook, 10, &[0xCC]);
        assert_eq!(regs.load(10), 0xCC);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(hook.calls, &[(10, 1)]);
    }

    #[test]
    fn repeated_start_read_completes_pending_write_burst() {
        let regs = RegisterFile::new();
        let port = BusPort::new(&regs);
        let mut engine = SlaveEngine::new();
        let mut hook = RecordingHook::new();

        engine.on_address_match(false, &mut hook);
        engine.on_byte_received(&port, 8);
        engine.on_byte_received(&port, 0x12);
        // Host issues a repeated start to read instead of a stop
        engine.on_address_match(true, &mut hook);
        assert_eq!(hook.calls, &[(8, 1)]);
        assert_eq!(engine.on_byte_requested(&port), 0x12);
        engine.on_stop(&mut hook);
        assert_eq!(hook.calls.len(), 1);
    }

    #[test]
    fn byte_requested_outside_read_burst_returns_zero() {
        let regs = RegisterFile::new();
        regs.store(0, 0xFF);
        let port = BusPort::new(&regs);
        let mut engine = SlaveEngine::new();

        assert_eq!(engine.on_byte_requested(&port), 0);
        assert_eq!(engine.state(), EngineState::Idle);
    }
}
