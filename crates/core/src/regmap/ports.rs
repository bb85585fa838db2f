//! Capability ports over the register file
//!
//! Each execution role gets a view exposing exactly the operations it is
//! allowed to perform, instead of raw access to the shared array. The
//! single-writer-per-field invariant is enforced by what each port does
//! and does not offer.

use crate::input::InputState;
use crate::led::FrameSource;

use super::file::RegisterFile;
use super::layout::{
    is_device_id, REG_ADC, REG_IN_STATE, REG_LED_B, REG_LED_G, REG_LED_R, REG_LED_UPDATE,
    REG_MILLIS, REG_SHUTDOWN, REG_STATUS_LED, SHUTDOWN_SENTINEL,
};

/// The bus slave engine's view of the map.
///
/// Runs in interrupt context. May read every byte and write any host-owned
/// byte; writes into the device-id block or past the end of the map are
/// acknowledged at the bus level but discarded here.
#[derive(Clone, Copy)]
pub struct BusPort<'a> {
    regs: &'a RegisterFile,
}

impl<'a> BusPort<'a> {
    pub fn new(regs: &'a RegisterFile) -> Self {
        Self { regs }
    }

    /// Reads one byte; offsets past the end of the map read as zero.
    pub fn read_byte(&self, offset: u8) -> u8 {
        self.regs.load(offset)
    }

    /// Writes one byte. Returns whether the byte was applied; writes past
    /// the map end and into the device-id block are discarded.
    pub fn write_byte(&self, offset: u8, value: u8) -> bool {
        if is_device_id(offset) {
            return false;
        }
        self.regs.store(offset, value)
    }

    /// True when the shutdown register currently holds the sentinel. Used
    /// by write hooks that act in interrupt context; consumption is left
    /// to the foreground port.
    pub fn shutdown_requested(&self) -> bool {
        self.regs.load(REG_SHUTDOWN) == SHUTDOWN_SENTINEL
    }

    /// Current state of the host-controlled status LED bit.
    pub fn status_led(&self) -> bool {
        self.regs.load(REG_STATUS_LED) & 1 != 0
    }
}

/// The foreground supervisor's view of the map.
///
/// Owns the foreground-written fields (millisecond counter, ADC sample,
/// input state) and is the designated consumer of both edge-triggered
/// trigger bytes.
#[derive(Clone, Copy)]
pub struct SupervisorPort<'a> {
    regs: &'a RegisterFile,
}

impl<'a> SupervisorPort<'a> {
    pub fn new(regs: &'a RegisterFile) -> Self {
        Self { regs }
    }

    /// Current millisecond counter value.
    pub fn millis(&self) -> u32 {
        self.regs.load_u32_le(REG_MILLIS)
    }

    /// Advances the millisecond counter by one.
    pub fn increment_millis(&self) {
        let next = self.millis().wrapping_add(1);
        self.regs.store_u32_le(REG_MILLIS, next);
    }

    /// Publishes the latest ADC sample at offsets 12..=13.
    pub fn set_adc_sample(&self, sample: u16) {
        self.regs.store_u16_le(REG_ADC, sample);
    }

    /// Publishes the input-state bitfield at offset 14.
    pub fn set_input_state(&self, state: InputState) {
        self.regs.store(REG_IN_STATE, state.bits());
    }

    /// True when the host has armed an LED repaint. Does not consume the
    /// trigger; pairs with [`Self::clear_led_update`] so a repaint deferred
    /// behind a busy transmitter stays pending.
    pub fn led_update_pending(&self) -> bool {
        self.regs.load(REG_LED_UPDATE) != 0
    }

    /// Consumes the LED update trigger after a transmission was started.
    pub fn clear_led_update(&self) {
        self.regs.store(REG_LED_UPDATE, 0);
    }

    /// Consumes the shutdown trigger. Returns true exactly when the
    /// sentinel value was present.
    pub fn take_shutdown(&self) -> bool {
        self.regs.consume_if(REG_SHUTDOWN, SHUTDOWN_SENTINEL)
    }

    /// Current host-requested LED color as an (R, G, B) register triple.
    pub fn led_color(&self) -> [u8; 3] {
        [
            self.regs.load(REG_LED_R),
            self.regs.load(REG_LED_G),
            self.regs.load(REG_LED_B),
        ]
    }
}

/// Frame source that reads the color registers at the moment a frame is
/// encoded, not when the transmission was armed.
///
/// Every LED index maps to the same register triple, matching the single
/// color field in the map.
#[derive(Clone, Copy)]
pub struct RegisterFrameSource<'a> {
    regs: &'a RegisterFile,
}

impl<'a> RegisterFrameSource<'a> {
    pub fn new(regs: &'a RegisterFile) -> Self {
        Self { regs }
    }
}

impl FrameSource for RegisterFrameSource<'_> {
    fn led_frame(&self, _index: usize) -> [u8; 3] {
        [
            self.regs.load(REG_LED_R),
            self.regs.load(REG_LED_G),
            self.regs.load(REG_LED_B),
        ]
    }
}
