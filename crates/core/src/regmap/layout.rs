//! Register map layout
//!
//! Fixed byte offsets of every field in the 32-byte map. Multi-byte fields
//! (the millisecond counter and the ADC sample) are little-endian.

/// Total size of the addressable register region in bytes.
pub const REGISTER_COUNT: usize = 32;

/// Default bus address of the device.
pub const DEFAULT_ADDRESS: u8 = 0x09;

/// Status LED on/off control, bit 0. Host-written.
pub const REG_STATUS_LED: u8 = 0;

/// Running millisecond counter, u32 little-endian, offsets 4..=7.
/// Foreground-written.
pub const REG_MILLIS: u8 = 4;

/// LED red component. Host-written.
pub const REG_LED_R: u8 = 8;
/// LED green component. Host-written.
pub const REG_LED_G: u8 = 9;
/// LED blue component. Host-written.
pub const REG_LED_B: u8 = 10;

/// LED update trigger: nonzero means a repaint is pending. Host-written,
/// consumed (cleared) by the foreground loop.
pub const REG_LED_UPDATE: u8 = 11;

/// Last ADC sample, u16 little-endian, offsets 12..=13. Foreground-written.
pub const REG_ADC: u8 = 12;

/// Input-state bitfield, see [`crate::input::InputState`].
/// Foreground-written.
pub const REG_IN_STATE: u8 = 14;

/// Device unique identifier, 12 bytes, offsets 16..=27. Populated once at
/// boot; read-only from the bus.
pub const REG_DEVICE_ID: u8 = 16;
/// Length of the device unique identifier in bytes.
pub const DEVICE_ID_LEN: usize = 12;

/// Shutdown trigger. Writing [`SHUTDOWN_SENTINEL`] cuts the power rail.
/// Host-written, consumed by its readers.
pub const REG_SHUTDOWN: u8 = 31;

/// The only value of [`REG_SHUTDOWN`] that triggers a shutdown.
pub const SHUTDOWN_SENTINEL: u8 = 0xFF;

/// Returns true for offsets inside the read-only device-id block.
pub const fn is_device_id(offset: u8) -> bool {
    offset >= REG_DEVICE_ID && (offset as usize) < REG_DEVICE_ID as usize + DEVICE_ID_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_range_covers_16_to_27() {
        assert!(!is_device_id(15));
        assert!(is_device_id(16));
        assert!(is_device_id(27));
        assert!(!is_device_id(28));
    }

    #[test]
    fn layout_fits_in_map() {
        assert!((REG_SHUTDOWN as usize) < REGISTER_COUNT);
        assert!(REG_DEVICE_ID as usize + DEVICE_ID_LEN <= REGISTER_COUNT);
    }
}
