//! Addressable status LED encoding
//!
//! The LED speaks a single-wire NZR protocol: every bit is one fixed-width
//! period whose high-time encodes the bit value. The peripheral driving
//! the wire pulls color frames through [`FrameSource`] at the moment each
//! LED is encoded, so register writes racing an in-flight transmission can
//! land in bits that have not been shifted out yet. That is a property of
//! the device contract, not a defect.

pub mod encoder;

pub use encoder::{encode_bit, encode_byte, FramePulses, Pulse, BIT_PERIOD_NS, T0H_NS, T1H_NS};

/// Supplies color frames to the transmitter, one (R, G, B) register triple
/// per LED index, sampled just-in-time.
pub trait FrameSource {
    /// Returns the frame for the LED at `index` in logical (R, G, B) order.
    fn led_frame(&self, index: usize) -> [u8; 3];
}

/// Order in which the three color bytes leave the wire.
///
/// Fixed at compile time per board (see the firmware config); never
/// runtime state.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorOrder {
    /// Red, green, blue, matching the register layout.
    Rgb,
    /// Green, red, blue, the WS2812B wire order.
    Grb,
}

impl ColorOrder {
    /// Reorders a logical (R, G, B) frame into wire order.
    pub fn apply(self, [r, g, b]: [u8; 3]) -> [u8; 3] {
        match self {
            ColorOrder::Rgb => [r, g, b],
            ColorOrder::Grb => [g, r, b],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_order_is_identity() {
        assert_eq!(ColorOrder::Rgb.apply([1, 2, 3]), [1, 2, 3]);
    }

    #[test]
    fn grb_order_swaps_first_two() {
        assert_eq!(ColorOrder::Grb.apply([0xFF, 0x00, 0x80]), [0x00, 0xFF, 0x80]);
    }
}
