//! Input-state bitfield (register offset 14)
//!
//! One byte of raw GPIO levels plus the battery-low flag, refreshed by the
//! foreground loop every iteration. The charge and power-button inputs are
//! active-low at the pin; this byte stores the *level*, decoding is the
//! host's job.

use bitflags::bitflags;

bitflags! {
    /// Bit assignments of the input-state register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InputState: u8 {
        /// Charger CHRG pin level (low while charging).
        const CHARGE = 1 << 0;
        /// Charger STDBY pin level.
        const STANDBY = 1 << 1;
        /// Radio-link indicator pin level.
        const RADIO_LINK = 1 << 2;
        /// Power button pin level (low while pressed).
        const POWER_BUTTON = 1 << 3;
        /// Set by the supervisor while the battery reads below threshold.
        const BATTERY_LOW = 1 << 4;
    }
}

impl InputState {
    /// Composes the register byte from raw pin levels and the supervisor's
    /// battery verdict.
    pub fn from_levels(
        charge: bool,
        standby: bool,
        radio_link: bool,
        power_button: bool,
        battery_low: bool,
    ) -> Self {
        let mut state = InputState::empty();
        state.set(InputState::CHARGE, charge);
        state.set(InputState::STANDBY, standby);
        state.set(InputState::RADIO_LINK, radio_link);
        state.set(InputState::POWER_BUTTON, power_button);
        state.set(InputState::BATTERY_LOW, battery_low);
        state
    }

    /// Charger CHRG level; low (false) means actively charging.
    pub fn charge_level(&self) -> bool {
        self.contains(InputState::CHARGE)
    }

    /// Charger STDBY level.
    pub fn standby_level(&self) -> bool {
        self.contains(InputState::STANDBY)
    }

    /// Radio-link indicator level.
    pub fn radio_link_level(&self) -> bool {
        self.contains(InputState::RADIO_LINK)
    }

    /// Power button level; low (false) means pressed.
    pub fn button_level(&self) -> bool {
        self.contains(InputState::POWER_BUTTON)
    }

    /// True while the supervisor classifies the battery as low.
    pub fn battery_low(&self) -> bool {
        self.contains(InputState::BATTERY_LOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_bit_is_bit_zero() {
        let state = InputState::from_bits_truncate(0b0000_0001);
        assert!(state.charge_level());
        assert!(!state.standby_level());
        assert!(!state.radio_link_level());
        assert!(!state.button_level());
        assert!(!state.battery_low());
    }

    #[test]
    fn standby_bit_is_bit_one() {
        let state = InputState::from_bits_truncate(0b0000_0010);
        assert!(state.standby_level());
        assert_eq!(state.bits(), 0b0000_0010);
    }

    #[test]
    fn radio_link_bit_is_bit_two() {
        let state = InputState::from_bits_truncate(0b0000_0100);
        assert!(state.radio_link_level());
        assert_eq!(state.bits(), 0b0000_0100);
    }

    #[test]
    fn button_bit_is_bit_three() {
        let state = InputState::from_bits_truncate(0b0000_1000);
        assert!(state.button_level());
        assert_eq!(state.bits(), 0b0000_1000);
    }

    #[test]
    fn battery_low_bit_is_bit_four() {
        let state = InputState::from_bits_truncate(0b0001_0000);
        assert!(state.battery_low());
        assert_eq!(state.bits(), 0b0001_0000);
    }

    #[test]
    fn upper_bits_are_reserved() {
        let state = InputState::from_bits_truncate(0b1110_0000);
        assert_eq!(state.bits(), 0);
    }

    #[test]
    fn from_levels_composes_all_bits() {
        let state = InputState::from_levels(true, false, true, false, true);
        assert_eq!(
            state,
            InputState::CHARGE | InputState::RADIO_LINK | InputState::BATTERY_LOW
        );
        assert_eq!(state.bits(), 0b0001_0101);
    }
}
