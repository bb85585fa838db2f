//! Decoded register map views

use pmic_core::convert::adc_to_vbat;
use pmic_core::input::InputState;
use pmic_core::regmap::{
    DEVICE_ID_LEN, REGISTER_COUNT, REG_ADC, REG_DEVICE_ID, REG_IN_STATE, REG_LED_R, REG_MILLIS,
};

/// The LED color registers plus the update trigger byte.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Nonzero while a repaint is pending on the device.
    pub trigger: u8,
}

/// All decoded fields of one full register map read.
///
/// Field names follow the wire tooling: `tm` for the millisecond counter,
/// `adc_val` for the raw sample, `in_state` for the input bitfield.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegisterSnapshot {
    /// Device uptime in milliseconds (offsets 4..=7, little-endian).
    #[cfg_attr(feature = "serde", serde(rename = "tm"))]
    pub millis: u32,
    /// Color registers and trigger (offsets 8..=11).
    pub led_color: LedColor,
    /// Raw battery sample (offsets 12..=13, little-endian).
    #[cfg_attr(feature = "serde", serde(rename = "adc_val"))]
    pub adc_sample: u16,
    /// Battery voltage derived from `adc_sample`.
    pub vbat: f32,
    /// Raw input-state byte (offset 14).
    pub in_state: u8,
    /// Device unique identifier (offsets 16..=27).
    pub device_id: [u8; DEVICE_ID_LEN],
}

impl RegisterSnapshot {
    /// Decodes a raw 32-byte map read.
    pub fn from_raw(raw: &[u8; REGISTER_COUNT]) -> Self {
        let m = REG_MILLIS as usize;
        let a = REG_ADC as usize;
        let c = REG_LED_R as usize;
        let id = REG_DEVICE_ID as usize;

        let adc_sample = u16::from_le_bytes([raw[a], raw[a + 1]]);
        let mut device_id = [0u8; DEVICE_ID_LEN];
        device_id.copy_from_slice(&raw[id..id + DEVICE_ID_LEN]);

        Self {
            millis: u32::from_le_bytes([raw[m], raw[m + 1], raw[m + 2], raw[m + 3]]),
            led_color: LedColor {
                r: raw[c],
                g: raw[c + 1],
                b: raw[c + 2],
                trigger: raw[c + 3],
            },
            adc_sample,
            vbat: adc_to_vbat(adc_sample),
            in_state: raw[REG_IN_STATE as usize],
            device_id,
        }
    }

    /// The input-state byte decoded into its flags.
    pub fn input_state(&self) -> InputState {
        InputState::from_bits_truncate(self.in_state)
    }
}
