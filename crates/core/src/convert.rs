//! ADC-to-voltage conversion
//!
//! The battery feeds the ADC pin through a resistor divider. Both the
//! firmware's low-battery threshold and the host tooling's displayed
//! voltage derive from the same constants, so they live here once.

/// ADC reference voltage in volts.
pub const VREF: f32 = 3.3;

/// Full-scale ADC reading (10-bit converter).
pub const ADC_MAX: f32 = 1024.0;

/// External divider ratio between the battery and the ADC pin.
pub const DIVIDER_RATIO: f32 = 2.0;

/// Converts a raw ADC sample to the battery voltage in volts.
pub fn adc_to_vbat(sample: u16) -> f32 {
    DIVIDER_RATIO * (VREF * (sample as f32 / ADC_MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sample_is_zero_volts() {
        assert_eq!(adc_to_vbat(0), 0.0);
    }

    #[test]
    fn full_scale_is_double_vref() {
        let vbat = adc_to_vbat(1024);
        assert!((vbat - 6.6).abs() < 1e-6);
    }

    #[test]
    fn threshold_sample_maps_near_three_point_six_volts() {
        // 560 counts is the low-battery threshold; the divider puts that at
        // 2.0 * 3.3 * 560/1024 = 3.609... V
        let vbat = adc_to_vbat(560);
        assert!((vbat - 3.609_375).abs() < 1e-5);
    }

    #[test]
    fn midpoint_sample() {
        let vbat = adc_to_vbat(512);
        assert!((vbat - 3.3).abs() < 1e-6);
    }
}
