//! Simulated battery ADC

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use pmic_firmware::platform::{AdcError, BatteryAdc};
use rand::Rng;

#[derive(Default)]
struct AdcState {
    script: VecDeque<u16>,
    default: u16,
    noise: u16,
    stuck: bool,
}

/// Test-side handle to the simulated ADC.
#[derive(Clone, Default)]
pub struct AdcHandle {
    state: Rc<RefCell<AdcState>>,
    conversions: Rc<Cell<u32>>,
}

impl AdcHandle {
    /// Steady-state sample returned once the script is drained.
    pub fn set_default(&self, sample: u16) {
        self.state.borrow_mut().default = sample;
    }

    /// Queues samples returned in order before the default applies.
    pub fn push_samples(&self, samples: &[u16]) {
        let mut state = self.state.borrow_mut();
        state.script.extend(samples.iter().copied());
    }

    /// Adds uniform jitter of up to `amount` counts on every conversion.
    pub fn set_noise(&self, amount: u16) {
        self.state.borrow_mut().noise = amount;
    }

    /// Simulates a stuck analog front end: every conversion times out
    /// until cleared.
    pub fn set_stuck(&self, stuck: bool) {
        self.state.borrow_mut().stuck = stuck;
    }

    /// Number of conversions the device has requested.
    pub fn conversions(&self) -> u32 {
        self.conversions.get()
    }
}

/// The device-owned half.
pub struct SimAdc {
    handle: AdcHandle,
}

impl SimAdc {
    pub fn new(handle: AdcHandle) -> Self {
        Self { handle }
    }
}

impl BatteryAdc for SimAdc {
    fn sample(&mut self) -> Result<u16, AdcError> {
        self.handle.conversions.set(self.handle.conversions.get() + 1);
        let mut state = self.handle.state.borrow_mut();
        if state.stuck {
            return Err(AdcError::Timeout);
        }
        let base = state.script.pop_front().unwrap_or(state.default);
        if state.noise == 0 {
            Ok(base)
        } else {
            let jitter = rand::thread_rng().gen_range(0..=state.noise);
            Ok(base.saturating_add(jitter))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_then_default() {
        let handle = AdcHandle::default();
        handle.set_default(700);
        handle.push_samples(&[500, 501]);
        let mut adc = SimAdc::new(handle.clone());

        assert_eq!(adc.sample(), Ok(500));
        assert_eq!(adc.sample(), Ok(501));
        assert_eq!(adc.sample(), Ok(700));
        assert_eq!(handle.conversions(), 3);
    }

    #[test]
    fn stuck_front_end_times_out() {
        let handle = AdcHandle::default();
        handle.set_stuck(true);
        let mut adc = SimAdc::new(handle.clone());
        assert_eq!(adc.sample(), Err(AdcError::Timeout));

        handle.set_stuck(false);
        assert!(adc.sample().is_ok());
    }

    #[test]
    fn noise_stays_within_bounds() {
        let handle = AdcHandle::default();
        handle.set_default(600);
        handle.set_noise(5);
        let mut adc = SimAdc::new(handle);
        for _ in 0..100 {
            let sample = adc.sample().unwrap();
            assert!((600..=605).contains(&sample));
        }
    }
}
