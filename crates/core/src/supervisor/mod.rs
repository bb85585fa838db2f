//! Battery supervision
//!
//! Voltage-based shutdown policy with hysteresis: a fixed number of
//! consecutive below-threshold samples must accumulate before the power
//! rail is cut. Any in-range sample reloads the counter in full. Reaching
//! zero is terminal for the power cycle; only a physical power cycle (or
//! the boot-time held-button path) recovers.
//!
//! Pure logic module, no peripheral access. The foreground task owns the
//! sampling cadence and the rail itself.

/// ADC threshold below which a sample counts as low (strict less-than).
pub const ADC_LOW_THRESHOLD: u16 = 560;

/// Consecutive low samples required before shutdown.
pub const HYSTERESIS_RELOAD: u8 = 10;

/// Milliseconds between battery samples.
pub const ADC_SAMPLE_INTERVAL_MS: u32 = 5000;

/// Supervisory power state derived from the hysteresis counter.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    /// Battery in range, counter at full reload.
    Normal,
    /// At least one recent low sample; counting down.
    LowWarning,
    /// Counter exhausted; the rail has been ordered off. Terminal.
    Shutdown,
}

/// Outcome of feeding one ADC sample to the monitor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryVerdict {
    /// Sample in range; counter reloaded.
    Normal,
    /// Sample below threshold; `remaining` more low samples until shutdown.
    Low { remaining: u8 },
    /// This sample exhausted the counter. Returned exactly once.
    Shutdown,
}

/// Hysteresis counter over battery ADC samples.
pub struct BatteryMonitor {
    threshold: u16,
    reload: u8,
    counter: u8,
    shutdown_fired: bool,
}

impl BatteryMonitor {
    /// Creates a monitor with the production threshold and reload count.
    pub fn new() -> Self {
        Self::with_limits(ADC_LOW_THRESHOLD, HYSTERESIS_RELOAD)
    }

    /// Creates a monitor with explicit limits (tests, alternate boards).
    pub fn with_limits(threshold: u16, reload: u8) -> Self {
        Self {
            threshold,
            reload,
            counter: reload,
            shutdown_fired: false,
        }
    }

    /// Feeds one sample.
    ///
    /// `Shutdown` is returned exactly once, on the sample that exhausts
    /// the counter. After that the monitor is terminal: further samples
    /// report `Low { remaining: 0 }` and in-range samples no longer reset
    /// anything.
    pub fn sample(&mut self, adc: u16) -> BatteryVerdict {
        if self.shutdown_fired {
            return BatteryVerdict::Low { remaining: 0 };
        }

        if adc < self.threshold {
            self.counter -= 1;
            if self.counter == 0 {
                self.shutdown_fired = true;
                return BatteryVerdict::Shutdown;
            }
            BatteryVerdict::Low {
                remaining: self.counter,
            }
        } else {
            // Full reload, no partial credit across a normal sample
            self.counter = self.reload;
            BatteryVerdict::Normal
        }
    }

    /// Current supervisory state.
    pub fn state(&self) -> PowerState {
        if self.shutdown_fired {
            PowerState::Shutdown
        } else if self.counter < self.reload {
            PowerState::LowWarning
        } else {
            PowerState::Normal
        }
    }

    /// True while the last sample left the battery classified low. Drives
    /// the battery-low bit in the input-state register.
    pub fn battery_low(&self) -> bool {
        self.shutdown_fired || self.counter < self.reload
    }

    /// Resets counter and terminal flag. Boot-time only.
    pub fn reset(&mut self) {
        self.counter = self.reload;
        self.shutdown_fired = false;
    }
}

impl Default for BatteryMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_samples_never_trigger() {
        let mut monitor = BatteryMonitor::new();
        for _ in 0..100 {
            assert_eq!(monitor.sample(800), BatteryVerdict::Normal);
        }
        assert_eq!(monitor.state(), PowerState::Normal);
    }

    #[test]
    fn shutdown_fires_on_tenth_low_sample_never_earlier() {
        let mut monitor = BatteryMonitor::new();

        for n in 1..=9 {
            assert_eq!(
                monitor.sample(500),
                BatteryVerdict::Low { remaining: 10 - n }
            );
            assert_eq!(monitor.state(), PowerState::LowWarning);
        }

        assert_eq!(monitor.sample(500), BatteryVerdict::Shutdown);
        assert_eq!(monitor.state(), PowerState::Shutdown);
    }

    #[test]
    fn shutdown_is_returned_exactly_once() {
        let mut monitor = BatteryMonitor::new();
        for _ in 0..10 {
            monitor.sample(0);
        }
        for _ in 0..20 {
            assert_eq!(monitor.sample(0), BatteryVerdict::Low { remaining: 0 });
        }
    }

    #[test]
    fn one_normal_sample_reloads_in_full() {
        let mut monitor = BatteryMonitor::new();

        for _ in 0..9 {
            monitor.sample(500);
        }
        // Recovery wipes all accumulated history
        assert_eq!(monitor.sample(600), BatteryVerdict::Normal);

        for n in 1..=9 {
            assert_eq!(
                monitor.sample(500),
                BatteryVerdict::Low { remaining: 10 - n }
            );
        }
        assert_eq!(monitor.sample(500), BatteryVerdict::Shutdown);
    }

    #[test]
    fn threshold_boundary_is_strict_less_than() {
        let mut monitor = BatteryMonitor::new();

        // 560 with threshold 560: not below, classified normal
        assert_eq!(monitor.sample(560), BatteryVerdict::Normal);
        assert_eq!(monitor.sample(561), BatteryVerdict::Normal);
        assert_eq!(monitor.sample(559), BatteryVerdict::Low { remaining: 9 });
    }

    #[test]
    fn terminal_state_ignores_recovery() {
        let mut monitor = BatteryMonitor::new();
        for _ in 0..10 {
            monitor.sample(0);
        }
        // In-range samples after shutdown change nothing
        assert_eq!(monitor.sample(1000), BatteryVerdict::Low { remaining: 0 });
        assert_eq!(monitor.state(), PowerState::Shutdown);
        assert!(monitor.battery_low());
    }

    #[test]
    fn battery_low_tracks_counter() {
        let mut monitor = BatteryMonitor::new();
        assert!(!monitor.battery_low());
        monitor.sample(100);
        assert!(monitor.battery_low());
        monitor.sample(600);
        assert!(!monitor.battery_low());
    }

    #[test]
    fn reset_clears_terminal_state() {
        let mut monitor = BatteryMonitor::new();
        for _ in 0..10 {
            monitor.sample(0);
        }
        monitor.reset();
        assert_eq!(monitor.state(), PowerState::Normal);
        assert_eq!(monitor.sample(500), BatteryVerdict::Low { remaining: 9 });
    }
}
