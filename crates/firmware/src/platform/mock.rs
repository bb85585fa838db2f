//! Mock board
//!
//! Host-side implementations of every peripheral trait, with scripted
//! inputs and captured outputs. Always compiled so downstream crates can
//! build harnesses from the same parts the unit tests use.

use core::cell::RefCell;

use heapless::{Deque, Vec};
use pmic_core::led::FrameSource;
use pmic_core::regmap::{RegisterFile, RegisterFrameSource};

use super::traits::{AdcError, BatteryAdc, InputPins, LedBusy, LedStrip, PowerRail, StatusLed};

/// Scripted battery ADC. Returns queued results in order, then the
/// default sample forever.
pub struct MockAdc {
    script: Deque<Result<u16, AdcError>, 64>,
    default: u16,
}

impl MockAdc {
    /// ADC that always reads `default` counts.
    pub fn new(default: u16) -> Self {
        Self {
            script: Deque::new(),
            default,
        }
    }

    pub fn set_default(&mut self, sample: u16) {
        self.default = sample;
    }

    /// Queues one conversion result.
    pub fn push_sample(&mut self, sample: u16) {
        let _ = self.script.push_back(Ok(sample));
    }

    /// Queues one stuck conversion.
    pub fn push_timeout(&mut self) {
        let _ = self.script.push_back(Err(AdcError::Timeout));
    }
}

impl BatteryAdc for MockAdc {
    fn sample(&mut self) -> Result<u16, AdcError> {
        self.script.pop_front().unwrap_or(Ok(self.default))
    }
}

/// Settable input pin levels.
///
/// Defaults model the idle board: button released (high, pull-up),
/// charger inactive (CHRG high), standby and radio-link low. The button
/// can additionally play a scripted level sequence, one entry per read,
/// for exercising the boot-time release wait.
pub struct MockInputs {
    pub charge: bool,
    pub standby: bool,
    pub radio_link: bool,
    pub button: bool,
    button_script: RefCell<Deque<bool, 16>>,
}

impl Default for MockInputs {
    fn default() -> Self {
        Self {
            charge: true,
            standby: false,
            radio_link: false,
            button: true,
            button_script: RefCell::new(Deque::new()),
        }
    }
}

impl MockInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues button levels returned by the next reads, before falling
    /// back to the steady `button` field.
    pub fn push_button_levels(&mut self, levels: &[bool]) {
        let mut script = self.button_script.borrow_mut();
        for level in levels {
            let _ = script.push_back(*level);
        }
    }
}

impl InputPins for MockInputs {
    fn charge_level(&self) -> bool {
        self.charge
    }

    fn standby_level(&self) -> bool {
        self.standby
    }

    fn radio_link_level(&self) -> bool {
        self.radio_link
    }

    fn button_level(&self) -> bool {
        self.button_script
            .borrow_mut()
            .pop_front()
            .unwrap_or(self.button)
    }
}

/// Power-enable output with a deassertion counter, so tests can assert the
/// rail was cut exactly once.
#[derive(Default)]
pub struct MockRail {
    enabled: bool,
    shutdown_count: u32,
}

impl MockRail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shutdown_count(&self) -> u32 {
        self.shutdown_count
    }
}

impl PowerRail for MockRail {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn shutdown(&mut self) {
        self.enabled = false;
        self.shutdown_count += 1;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Status LED latch.
#[derive(Default)]
pub struct MockStatusLed {
    on: bool,
    set_count: u32,
}

impl MockStatusLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn set_count(&self) -> u32 {
        self.set_count
    }
}

impl StatusLed for MockStatusLed {
    fn set(&mut self, on: bool) {
        self.on = on;
        self.set_count += 1;
    }
}

/// One captured transmission: the logical (R, G, B) frames as pulled from
/// the color registers.
pub type CapturedFrames = Vec<[u8; 3], 4>;

/// LED shift engine that captures frames instead of driving a wire.
///
/// Frames are pulled when `start` is called. Busy behavior is scripted:
/// `busy_after_start` foreground ticks of busy per transmission, plus
/// [`MockStrip::set_busy_for`] for direct control. The simulation crate
/// models the pulse-level just-in-time variant; this mock covers the
/// runtime's arm/defer/poll logic.
pub struct MockStrip<'a> {
    source: RegisterFrameSource<'a>,
    transmissions: Vec<CapturedFrames, 8>,
    busy_ticks: u8,
    busy_after_start: u8,
    rejected: u32,
}

impl<'a> MockStrip<'a> {
    pub fn new(regs: &'a RegisterFile) -> Self {
        Self {
            source: RegisterFrameSource::new(regs),
            transmissions: Vec::new(),
            busy_ticks: 0,
            busy_after_start: 0,
            rejected: 0,
        }
    }

    /// Makes every accepted start keep the engine busy for `ticks` calls
    /// to [`MockStrip::tick`].
    pub fn set_busy_after_start(&mut self, ticks: u8) {
        self.busy_after_start = ticks;
    }

    /// Forces the busy flag for the next `ticks` ticks.
    pub fn set_busy_for(&mut self, ticks: u8) {
        self.busy_ticks = ticks;
    }

    /// Advances the simulated shift engine by one foreground iteration.
    pub fn tick(&mut self) {
        self.busy_ticks = self.busy_ticks.saturating_sub(1);
    }

    /// All captured transmissions, oldest first.
    pub fn transmissions(&self) -> &[CapturedFrames] {
        &self.transmissions
    }

    /// Frames of the most recent transmission.
    pub fn last_frames(&self) -> Option<&CapturedFrames> {
        self.transmissions.last()
    }

    /// Number of starts rejected while busy.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}

impl LedStrip for MockStrip<'_> {
    fn start(&mut self, n_leds: usize) -> Result<(), LedBusy> {
        if self.busy_ticks > 0 {
            self.rejected += 1;
            return Err(LedBusy);
        }
        let mut frames = CapturedFrames::new();
        for index in 0..n_leds {
            let _ = frames.push(self.source.led_frame(index));
        }
        let _ = self.transmissions.push(frames);
        self.busy_ticks = self.busy_after_start;
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.busy_ticks > 0
    }
}

/// Delay provider that only counts.
#[derive(Default)]
pub struct MockDelay {
    total_ns: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated delay in milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;
    use pmic_core::regmap::{REG_LED_B, REG_LED_G, REG_LED_R};

    #[test]
    fn adc_plays_script_then_default() {
        let mut adc = MockAdc::new(700);
        adc.push_sample(500);
        adc.push_timeout();

        assert_eq!(adc.sample(), Ok(500));
        assert_eq!(adc.sample(), Err(AdcError::Timeout));
        assert_eq!(adc.sample(), Ok(700));
        assert_eq!(adc.sample(), Ok(700));
    }

    #[test]
    fn rail_counts_shutdowns() {
        let mut rail = MockRail::new();
        rail.enable();
        assert!(rail.is_enabled());
        rail.shutdown();
        rail.shutdown();
        assert!(!rail.is_enabled());
        assert_eq!(rail.shutdown_count(), 2);
    }

    #[test]
    fn strip_captures_frames_at_start() {
        let regs = RegisterFile::new();
        regs.store(REG_LED_R, 0xFF);
        regs.store(REG_LED_G, 0x00);
        regs.store(REG_LED_B, 0x80);

        let mut strip = MockStrip::new(&regs);
        strip.start(1).unwrap();
        assert_eq!(strip.last_frames().unwrap().as_slice(), &[[0xFF, 0x00, 0x80]]);
    }

    #[test]
    fn strip_busy_rejects_and_ticks_down() {
        let regs = RegisterFile::new();
        let mut strip = MockStrip::new(&regs);
        strip.set_busy_for(2);

        assert_eq!(strip.start(1), Err(LedBusy));
        assert!(strip.is_busy());
        assert_eq!(strip.rejected(), 1);

        strip.tick();
        strip.tick();
        assert!(!strip.is_busy());
        assert!(strip.start(1).is_ok());
    }

    #[test]
    fn delay_accumulates() {
        let mut delay = MockDelay::new();
        delay.delay_ms(3);
        delay.delay_us(2000);
        assert_eq!(delay.total_ms(), 5);
    }
}
