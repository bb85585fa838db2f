//! Peripheral traits
//!
//! Everything the device runtime needs from a board, and nothing more.
//! Implemented by the mock board for host tests, by the simulation crate
//! for end-to-end runs, and by a target HAL on real hardware.

/// Errors from a battery ADC conversion.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcError {
    /// The conversion did not complete within the implementation's
    /// configured budget. A stuck analog front end surfaces here instead
    /// of hanging the foreground loop.
    Timeout,
}

impl core::fmt::Display for AdcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AdcError::Timeout => write!(f, "adc conversion timed out"),
        }
    }
}

/// Battery voltage ADC.
///
/// `sample` blocks until the conversion completes or the implementation's
/// timeout expires. Implementations must bound the wait; unbounded
/// busy-wait on the end-of-conversion flag is exactly the failure mode
/// [`AdcError::Timeout`] exists to report.
pub trait BatteryAdc {
    /// Runs one conversion and returns the raw counts.
    fn sample(&mut self) -> Result<u16, AdcError>;
}

/// Raw digital input levels. Sampled every foreground iteration; no
/// debouncing at this layer (the host counts repeated polls instead).
pub trait InputPins {
    /// Charger CHRG pin level (low while charging).
    fn charge_level(&self) -> bool;
    /// Charger STDBY pin level.
    fn standby_level(&self) -> bool;
    /// Radio-link indicator pin level.
    fn radio_link_level(&self) -> bool;
    /// Power button pin level (low while pressed).
    fn button_level(&self) -> bool;
}

/// The output keeping the device's own supply enabled.
///
/// `shutdown` is irreversible for the current power cycle: once the rail
/// drops, only the physical power path brings the device back.
pub trait PowerRail {
    /// Asserts the enable output (boot).
    fn enable(&mut self);
    /// Deasserts the enable output, cutting our own supply.
    fn shutdown(&mut self);
    /// Current state of the enable output.
    fn is_enabled(&self) -> bool;
}

/// The host-controlled status LED (register offset 0, bit 0).
pub trait StatusLed {
    fn set(&mut self, on: bool);
}

/// Returned by [`LedStrip::start`] while a transmission is in flight.
///
/// The caller defers: the update trigger stays pending and the start is
/// retried on a later iteration. Nothing is queued in the peripheral.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedBusy;

impl core::fmt::Display for LedBusy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "led transmission in flight")
    }
}

/// The autonomous LED shift engine.
///
/// Bound to its frame source (the color registers) at construction; the
/// engine pulls each LED's bytes just-in-time while shifting, so writes
/// racing a transmission can land in untransmitted bits. `start` arms the
/// engine and returns immediately; completion is observed by polling
/// [`LedStrip::is_busy`]; there is no completion callback.
pub trait LedStrip {
    /// Arms a one-shot transmission of `n_leds` frames.
    fn start(&mut self, n_leds: usize) -> Result<(), LedBusy>;
    /// True while a transmission is in flight.
    fn is_busy(&self) -> bool;
}
