//! Simulated LED shift engine
//!
//! Replays the hardware engine at pulse granularity: each LED's frame is
//! pulled from the color registers at the moment it is encoded, run
//! through the NZR encoder, and recovered from the pulse stream. With the
//! default configuration a transmission completes within `start` (a
//! 24-pulse frame is ~30 us, far below one foreground tick); a configured
//! stall keeps it in flight across [`StripHandle::step`] calls so tests
//! can observe the busy window and the just-in-time pull.

use std::cell::RefCell;
use std::rc::Rc;

use pmic_core::led::{encode_byte, FrameSource, Pulse};
use pmic_core::regmap::{RegisterFile, RegisterFrameSource};
use pmic_firmware::config::COLOR_ORDER;
use pmic_firmware::platform::{LedBusy, LedStrip};

/// One logical (R, G, B) frame as recovered from the pulse stream.
pub type Frame = [u8; 3];

struct InFlight {
    n_leds: usize,
    next_led: usize,
    stall: u32,
    frames: Vec<Frame>,
}

struct StripState {
    source: RegisterFrameSource<'static>,
    in_flight: Option<InFlight>,
    completed: Vec<Vec<Frame>>,
    stall_per_start: u32,
}

impl StripState {
    /// Encodes one LED, completing the transmission on the last one.
    fn advance(&mut self) {
        let done = match &mut self.in_flight {
            Some(tx) => {
                if tx.next_led >= tx.n_leds {
                    true
                } else if tx.stall > 0 {
                    tx.stall -= 1;
                    false
                } else {
                    // Just-in-time pull: the registers as they are *now*
                    let logical = self.source.led_frame(tx.next_led);
                    let wire = COLOR_ORDER.apply(logical);

                    let mut decoded_wire = [0u8; 3];
                    for (i, byte) in wire.iter().enumerate() {
                        decoded_wire[i] = decode_pulses(&encode_byte(*byte));
                    }
                    // Both supported wire orders are their own inverse
                    tx.frames.push(COLOR_ORDER.apply(decoded_wire));

                    tx.next_led += 1;
                    tx.next_led == tx.n_leds
                }
            }
            None => false,
        };
        if done {
            if let Some(tx) = self.in_flight.take() {
                self.completed.push(tx.frames);
            }
        }
    }
}

/// Recovers a byte from its eight pulses, most significant bit first.
fn decode_pulses(pulses: &[Pulse; 8]) -> u8 {
    pulses
        .iter()
        .fold(0u8, |acc, pulse| (acc << 1) | pulse.encodes_one() as u8)
}

/// Test-side handle: advances the simulated hardware and inspects its
/// output.
#[derive(Clone)]
pub struct StripHandle {
    state: Rc<RefCell<StripState>>,
}

impl StripHandle {
    /// Makes subsequent transmissions idle for `ticks` steps before the
    /// first frame is encoded, keeping the busy window observable.
    pub fn set_stall(&self, ticks: u32) {
        self.state.borrow_mut().stall_per_start = ticks;
    }

    /// Advances the autonomous engine by one tick.
    pub fn step(&self) {
        self.state.borrow_mut().advance();
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().in_flight.is_some()
    }

    /// Drains the completed transmissions, oldest first.
    pub fn take_completed(&self) -> Vec<Vec<Frame>> {
        std::mem::take(&mut self.state.borrow_mut().completed)
    }

    pub fn completed_count(&self) -> usize {
        self.state.borrow().completed.len()
    }

    /// Frames of the most recent completed transmission.
    pub fn last_transmission(&self) -> Option<Vec<Frame>> {
        self.state.borrow().completed.last().cloned()
    }
}

/// The device-owned half.
pub struct SimLedStrip {
    state: Rc<RefCell<StripState>>,
}

impl SimLedStrip {
    pub fn new(regs: &'static RegisterFile) -> (Self, StripHandle) {
        let state = Rc::new(RefCell::new(StripState {
            source: RegisterFrameSource::new(regs),
            in_flight: None,
            completed: Vec::new(),
            stall_per_start: 0,
        }));
        (
            Self {
                state: Rc::clone(&state),
            },
            StripHandle { state },
        )
    }
}

impl LedStrip for SimLedStrip {
    fn start(&mut self, n_leds: usize) -> Result<(), LedBusy> {
        let mut state = self.state.borrow_mut();
        if state.in_flight.is_some() {
            return Err(LedBusy);
        }
        state.in_flight = Some(InFlight {
            n_leds,
            next_led: 0,
            stall: state.stall_per_start,
            frames: Vec::new(),
        });
        // A short chain shifts out well inside one foreground tick; only
        // a configured stall keeps the transmission in flight
        if state.stall_per_start == 0 {
            while state.in_flight.is_some() {
                state.advance();
            }
        }
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.state.borrow().in_flight.is_some()
    }
}
