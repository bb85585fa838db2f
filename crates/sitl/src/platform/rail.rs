//! Simulated power rail and status LED

use std::cell::Cell;
use std::rc::Rc;

use pmic_firmware::platform::{PowerRail, StatusLed};

/// Test-side handle to the power-enable output.
#[derive(Clone, Default)]
pub struct RailHandle {
    enabled: Rc<Cell<bool>>,
    shutdowns: Rc<Cell<u32>>,
}

impl RailHandle {
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// How many times the rail has been ordered off.
    pub fn shutdowns(&self) -> u32 {
        self.shutdowns.get()
    }
}

/// The device-owned half.
pub struct SimRail {
    handle: RailHandle,
}

impl SimRail {
    pub fn new(handle: RailHandle) -> Self {
        Self { handle }
    }
}

impl PowerRail for SimRail {
    fn enable(&mut self) {
        self.handle.enabled.set(true);
    }

    fn shutdown(&mut self) {
        self.handle.enabled.set(false);
        self.handle.shutdowns.set(self.handle.shutdowns.get() + 1);
    }

    fn is_enabled(&self) -> bool {
        self.handle.enabled.get()
    }
}

/// Test-side handle to the discrete status LED.
#[derive(Clone, Default)]
pub struct StatusLedHandle {
    on: Rc<Cell<bool>>,
}

impl StatusLedHandle {
    pub fn is_on(&self) -> bool {
        self.on.get()
    }
}

/// The device-owned half.
pub struct SimStatusLed {
    handle: StatusLedHandle,
}

impl SimStatusLed {
    pub fn new(handle: StatusLedHandle) -> Self {
        Self { handle }
    }
}

impl StatusLed for SimStatusLed {
    fn set(&mut self, on: bool) {
        self.handle.on.set(on);
    }
}
