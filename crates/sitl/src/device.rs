//! Simulated device harness

use std::cell::RefCell;
use std::rc::Rc;

use pmic_core::regmap::RegisterFile;
use pmic_core::supervisor::PowerState;
use pmic_firmware::device::{Device, Peripherals};
use pmic_firmware::platform::mock::MockDelay;

use crate::bus::SimBus;
use crate::platform::{
    AdcHandle, InputHandles, RailHandle, SimAdc, SimInputs, SimLedStrip, SimRail, SimStatusLed,
    StatusLedHandle, StripHandle,
};

/// The firmware device instantiated over the simulated peripherals.
pub type SimCore =
    Device<'static, SimAdc, SimInputs, SimRail, SimStatusLed, SimLedStrip, MockDelay>;

/// Unique id the simulated board reports at offsets 16..=27.
pub const SIM_DEVICE_ID: [u8; 12] = *b"SIM-PMIC-001";

/// Test-side handles to every simulated peripheral.
#[derive(Clone)]
pub struct SimHandles {
    pub adc: AdcHandle,
    pub inputs: InputHandles,
    pub rail: RailHandle,
    pub status_led: StatusLedHandle,
    pub strip: StripHandle,
}

/// A complete simulated PMIC: real firmware, simulated board.
///
/// `step` advances the world by one foreground tick (one loop iteration,
/// then one tick of the autonomous LED engine). The register file is
/// leaked to `'static`, mirroring the static allocation on hardware.
pub struct SimDevice {
    regs: &'static RegisterFile,
    core: Rc<RefCell<SimCore>>,
    pub handles: SimHandles,
}

impl SimDevice {
    pub fn new() -> Self {
        let regs: &'static RegisterFile = Box::leak(Box::new(RegisterFile::new()));

        let adc = AdcHandle::default();
        let inputs = InputHandles::default();
        let rail = RailHandle::default();
        let status_led = StatusLedHandle::default();
        let (strip, strip_handle) = SimLedStrip::new(regs);

        let periph = Peripherals {
            adc: SimAdc::new(adc.clone()),
            inputs: SimInputs::new(inputs.clone()),
            rail: SimRail::new(rail.clone()),
            status_led: SimStatusLed::new(status_led.clone()),
            strip,
            delay: MockDelay::new(),
        };

        Self {
            regs,
            core: Rc::new(RefCell::new(Device::new(regs, SIM_DEVICE_ID, periph))),
            handles: SimHandles {
                adc,
                inputs,
                rail,
                status_led,
                strip: strip_handle,
            },
        }
    }

    /// Runs the firmware boot sequence.
    pub fn boot(&mut self) {
        self.core.borrow_mut().boot();
    }

    /// One foreground iteration plus one tick of the LED engine.
    pub fn step(&mut self) {
        self.core.borrow_mut().run_iteration();
        self.handles.strip.step();
    }

    pub fn step_n(&mut self, n: u32) {
        for _ in 0..n {
            self.step();
        }
    }

    /// A host-side bus endpoint wired into this device's interrupt
    /// surface. Any number of endpoints may be created; transactions are
    /// serialized like on a real single-master bus.
    pub fn bus(&self) -> SimBus {
        SimBus::new(Rc::clone(&self.core))
    }

    /// Attaches a secondary bus identity and returns its register file
    /// for inspection.
    pub fn attach_secondary(&mut self, address: u8, read_only: bool) -> &'static RegisterFile {
        let regs: &'static RegisterFile = Box::leak(Box::new(RegisterFile::new()));
        self.core.borrow_mut().attach_secondary(address, regs, read_only);
        regs
    }

    /// Direct view of the primary register file.
    pub fn regs(&self) -> &'static RegisterFile {
        self.regs
    }

    pub fn millis(&self) -> u32 {
        self.core.borrow().millis()
    }

    pub fn power_state(&self) -> PowerState {
        self.core.borrow().power_state()
    }

    pub fn sensor_fault(&self) -> bool {
        self.core.borrow().sensor_fault()
    }
}

impl Default for SimDevice {
    fn default() -> Self {
        Self::new()
    }
}
