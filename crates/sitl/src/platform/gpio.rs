//! Simulated input pins

use std::cell::Cell;
use std::rc::Rc;

use pmic_firmware::platform::InputPins;

/// Test-side handles to the four input pins.
///
/// Defaults model the idle board: button released (pull-up high), charger
/// CHRG high (not charging), standby and radio-link low. The button and
/// charger pins are active-low, matching the hardware.
#[derive(Clone)]
pub struct InputHandles {
    charge: Rc<Cell<bool>>,
    standby: Rc<Cell<bool>>,
    radio_link: Rc<Cell<bool>>,
    button: Rc<Cell<bool>>,
}

impl Default for InputHandles {
    fn default() -> Self {
        Self {
            charge: Rc::new(Cell::new(true)),
            standby: Rc::new(Cell::new(false)),
            radio_link: Rc::new(Cell::new(false)),
            button: Rc::new(Cell::new(true)),
        }
    }
}

impl InputHandles {
    pub fn set_charge_level(&self, level: bool) {
        self.charge.set(level);
    }

    pub fn set_standby_level(&self, level: bool) {
        self.standby.set(level);
    }

    pub fn set_radio_link_level(&self, level: bool) {
        self.radio_link.set(level);
    }

    /// Drives the raw button pin level (low = pressed).
    pub fn set_button_level(&self, level: bool) {
        self.button.set(level);
    }

    /// Convenience: press (pull low) or release the button.
    pub fn press_button(&self, pressed: bool) {
        self.button.set(!pressed);
    }
}

/// The device-owned half.
pub struct SimInputs {
    handles: InputHandles,
}

impl SimInputs {
    pub fn new(handles: InputHandles) -> Self {
        Self { handles }
    }
}

impl InputPins for SimInputs {
    fn charge_level(&self) -> bool {
        self.handles.charge.get()
    }

    fn standby_level(&self) -> bool {
        self.handles.standby.get()
    }

    fn radio_link_level(&self) -> bool {
        self.handles.radio_link.get()
    }

    fn button_level(&self) -> bool {
        self.handles.button.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_drives_pin_level() {
        let handles = InputHandles::default();
        let inputs = SimInputs::new(handles.clone());

        assert!(inputs.button_level());
        handles.press_button(true);
        assert!(!inputs.button_level());
        handles.press_button(false);
        assert!(inputs.button_level());

        handles.set_charge_level(false);
        assert!(!inputs.charge_level());
    }
}
