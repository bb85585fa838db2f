//! Simulated host-side bus endpoint
//!
//! Implements `embedded_hal::i2c::I2c` by translating each transaction
//! into the byte-level event sequence the device's bus ISR would see:
//! address phase, data bytes, stop. The client crate runs against this
//! unchanged.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::i2c::Operation;

use crate::device::SimCore;
use crate::error::SimBusError;

/// Host endpoint of the simulated two-wire bus.
pub struct SimBus {
    core: Rc<RefCell<SimCore>>,
    fail_after: Option<usize>,
}

impl SimBus {
    pub fn new(core: Rc<RefCell<SimCore>>) -> Self {
        Self {
            core,
            fail_after: None,
        }
    }

    /// Injects a one-shot bus fault after `bytes` data bytes of the next
    /// transaction have transferred. The device sees an arbitration loss
    /// and drops the rest of the transaction; the host gets the error.
    pub fn fail_after(&mut self, bytes: usize) {
        self.fail_after = Some(bytes);
    }

    fn take_fault(&mut self, transferred: usize) -> bool {
        match self.fail_after {
            Some(limit) if transferred >= limit => {
                self.fail_after = None;
                true
            }
            _ => false,
        }
    }
}

impl embedded_hal::i2c::ErrorType for SimBus {
    type Error = SimBusError;
}

impl embedded_hal::i2c::I2c for SimBus {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), SimBusError> {
        let core = Rc::clone(&self.core);
        let mut core = core.borrow_mut();
        let mut transferred = 0usize;

        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    if !core.isr_address_match(address, false) {
                        return Err(SimBusError::NoAcknowledge(address));
                    }
                    for byte in bytes.iter() {
                        if self.take_fault(transferred) {
                            core.isr_bus_fault();
                            return Err(SimBusError::ArbitrationLoss);
                        }
                        core.isr_byte_received(*byte);
                        transferred += 1;
                    }
                }
                Operation::Read(buf) => {
                    if !core.isr_address_match(address, true) {
                        return Err(SimBusError::NoAcknowledge(address));
                    }
                    for slot in buf.iter_mut() {
                        if self.take_fault(transferred) {
                            core.isr_bus_fault();
                            return Err(SimBusError::ArbitrationLoss);
                        }
                        *slot = core.isr_byte_requested();
                        transferred += 1;
                    }
                }
            }
        }

        core.isr_stop();
        Ok(())
    }
}
