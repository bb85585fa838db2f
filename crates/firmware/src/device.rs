//! Device runtime
//!
//! Ties the register file, the bus slave engine and the battery monitor
//! to the board peripherals. The `isr_*` methods are the bus peripheral's
//! interrupt handlers; `run_iteration` is one pass of the foreground loop.

use embedded_hal::delay::DelayNs;
use pmic_core::busslave::{NullHook, SlaveEngine, WriteHook};
use pmic_core::input::InputState;
use pmic_core::regmap::{
    BusPort, RegisterFile, SupervisorPort, DEVICE_ID_LEN, REG_DEVICE_ID, REG_LED_B, REG_LED_G,
    REG_LED_R, REG_LED_UPDATE,
};
use pmic_core::supervisor::{BatteryMonitor, BatteryVerdict, PowerState, ADC_SAMPLE_INTERVAL_MS};

use crate::config;
use crate::platform::{AdcError, BatteryAdc, InputPins, LedStrip, PowerRail, StatusLed};

/// The board peripherals the runtime drives.
pub struct Peripherals<A, I, R, S, L, D> {
    pub adc: A,
    pub inputs: I,
    pub rail: R,
    pub status_led: S,
    pub strip: L,
    pub delay: D,
}

/// A secondary bus identity: its own address, its own register file, its
/// own engine state. Writes there carry no power semantics, so it runs
/// with the null hook.
struct SecondarySlave<'a> {
    address: u8,
    regs: &'a RegisterFile,
    engine: SlaveEngine,
}

/// Which slave identity the in-flight bus transaction addressed.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ActiveTarget {
    None,
    Primary,
    Secondary,
}

/// Write-completion side effects, evaluated in interrupt context: the
/// status LED follows register 0 and the shutdown sentinel cuts the rail
/// without waiting for the foreground loop.
struct IsrSideEffects<'p, R, S> {
    port: BusPort<'p>,
    rail: &'p mut R,
    status_led: &'p mut S,
}

impl<R: PowerRail, S: StatusLed> WriteHook for IsrSideEffects<'_, R, S> {
    fn on_register_write(&mut self, _offset: u8, _len: u8) {
        self.status_led.set(self.port.status_led());
        if self.port.shutdown_requested() {
            self.rail.shutdown();
        }
    }
}

/// The PMIC device runtime.
pub struct Device<'a, A, I, R, S, L, D> {
    regs: &'a RegisterFile,
    engine: SlaveEngine,
    secondary: Option<SecondarySlave<'a>>,
    monitor: BatteryMonitor,
    periph: Peripherals<A, I, R, S, L, D>,
    device_id: [u8; DEVICE_ID_LEN],
    address: u8,
    active: ActiveTarget,
    sensor_fault: bool,
}

impl<'a, A, I, R, S, L, D> Device<'a, A, I, R, S, L, D>
where
    A: BatteryAdc,
    I: InputPins,
    R: PowerRail,
    S: StatusLed,
    L: LedStrip,
    D: DelayNs,
{
    /// Device with a writable register map at the default bus address.
    pub fn new(
        regs: &'a RegisterFile,
        device_id: [u8; DEVICE_ID_LEN],
        periph: Peripherals<A, I, R, S, L, D>,
    ) -> Self {
        Self::with_engine(regs, device_id, periph, SlaveEngine::new())
    }

    /// Device whose bus writes are acknowledged but discarded.
    pub fn read_only(
        regs: &'a RegisterFile,
        device_id: [u8; DEVICE_ID_LEN],
        periph: Peripherals<A, I, R, S, L, D>,
    ) -> Self {
        Self::with_engine(regs, device_id, periph, SlaveEngine::with_read_only(true))
    }

    fn with_engine(
        regs: &'a RegisterFile,
        device_id: [u8; DEVICE_ID_LEN],
        periph: Peripherals<A, I, R, S, L, D>,
        engine: SlaveEngine,
    ) -> Self {
        Self {
            regs,
            engine,
            secondary: None,
            monitor: BatteryMonitor::new(),
            periph,
            device_id,
            address: config::BUS_ADDRESS,
            active: ActiveTarget::None,
            sensor_fault: false,
        }
    }

    /// Attaches a secondary bus identity over its own register file.
    pub fn attach_secondary(&mut self, address: u8, regs: &'a RegisterFile, read_only: bool) {
        self.secondary = Some(SecondarySlave {
            address,
            regs,
            engine: SlaveEngine::with_read_only(read_only),
        });
    }

    // ------------------------------------------------------------------
    // Boot
    // ------------------------------------------------------------------

    /// Power-on sequence: settle, latch our own supply, flash the LED
    /// white, wait for the power button to be released, then hand a clean
    /// register map to the host.
    pub fn boot(&mut self) {
        self.periph.delay.delay_ms(config::BOOT_SETTLE_MS);
        self.periph.rail.enable();

        self.regs.store(REG_LED_R, 0xFF);
        self.regs.store(REG_LED_G, 0xFF);
        self.regs.store(REG_LED_B, 0xFF);
        let _ = self.periph.strip.start(config::N_LEDS);

        // Held-button override path: the user is still holding the button
        // that powered us up; do not start supervising until it is let go
        while !self.periph.inputs.button_level() {
            self.periph.delay.delay_ms(1);
        }

        self.regs.clear();
        for (i, byte) in self.device_id.iter().enumerate() {
            self.regs.store(REG_DEVICE_ID + i as u8, *byte);
        }
        // First foreground iteration repaints with the cleared color
        self.regs.store(REG_LED_UPDATE, 1);
        self.monitor.reset();
        self.sensor_fault = false;
    }

    // ------------------------------------------------------------------
    // Interrupt context: bus peripheral events
    // ------------------------------------------------------------------

    /// Address phase. Returns whether the address was ours (ack).
    pub fn isr_address_match(&mut self, address: u8, read: bool) -> bool {
        if address == self.address {
            self.active = ActiveTarget::Primary;
            let (engine, mut hook) = self.primary_parts();
            engine.on_address_match(read, &mut hook);
            true
        } else if let Some(sec) = self.secondary.as_mut().filter(|s| s.address == address) {
            self.active = ActiveTarget::Secondary;
            sec.engine.on_address_match(read, &mut NullHook);
            true
        } else {
            self.active = ActiveTarget::None;
            false
        }
    }

    /// Data byte received from the host.
    pub fn isr_byte_received(&mut self, byte: u8) {
        match self.active {
            ActiveTarget::Primary => {
                let port = BusPort::new(self.regs);
                self.engine.on_byte_received(&port, byte);
            }
            ActiveTarget::Secondary => {
                if let Some(sec) = self.secondary.as_mut() {
                    let port = BusPort::new(sec.regs);
                    sec.engine.on_byte_received(&port, byte);
                }
            }
            ActiveTarget::None => {}
        }
    }

    /// Host is clocking a byte out of us.
    pub fn isr_byte_requested(&mut self) -> u8 {
        match self.active {
            ActiveTarget::Primary => {
                let port = BusPort::new(self.regs);
                self.engine.on_byte_requested(&port)
            }
            ActiveTarget::Secondary => match self.secondary.as_mut() {
                Some(sec) => {
                    let port = BusPort::new(sec.regs);
                    sec.engine.on_byte_requested(&port)
                }
                None => 0,
            },
            ActiveTarget::None => 0,
        }
    }

    /// Stop condition.
    pub fn isr_stop(&mut self) {
        match self.active {
            ActiveTarget::Primary => {
                let (engine, mut hook) = self.primary_parts();
                engine.on_stop(&mut hook);
            }
            ActiveTarget::Secondary => {
                if let Some(sec) = self.secondary.as_mut() {
                    sec.engine.on_stop(&mut NullHook);
                }
            }
            ActiveTarget::None => {}
        }
        self.active = ActiveTarget::None;
    }

    /// Bus error or arbitration loss.
    pub fn isr_bus_fault(&mut self) {
        match self.active {
            ActiveTarget::Primary => self.engine.on_bus_fault(),
            ActiveTarget::Secondary => {
                if let Some(sec) = self.secondary.as_mut() {
                    sec.engine.on_bus_fault();
                }
            }
            ActiveTarget::None => {}
        }
        self.active = ActiveTarget::None;
    }

    fn primary_parts(&mut self) -> (&mut SlaveEngine, IsrSideEffects<'_, R, S>) {
        (
            &mut self.engine,
            IsrSideEffects {
                port: BusPort::new(self.regs),
                rail: &mut self.periph.rail,
                status_led: &mut self.periph.status_led,
            },
        )
    }

    // ------------------------------------------------------------------
    // Foreground loop
    // ------------------------------------------------------------------

    /// One pass of the foreground loop.
    ///
    /// Order is part of the device contract: LED repaint first, then the
    /// periodic battery sample, then shutdown-trigger consumption and the
    /// unconditional GPIO refresh, then the tick counter.
    pub fn run_iteration(&mut self) {
        let sup = SupervisorPort::new(self.regs);

        if sup.led_update_pending() {
            // A busy transmitter defers the repaint: the trigger stays
            // pending and this branch runs again next iteration
            if self.periph.strip.start(config::N_LEDS).is_ok() {
                sup.clear_led_update();
            }
        } else if sup.millis() % ADC_SAMPLE_INTERVAL_MS == 0 {
            match self.periph.adc.sample() {
                Ok(sample) => {
                    sup.set_adc_sample(sample);
                    if let BatteryVerdict::Shutdown = self.monitor.sample(sample) {
                        self.periph.rail.shutdown();
                    }
                }
                Err(AdcError::Timeout) => {
                    // Stuck conversion: skip the sample, leave the
                    // hysteresis counter alone, keep the device alive
                    self.sensor_fault = true;
                }
            }
        } else {
            self.periph.delay.delay_ms(1);
        }

        if sup.take_shutdown() {
            self.periph.rail.shutdown();
        }

        sup.set_input_state(InputState::from_levels(
            self.periph.inputs.charge_level(),
            self.periph.inputs.standby_level(),
            self.periph.inputs.radio_link_level(),
            self.periph.inputs.button_level(),
            self.monitor.battery_low(),
        ));

        sup.increment_millis();
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn regs(&self) -> &RegisterFile {
        self.regs
    }

    pub fn peripherals(&self) -> &Peripherals<A, I, R, S, L, D> {
        &self.periph
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<A, I, R, S, L, D> {
        &mut self.periph
    }

    /// Supervisory state derived from the battery monitor.
    pub fn power_state(&self) -> PowerState {
        self.monitor.state()
    }

    /// True once an ADC conversion has timed out.
    pub fn sensor_fault(&self) -> bool {
        self.sensor_fault
    }

    /// Current millisecond counter, as published in the map.
    pub fn millis(&self) -> u32 {
        SupervisorPort::new(self.regs).millis()
    }
}
