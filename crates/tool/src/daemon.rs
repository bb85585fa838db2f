//! Event daemon
//!
//! Polls the device's input-state register every 100 ms and the battery
//! registers every 5000 ms, publishes decoded transitions on a zmq PUB
//! socket (topic `pmic`, JSON payloads) and serves `set_led`/`shutdown`
//! requests on a zmq REP socket. Bus and socket errors are logged and the
//! loop keeps polling; only bind failures at startup are fatal.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use pmic_client::{adc_to_vbat, InputState, Pmic};
use serde_json::json;
use tracing::{info, warn};

/// Input-state poll cadence.
pub const STATUS_POLL_INTERVAL_MS: u64 = 100;

/// Battery poll cadence.
pub const VBAT_POLL_INTERVAL_MS: u64 = 5000;

/// Consecutive pressed polls (1 s hold) before a poweroff event.
const POWEROFF_HOLD_POLLS: u32 = 10;

/// Topic all events are published under.
const EVENT_TOPIC: &str = "pmic";

/// Decoded events derived from register transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum PmicEvent {
    /// Power button pressed state changed.
    Power { pressed: bool },
    /// Button held for a full second: the host should power down.
    Poweroff,
    /// Charger activity changed (pin is active-low).
    Charge { charging: bool },
    /// Charger standby pin changed.
    Standby { standby: bool },
    /// The device reports the battery below threshold.
    BatteryLow,
    /// Periodic battery voltage reading.
    Battery { volts: f32 },
}

impl PmicEvent {
    /// JSON payload published on the event bus.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            PmicEvent::Power { pressed } => json!({ "power": *pressed as u32 }),
            PmicEvent::Poweroff => json!({ "action": "poweroff" }),
            PmicEvent::Charge { charging } => json!({ "charge": *charging as u32 }),
            PmicEvent::Standby { standby } => json!({ "standby": *standby as u32 }),
            PmicEvent::BatteryLow => json!({ "battery-low": 1, "action": "poweroff" }),
            PmicEvent::Battery { volts } => json!({ "battery": format!("{:.4}", volts) }),
        }
    }
}

/// Edge detection over the polled input state.
pub struct StatusTracker {
    last: InputState,
    pressed_polls: u32,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self {
            last: InputState::empty(),
            pressed_polls: 0,
        }
    }

    /// Feeds one input-state poll; returns the events it produced.
    ///
    /// The button and charge pins are active-low: the published value is
    /// the logical state, not the pin level.
    pub fn poll_status(&mut self, state: InputState) -> Vec<PmicEvent> {
        let mut events = Vec::new();

        if state.button_level() != self.last.button_level() {
            events.push(PmicEvent::Power {
                pressed: !state.button_level(),
            });
        }

        if state.button_level() {
            self.pressed_polls = 0;
        } else {
            self.pressed_polls += 1;
        }
        if self.pressed_polls >= POWEROFF_HOLD_POLLS {
            events.push(PmicEvent::Poweroff);
            self.pressed_polls = 0;
        }

        if state.charge_level() != self.last.charge_level() {
            events.push(PmicEvent::Charge {
                charging: !state.charge_level(),
            });
        }

        if state.standby_level() != self.last.standby_level() {
            events.push(PmicEvent::Standby {
                standby: state.standby_level(),
            });
        }

        self.last = state;
        events
    }

    /// Feeds one battery poll; always yields the voltage, plus the
    /// low-battery warning while the device holds the flag.
    pub fn poll_vbat(&mut self, sample: u16) -> Vec<PmicEvent> {
        let mut events = vec![PmicEvent::Battery {
            volts: adc_to_vbat(sample),
        }];
        if self.last.battery_low() {
            events.push(PmicEvent::BatteryLow);
        }
        events
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Where published events go. Separated from zmq so the derivation logic
/// tests against a plain vector.
pub trait EventSink {
    fn publish(&mut self, event: &PmicEvent) -> Result<()>;
}

impl EventSink for Vec<PmicEvent> {
    fn publish(&mut self, event: &PmicEvent) -> Result<()> {
        self.push(event.clone());
        Ok(())
    }
}

/// zmq PUB socket sink.
pub struct ZmqSink {
    _ctx: zmq::Context,
    socket: zmq::Socket,
}

impl ZmqSink {
    pub fn bind(endpoint: &str) -> Result<Self> {
        let ctx = zmq::Context::new();
        let socket = ctx.socket(zmq::PUB)?;
        socket
            .bind(endpoint)
            .with_context(|| format!("binding event socket {endpoint}"))?;
        Ok(Self { _ctx: ctx, socket })
    }
}

impl EventSink for ZmqSink {
    fn publish(&mut self, event: &PmicEvent) -> Result<()> {
        self.socket.send(EVENT_TOPIC, zmq::SNDMORE)?;
        self.socket
            .send(event.payload().to_string().as_bytes(), 0)?;
        Ok(())
    }
}

/// Requests accepted on the control socket.
#[derive(Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ControlCommand {
    SetLed { r: u8, g: u8, b: u8 },
    Shutdown,
}

/// Parses one control request payload.
pub fn parse_command(payload: &[u8]) -> Result<ControlCommand> {
    serde_json::from_slice(payload).context("malformed control request")
}

/// zmq REP socket serving control requests without blocking the poll
/// loop.
pub struct CommandServer {
    _ctx: zmq::Context,
    socket: zmq::Socket,
}

impl CommandServer {
    pub fn bind(endpoint: &str) -> Result<Self> {
        let ctx = zmq::Context::new();
        let socket = ctx.socket(zmq::REP)?;
        socket
            .bind(endpoint)
            .with_context(|| format!("binding control socket {endpoint}"))?;
        Ok(Self { _ctx: ctx, socket })
    }

    /// Serves at most one pending request.
    pub fn poll<I2C>(&mut self, pmic: &mut Pmic<I2C>) -> Result<()>
    where
        I2C: embedded_hal::i2c::I2c,
        I2C::Error: core::fmt::Debug,
    {
        let request = match self.socket.recv_bytes(zmq::DONTWAIT) {
            Ok(bytes) => bytes,
            Err(zmq::Error::EAGAIN) => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        let reply = match parse_command(&request) {
            Ok(ControlCommand::SetLed { r, g, b }) => {
                info!("control: set_led r={r} g={g} b={b}");
                match pmic.set_led(r, g, b) {
                    Ok(()) => json!({ "result": "ok" }),
                    Err(err) => json!({ "error": format!("{err}") }),
                }
            }
            Ok(ControlCommand::Shutdown) => {
                info!("control: shutdown");
                match pmic.shutdown() {
                    Ok(()) => json!({ "result": "ok" }),
                    Err(err) => json!({ "error": format!("{err}") }),
                }
            }
            Err(err) => json!({ "error": format!("{err:#}") }),
        };

        self.socket.send(reply.to_string().as_bytes(), 0)?;
        Ok(())
    }
}

/// Runs the daemon loop forever. Bind failures are fatal; everything
/// after that is logged and retried on the next poll.
pub fn run<I2C>(mut pmic: Pmic<I2C>, events_endpoint: &str, control_endpoint: &str) -> Result<()>
where
    I2C: embedded_hal::i2c::I2c,
    I2C::Error: core::fmt::Debug,
{
    let mut sink = ZmqSink::bind(events_endpoint)?;
    let mut server = CommandServer::bind(control_endpoint)?;
    let mut tracker = StatusTracker::new();
    let vbat_every = VBAT_POLL_INTERVAL_MS / STATUS_POLL_INTERVAL_MS;
    let mut tick: u64 = 0;

    info!(
        "daemon started: status every {STATUS_POLL_INTERVAL_MS} ms, \
         battery every {VBAT_POLL_INTERVAL_MS} ms"
    );

    loop {
        match pmic.read_input_state() {
            Ok(state) => {
                for event in tracker.poll_status(state) {
                    if let Err(err) = sink.publish(&event) {
                        warn!("event publish failed: {err:#}");
                    }
                }
            }
            Err(err) => warn!("input-state poll failed: {err}"),
        }

        if tick % vbat_every == 0 {
            match pmic.read_adc() {
                Ok(sample) => {
                    for event in tracker.poll_vbat(sample) {
                        if let Err(err) = sink.publish(&event) {
                            warn!("event publish failed: {err:#}");
                        }
                    }
                }
                Err(err) => warn!("battery poll failed: {err}"),
            }
        }

        if let Err(err) = server.poll(&mut pmic) {
            warn!("control socket error: {err:#}");
        }

        thread::sleep(Duration::from_millis(STATUS_POLL_INTERVAL_MS));
        tick += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(bits: u8) -> InputState {
        InputState::from_bits_truncate(bits)
    }

    // Pin levels: bit 0 charge, bit 1 standby, bit 3 button (high =
    // released for both active-low pins)
    const IDLE: u8 = 0b0000_1001;

    #[test]
    fn startup_poll_reports_released_button() {
        let mut tracker = StatusTracker::new();
        // The tracker starts from an all-zero state, so the first idle
        // poll looks like a release edge - same as the original daemon
        let events = tracker.poll_status(state(IDLE));
        assert!(events.contains(&PmicEvent::Power { pressed: false }));
        assert!(events.contains(&PmicEvent::Charge { charging: false }));
    }

    #[test]
    fn button_edges_produce_power_events() {
        let mut tracker = StatusTracker::new();
        tracker.poll_status(state(IDLE));

        // Press (level drops)
        let events = tracker.poll_status(state(IDLE & !0b1000));
        assert_eq!(events, vec![PmicEvent::Power { pressed: true }]);

        // Held: no repeated event
        assert!(tracker.poll_status(state(IDLE & !0b1000)).is_empty());

        // Release
        let events = tracker.poll_status(state(IDLE));
        assert_eq!(events, vec![PmicEvent::Power { pressed: false }]);
    }

    #[test]
    fn one_second_hold_emits_poweroff_once_then_recounts() {
        let mut tracker = StatusTracker::new();
        tracker.poll_status(state(IDLE));

        let pressed = state(IDLE & !0b1000);
        // Polls 1..=9 while pressed: nothing yet
        tracker.poll_status(pressed);
        for _ in 0..8 {
            assert!(tracker.poll_status(pressed).is_empty());
        }
        // Tenth pressed poll crosses the hold threshold
        assert_eq!(tracker.poll_status(pressed), vec![PmicEvent::Poweroff]);

        // Counter restarts: ten more pressed polls for the next one
        for _ in 0..9 {
            assert!(tracker.poll_status(pressed).is_empty());
        }
        assert_eq!(tracker.poll_status(pressed), vec![PmicEvent::Poweroff]);
    }

    #[test]
    fn release_resets_the_hold_counter() {
        let mut tracker = StatusTracker::new();
        tracker.poll_status(state(IDLE));

        let pressed = state(IDLE & !0b1000);
        for _ in 0..9 {
            tracker.poll_status(pressed);
        }
        // Release before the tenth poll
        tracker.poll_status(state(IDLE));

        // Nine pressed polls again: no poweroff
        tracker.poll_status(pressed);
        for _ in 0..8 {
            assert!(tracker.poll_status(pressed).is_empty());
        }
    }

    #[test]
    fn charge_and_standby_edges() {
        let mut tracker = StatusTracker::new();
        tracker.poll_status(state(IDLE));

        // CHRG drops low: charging started
        let events = tracker.poll_status(state(IDLE & !0b01));
        assert_eq!(events, vec![PmicEvent::Charge { charging: true }]);

        // STDBY rises: charge complete
        let events = tracker.poll_status(state((IDLE & !0b01) | 0b10));
        assert_eq!(events, vec![PmicEvent::Standby { standby: true }]);
    }

    #[test]
    fn vbat_poll_reports_voltage_and_low_flag() {
        let mut tracker = StatusTracker::new();
        tracker.poll_status(state(IDLE));

        // 512 counts = 3.3 V, battery-low clear
        assert_eq!(
            tracker.poll_vbat(512),
            vec![PmicEvent::Battery { volts: 3.3 }]
        );

        // Low flag set in the last status poll
        tracker.poll_status(state(IDLE | 0b1_0000));
        let events = tracker.poll_vbat(500);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], PmicEvent::BatteryLow);
    }

    #[test]
    fn battery_payload_is_fixed_point_string() {
        let event = PmicEvent::Battery { volts: 6.6 };
        assert_eq!(event.payload(), json!({ "battery": "6.6000" }));
    }

    #[test]
    fn event_payload_shapes() {
        assert_eq!(
            PmicEvent::Power { pressed: true }.payload(),
            json!({ "power": 1 })
        );
        assert_eq!(PmicEvent::Poweroff.payload(), json!({ "action": "poweroff" }));
        assert_eq!(
            PmicEvent::Charge { charging: false }.payload(),
            json!({ "charge": 0 })
        );
        assert_eq!(
            PmicEvent::BatteryLow.payload(),
            json!({ "battery-low": 1, "action": "poweroff" })
        );
    }

    #[test]
    fn control_requests_parse() {
        let cmd = parse_command(br#"{"method":"set_led","r":255,"g":0,"b":128}"#).unwrap();
        assert_eq!(cmd, ControlCommand::SetLed { r: 255, g: 0, b: 128 });

        let cmd = parse_command(br#"{"method":"shutdown"}"#).unwrap();
        assert_eq!(cmd, ControlCommand::Shutdown);

        assert!(parse_command(b"not json").is_err());
        assert!(parse_command(br#"{"method":"reboot"}"#).is_err());
    }
}
