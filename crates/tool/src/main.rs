//! pmicctl - control tool for the PMIC
//!
//! Talks to the device's 32-byte register map over the system I2C bus.
//! Usage/argument errors exit with code 2 (clap's default), bus and I/O
//! errors with code 1, so scripts can tell them apart.

mod daemon;
mod output;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pmic_client::{Pmic, RegisterSnapshot};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pmicctl", version, about = "Control tool for the PMIC")]
struct Cli {
    /// I2C bus device node
    #[arg(long, global = true, default_value = "/dev/i2c-0")]
    bus: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read all 32 registers and display the decoded fields
    Read {
        /// Output the decoded fields as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the LED color and trigger a repaint (values decimal or 0x-hex)
    SetLed {
        #[arg(value_parser = parse_byte)]
        r: u8,
        #[arg(value_parser = parse_byte)]
        g: u8,
        #[arg(value_parser = parse_byte)]
        b: u8,
    },
    /// Ask the device to cut its own power rail
    Shutdown,
    /// Poll the device and publish decoded events on a zmq bus
    Daemon {
        /// PUB endpoint for events
        #[arg(long, default_value = "tcp://127.0.0.1:9901")]
        events: String,
        /// REP endpoint for set_led/shutdown requests
        #[arg(long, default_value = "tcp://127.0.0.1:9902")]
        control: String,
    },
    /// Print the version string
    Version,
}

/// Accepts `255` and `0xff` alike.
fn parse_byte(arg: &str) -> Result<u8, String> {
    let parsed = match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => arg.parse(),
    };
    parsed.map_err(|_| format!("invalid byte value '{arg}' (expected 0..=255 or 0x00..=0xff)"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Command::Version = cli.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_os = "linux")]
fn run(cli: Cli) -> Result<()> {
    let bus = linux_embedded_hal::I2cdev::new(&cli.bus)
        .with_context(|| format!("opening bus {}", cli.bus))?;
    let mut pmic = Pmic::new(bus);

    match cli.command {
        Command::Read { json } => cmd_read(&mut pmic, json),
        Command::SetLed { r, g, b } => cmd_set_led(&mut pmic, r, g, b),
        Command::Shutdown => cmd_shutdown(&mut pmic),
        Command::Daemon { events, control } => daemon::run(pmic, &events, &control),
        Command::Version => Ok(()),
    }
}

#[cfg(not(target_os = "linux"))]
fn run(_cli: Cli) -> Result<()> {
    anyhow::bail!("bus access requires Linux (/dev/i2c-*)")
}

fn cmd_read<I2C>(pmic: &mut Pmic<I2C>, json: bool) -> Result<()>
where
    I2C: embedded_hal::i2c::I2c,
    I2C::Error: core::fmt::Debug,
{
    let mut raw = [0u8; 32];
    pmic.read_raw(0, &mut raw)
        .map_err(|err| anyhow::anyhow!("reading registers: {err}"))?;
    let snapshot = RegisterSnapshot::from_raw(&raw);

    if json {
        println!("{}", output::render_json(&snapshot)?);
    } else {
        print!("{}", output::render_text(&raw, &snapshot));
    }
    Ok(())
}

fn cmd_set_led<I2C>(pmic: &mut Pmic<I2C>, r: u8, g: u8, b: u8) -> Result<()>
where
    I2C: embedded_hal::i2c::I2c,
    I2C::Error: core::fmt::Debug,
{
    pmic.set_led(r, g, b)
        .map_err(|err| anyhow::anyhow!("writing LED color: {err}"))?;
    println!("Set LED color to: R={r:#04x}, G={g:#04x}, B={b:#04x}");
    Ok(())
}

fn cmd_shutdown<I2C>(pmic: &mut Pmic<I2C>) -> Result<()>
where
    I2C: embedded_hal::i2c::I2c,
    I2C::Error: core::fmt::Debug,
{
    pmic.shutdown()
        .map_err(|err| anyhow::anyhow!("sending shutdown: {err}"))?;
    println!("Shutdown command sent.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_byte_accepts_decimal_and_hex() {
        assert_eq!(parse_byte("0"), Ok(0));
        assert_eq!(parse_byte("255"), Ok(255));
        assert_eq!(parse_byte("0xff"), Ok(0xFF));
        assert_eq!(parse_byte("0X80"), Ok(0x80));
    }

    #[test]
    fn parse_byte_rejects_out_of_range_and_garbage() {
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("0x100").is_err());
        assert!(parse_byte("red").is_err());
        assert!(parse_byte("").is_err());
    }

    #[test]
    fn cli_parses_subcommands() {
        use clap::Parser;

        let cli = Cli::try_parse_from(["pmicctl", "set-led", "0xff", "0", "128"]).unwrap();
        match cli.command {
            Command::SetLed { r, g, b } => {
                assert_eq!((r, g, b), (0xFF, 0, 128));
            }
            _ => panic!("wrong subcommand"),
        }

        let cli = Cli::try_parse_from(["pmicctl", "--bus", "/dev/i2c-3", "read", "--json"]).unwrap();
        assert_eq!(cli.bus, "/dev/i2c-3");
        assert!(matches!(cli.command, Command::Read { json: true }));

        // Usage errors are reported as clap errors (exit code 2)
        assert!(Cli::try_parse_from(["pmicctl", "set-led", "1", "2"]).is_err());
        assert!(Cli::try_parse_from(["pmicctl", "explode"]).is_err());
    }
}
