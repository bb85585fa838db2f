//! Blocking I2C driver.

use crate::error::Error;
use crate::types::RegisterSnapshot;

use pmic_core::convert::adc_to_vbat;
use pmic_core::input::InputState;
use pmic_core::regmap::{
    DEFAULT_ADDRESS, REGISTER_COUNT, REG_ADC, REG_IN_STATE, REG_LED_R, REG_MILLIS, REG_SHUTDOWN,
    REG_STATUS_LED, SHUTDOWN_SENTINEL,
};

/// PMIC register client over a blocking I2C bus.
pub struct Pmic<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Pmic<I2C> {
    /// Client at the default bus address (0x09).
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: DEFAULT_ADDRESS,
        }
    }

    /// Client at a custom address (secondary map deployments).
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// The 7-bit address this client talks to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Releases the underlying bus.
    pub fn free(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Pmic<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Reads and decodes the entire register map in one transaction.
    pub fn read_registers(&mut self) -> Result<RegisterSnapshot, Error<I2C::Error>> {
        let mut raw = [0u8; REGISTER_COUNT];
        self.read_raw(0, &mut raw)?;
        Ok(RegisterSnapshot::from_raw(&raw))
    }

    /// Reads `buf.len()` bytes starting at `offset`.
    pub fn read_raw(&mut self, offset: u8, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[offset], buf)
            .map_err(Error::I2c)
    }

    /// Reads a single register.
    pub fn read_reg(&mut self, offset: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.read_raw(offset, &mut buf)?;
        Ok(buf[0])
    }

    /// Writes a single register.
    pub fn write_reg(&mut self, offset: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[offset, value])
            .map_err(Error::I2c)
    }

    /// Sets the LED color and arms the repaint in one burst:
    /// {R, G, B, trigger=1} at offset 8. The device applies the whole
    /// burst before it can be observed by any read.
    pub fn set_led(&mut self, r: u8, g: u8, b: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[REG_LED_R, r, g, b, 0x01])
            .map_err(Error::I2c)
    }

    /// Writes the shutdown sentinel. The device cuts its own rail in
    /// interrupt context; expect no further responses after this.
    pub fn shutdown(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_reg(REG_SHUTDOWN, SHUTDOWN_SENTINEL)
    }

    /// Drives the discrete status LED (register 0, bit 0).
    pub fn set_status_led(&mut self, on: bool) -> Result<(), Error<I2C::Error>> {
        self.write_reg(REG_STATUS_LED, on as u8)
    }

    /// Reads the input-state bitfield at offset 14.
    pub fn read_input_state(&mut self) -> Result<InputState, Error<I2C::Error>> {
        Ok(InputState::from_bits_truncate(
            self.read_reg(REG_IN_STATE)?,
        ))
    }

    /// Reads the raw battery sample at offsets 12..=13.
    pub fn read_adc(&mut self) -> Result<u16, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.read_raw(REG_ADC, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Reads the battery voltage derived from the ADC registers.
    pub fn read_vbat(&mut self) -> Result<f32, Error<I2C::Error>> {
        Ok(adc_to_vbat(self.read_adc()?))
    }

    /// Reads the device uptime counter at offsets 4..=7.
    pub fn read_millis(&mut self) -> Result<u32, Error<I2C::Error>> {
        let mut buf = [0u8; 4];
        self.read_raw(REG_MILLIS, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}
