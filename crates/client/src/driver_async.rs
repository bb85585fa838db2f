//! Async I2C driver, mirroring [`crate::Pmic`].

use crate::error::Error;
use crate::types::RegisterSnapshot;

use embedded_hal_async::i2c::I2c as AsyncI2c;
use pmic_core::convert::adc_to_vbat;
use pmic_core::input::InputState;
use pmic_core::regmap::{
    DEFAULT_ADDRESS, REGISTER_COUNT, REG_ADC, REG_IN_STATE, REG_LED_R, REG_MILLIS, REG_SHUTDOWN,
    REG_STATUS_LED, SHUTDOWN_SENTINEL,
};

/// PMIC register client over an async I2C bus.
pub struct AsyncPmic<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> AsyncPmic<I2C> {
    /// Client at the default bus address (0x09).
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: DEFAULT_ADDRESS,
        }
    }

    /// Client at a custom address.
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

impl<I2C> AsyncPmic<I2C>
where
    I2C: AsyncI2c,
{
    /// Reads and decodes the entire register map in one transaction.
    pub async fn read_registers(&mut self) -> Result<RegisterSnapshot, Error<I2C::Error>> {
        let mut raw = [0u8; REGISTER_COUNT];
        self.read_raw(0, &mut raw).await?;
        Ok(RegisterSnapshot::from_raw(&raw))
    }

    /// Reads `buf.len()` bytes starting at `offset`.
    pub async fn read_raw(&mut self, offset: u8, buf: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[offset], buf)
            .await
            .map_err(Error::I2c)
    }

    /// Reads a single register.
    pub async fn read_reg(&mut self, offset: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.read_raw(offset, &mut buf).await?;
        Ok(buf[0])
    }

    /// Writes a single register.
    pub async fn write_reg(&mut self, offset: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[offset, value])
            .await
            .map_err(Error::I2c)
    }

    /// Sets the LED color and arms the repaint in one burst.
    pub async fn set_led(&mut self, r: u8, g: u8, b: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[REG_LED_R, r, g, b, 0x01])
            .await
            .map_err(Error::I2c)
    }

    /// Writes the shutdown sentinel.
    pub async fn shutdown(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_reg(REG_SHUTDOWN, SHUTDOWN_SENTINEL).await
    }

    /// Drives the discrete status LED (register 0, bit 0).
    pub async fn set_status_led(&mut self, on: bool) -> Result<(), Error<I2C::Error>> {
        self.write_reg(REG_STATUS_LED, on as u8).await
    }

    /// Reads the input-state bitfield at offset 14.
    pub async fn read_input_state(&mut self) -> Result<InputState, Error<I2C::Error>> {
        Ok(InputState::from_bits_truncate(
            self.read_reg(REG_IN_STATE).await?,
        ))
    }

    /// Reads the raw battery sample at offsets 12..=13.
    pub async fn read_adc(&mut self) -> Result<u16, Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.read_raw(REG_ADC, &mut buf).await?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Reads the battery voltage derived from the ADC registers.
    pub async fn read_vbat(&mut self) -> Result<f32, Error<I2C::Error>> {
        Ok(adc_to_vbat(self.read_adc().await?))
    }

    /// Reads the device uptime counter at offsets 4..=7.
    pub async fn read_millis(&mut self) -> Result<u32, Error<I2C::Error>> {
        let mut buf = [0u8; 4];
        self.read_raw(REG_MILLIS, &mut buf).await?;
        Ok(u32::from_le_bytes(buf))
    }
}
