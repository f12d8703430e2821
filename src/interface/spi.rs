//! SPI interface implementation built on top of `embedded-hal` `SpiDevice`.
//!
//! The ADXL345 expects SPI mode 3 (CPOL = 1, CPHA = 1) at up to 5 MHz. Chip
//! select framing is handled by the [`SpiDevice`] implementation.

use embedded_hal::spi::{Mode, Operation, SpiDevice, MODE_3};

use super::{Adxl345Interface, Port};

/// SPI mode required by the sensor.
pub const MODE: Mode = MODE_3;

/// Maximum SPI clock frequency in hertz.
pub const MAX_FREQUENCY_HZ: u32 = 5_000_000;

const READ_BIT: u8 = 0x80;
const MULTI_BYTE_BIT: u8 = 0x40;
const ADDRESS_MASK: u8 = 0x3F;

/// SPI-based interface implementation for the ADXL345 driver.
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Creates a new interface from the provided SPI device abstraction.
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Builds the command byte: R/W in bit 7, MB in bit 6, address in bits 5:0.
    fn command_byte(register: u8, is_read: bool, multi_byte: bool) -> u8 {
        let mut command = register & ADDRESS_MASK;
        if is_read {
            command |= READ_BIT;
        }
        if multi_byte {
            command |= MULTI_BYTE_BIT;
        }
        command
    }

    /// Provides mutable access to the wrapped SPI device.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the owned SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Adxl345Interface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    const PORT: Port = Port::Spi;

    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error> {
        self.write_many(register, core::slice::from_ref(&value))
    }

    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error> {
        let mut value = [0u8; 1];
        self.read_many(register, &mut value)?;
        Ok(value[0])
    }

    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        if buf.is_empty() {
            return Ok(());
        }

        let command = [Self::command_byte(register, true, buf.len() > 1)];
        let mut operations = [Operation::Write(&command), Operation::Read(buf)];
        self.spi.transaction(&mut operations)
    }

    fn write_many(&mut self, register: u8, data: &[u8]) -> core::result::Result<(), Self::Error> {
        if data.is_empty() {
            return Ok(());
        }

        let command = [Self::command_byte(register, false, data.len() > 1)];
        let mut operations = [Operation::Write(&command), Operation::Write(data)];
        self.spi.transaction(&mut operations)
    }
}
