//! I2C interface implementation built on top of `embedded-hal` `I2c`.
//!
//! Register reads use a pointer write followed by a repeated-start read. The
//! sensor auto-increments the register pointer during bursts.

use embedded_hal::i2c::I2c;

use super::{Adxl345Interface, Port};

// Payload bytes sent per write transfer.
const WRITE_CHUNK: usize = 8;

/// I2C-based interface implementation for the ADXL345 driver.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Creates a new interface bound to the 7-bit device `address`.
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Provides mutable access to the wrapped I2C bus.
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the interface and returns the owned I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Adxl345Interface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    const PORT: Port = Port::I2c;

    fn address(&self) -> Option<u8> {
        Some(self.address)
    }

    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error> {
        self.i2c.write(self.address, &[register, value])
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

        self.i2c.write_read(self.address, &[register], buf)
    }

    fn write_many(&mut self, register: u8, data: &[u8]) -> core::result::Result<(), Self::Error> {
        let mut frame = [0u8; WRITE_CHUNK + 1];
        for (index, chunk) in data.chunks(WRITE_CHUNK).enumerate() {
            frame[0] = register.wrapping_add((index * WRITE_CHUNK) as u8);
            frame[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c.write(self.address, &frame[..=chunk.len()])?;
        }
        Ok(())
    }
}
