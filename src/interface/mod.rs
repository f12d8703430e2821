//! Bus interface abstraction for the ADXL345 driver.

pub mod i2c;
pub mod spi;

pub use i2c::I2cInterface;
pub use spi::SpiInterface;

/// Serial port the sensor is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// I2C, `CS` tied high.
    I2c,
    /// 4-wire SPI, `CS` driven by the bus master.
    Spi,
}

/// Abstraction over the low-level bus access required by the driver.
pub trait Adxl345Interface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Port this implementation drives.
    const PORT: Port;

    /// Bus address of the device, when the port is addressed.
    fn address(&self) -> Option<u8> {
        None
    }

    /// Writes a single register.
    fn write_register(&mut self, register: u8, value: u8) -> core::result::Result<(), Self::Error>;

    /// Reads a single register.
    fn read_register(&mut self, register: u8) -> core::result::Result<u8, Self::Error>;

    /// Reads multiple consecutive registers into the provided buffer.
    fn read_many(&mut self, register: u8, buf: &mut [u8]) -> core::result::Result<(), Self::Error>;

    /// Writes multiple consecutive registers from the provided buffer.
    fn write_many(&mut self, register: u8, data: &[u8]) -> core::result::Result<(), Self::Error>;
}
