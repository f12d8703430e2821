//! Error handling primitives for the ADXL345 driver.

use crate::config::ConfigError;

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying bus interface.
    Interface(E),
    /// The provided configuration parameters are invalid.
    InvalidConfig(ConfigError),
    /// `DEVID` did not read back as `0xE5`; carries the value actually read.
    DeviceIdMismatch(u8),
    /// The address is not part of the register map.
    InvalidRegister(u8),
    /// The register at this address cannot be written.
    ReadOnlyRegister(u8),
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}
