//! FIFO access utilities.
//!
//! The ADXL345 FIFO holds up to 32 X/Y/Z frames. Each frame is popped by a
//! burst read of the six output registers starting at `DATAX0`. The next
//! frame only moves into the output registers 5 µs after that read ends, so
//! every pop is followed by a [`POP_DELAY_US`] wait.

use embedded_hal::delay::DelayNs;

use crate::error::Result;
use crate::interface::Adxl345Interface;
use crate::params::{FifoMode, InterruptPin};
use crate::registers::{FifoCtl, FifoStatus, REG_DATAX0, REG_FIFO_STATUS};
use crate::sample::{Sample, RAW_AXIS_BYTES};

/// Number of frames the FIFO can store.
pub const FIFO_DEPTH: usize = 32;

/// Minimum gap between the end of a data read and the next FIFO or `FIFO_STATUS` read.
pub const POP_DELAY_US: u32 = 5;

/// Snapshot of the FIFO control configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoSettings {
    /// FIFO watermark level expressed in samples.
    pub watermark: u8,
    /// FIFO operating mode.
    pub mode: FifoMode,
    /// Pin carrying the trigger event.
    pub trigger: InterruptPin,
}

impl FifoSettings {
    /// Creates a new settings snapshot.
    pub const fn new(watermark: u8, mode: FifoMode, trigger: InterruptPin) -> Self {
        Self {
            watermark,
            mode,
            trigger,
        }
    }
}

impl From<FifoCtl> for FifoSettings {
    fn from(ctl: FifoCtl) -> Self {
        Self::new(ctl.samples(), ctl.mode(), ctl.trigger())
    }
}

// Watermarks above 31 do not fit `FIFO_CTL.SAMPLES`; callers validate first.
impl From<FifoSettings> for FifoCtl {
    fn from(settings: FifoSettings) -> Self {
        FifoCtl::new()
            .with_samples(settings.watermark)
            .with_trigger(settings.trigger)
            .with_mode(settings.mode)
    }
}

/// Fill level reported by `FIFO_STATUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoLevel {
    /// Frames available to read.
    pub entries: u8,
    /// A trigger event was captured (trigger mode only).
    pub triggered: bool,
}

impl From<FifoStatus> for FifoLevel {
    fn from(status: FifoStatus) -> Self {
        Self {
            entries: status.entries(),
            triggered: status.triggered(),
        }
    }
}

/// Reads the FIFO fill level.
pub fn read_fifo_level<IFACE>(interface: &mut IFACE) -> Result<FifoLevel, IFACE::Error>
where
    IFACE: Adxl345Interface,
{
    let raw = interface.read_register(REG_FIFO_STATUS)?;
    Ok(FifoLevel::from(FifoStatus::from(raw)))
}

/// Pops up to `samples.len()` frames and decodes them with `scale_mg_per_lsb`.
///
/// Returns the number of frames written into `samples`.
pub fn read_fifo_samples<IFACE>(
    interface: &mut IFACE,
    delay: &mut impl DelayNs,
    samples: &mut [Sample],
    scale_mg_per_lsb: f32,
) -> Result<usize, IFACE::Error>
where
    IFACE: Adxl345Interface,
{
    let available = usize::from(read_fifo_level(interface)?.entries);
    let count = available.min(samples.len());

    let mut raw = [0u8; RAW_AXIS_BYTES];
    for sample in samples.iter_mut().take(count) {
        interface.read_many(REG_DATAX0, &mut raw)?;
        delay.delay_us(POP_DELAY_US);
        *sample = Sample::from_bytes(&raw, scale_mg_per_lsb);
    }

    Ok(count)
}

/// Pops every stored frame without decoding it, returning how many were discarded.
pub fn flush_fifo<IFACE>(
    interface: &mut IFACE,
    delay: &mut impl DelayNs,
) -> Result<usize, IFACE::Error>
where
    IFACE: Adxl345Interface,
{
    let available = usize::from(read_fifo_level(interface)?.entries).min(FIFO_DEPTH + 1);

    let mut raw = [0u8; RAW_AXIS_BYTES];
    for _ in 0..available {
        interface.read_many(REG_DATAX0, &mut raw)?;
        delay.delay_us(POP_DELAY_US);
    }

    Ok(available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::I2cInterface;
    use embedded_hal_mock::eh1::delay::{CheckedDelay, NoopDelay, Transaction as DelayTransaction};
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x53;

    #[test]
    fn settings_roundtrip_through_register() {
        let settings = FifoSettings::new(20, FifoMode::Trigger, InterruptPin::Int2);
        let ctl = FifoCtl::from(settings);
        assert_eq!(u8::from(ctl), 0b1111_0100);
        assert_eq!(FifoSettings::from(FifoCtl::from(u8::from(ctl))), settings);
    }

    #[test]
    fn drains_only_available_frames() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![REG_FIFO_STATUS], vec![0x02]),
            I2cTransaction::write_read(ADDR, vec![REG_DATAX0], vec![0x00, 0x01, 0, 0, 0, 0]),
            I2cTransaction::write_read(ADDR, vec![REG_DATAX0], vec![0, 0, 0x00, 0xFF, 0, 0]),
        ];
        let mut interface = I2cInterface::new(I2cMock::new(&expectations), ADDR);
        let mut delay = CheckedDelay::new(&[
            DelayTransaction::delay_us(POP_DELAY_US),
            DelayTransaction::delay_us(POP_DELAY_US),
        ]);

        let mut samples = [Sample::default(); 4];
        let count = read_fifo_samples(&mut interface, &mut delay, &mut samples, 3.9).unwrap();

        assert_eq!(count, 2);
        assert_eq!(samples[0].raw, [256, 0, 0]);
        assert_eq!(samples[1].raw, [0, -256, 0]);
        assert_eq!(samples[2], Sample::default());

        interface.release().done();
        delay.done();
    }

    #[test]
    fn stops_at_caller_capacity() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![REG_FIFO_STATUS], vec![0x85]),
            I2cTransaction::write_read(ADDR, vec![REG_DATAX0], vec![1, 0, 2, 0, 3, 0]),
        ];
        let mut interface = I2cInterface::new(I2cMock::new(&expectations), ADDR);

        let mut samples = [Sample::default(); 1];
        assert_eq!(
            read_fifo_samples(&mut interface, &mut NoopDelay::new(), &mut samples, 3.9).unwrap(),
            1
        );
        assert_eq!(samples[0].raw, [1, 2, 3]);

        interface.release().done();
    }

    #[test]
    fn flush_discards_every_entry() {
        let mut expectations = vec![I2cTransaction::write_read(
            ADDR,
            vec![REG_FIFO_STATUS],
            vec![0x03],
        )];
        for _ in 0..3 {
            expectations.push(I2cTransaction::write_read(ADDR, vec![REG_DATAX0], vec![0; 6]));
        }
        let mut interface = I2cInterface::new(I2cMock::new(&expectations), ADDR);
        let mut delay = CheckedDelay::new(&vec![DelayTransaction::delay_us(POP_DELAY_US); 3]);

        assert_eq!(flush_fifo(&mut interface, &mut delay).unwrap(), 3);

        interface.release().done();
        delay.done();
    }
}
