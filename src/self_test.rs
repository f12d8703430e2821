//! Self-test routine for the ADXL345 driver.
//!
//! Setting `DATA_FORMAT.SELF_TEST` applies an electrostatic force to the
//! sensing element. The change in output between force off and force on is
//! compared against the datasheet limits.

use embedded_hal::delay::DelayNs;

use crate::config::Config;
use crate::device::Adxl345;
use crate::error::Result;
use crate::interface::Adxl345Interface;
use crate::log;
use crate::params::{DataRate, FifoMode, Range};
use crate::sample::SENSITIVITY_TENTH_MG_PER_LSB;

/// Readings averaged with the force off and again with it on.
pub const SELF_TEST_SAMPLES: u8 = 8;

// Settling time after enabling measurement or toggling the force (milliseconds).
const SETTLE_MS: u32 = 40;

/// Accepted output change per axis in LSB at 3.9 mg/LSB, from the datasheet self-test table.
pub const SELF_TEST_LIMITS_LSB: [(i32, i32); 3] = [(50, 540), (-540, -50), (75, 875)];

/// Result produced by the self-test routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelfTestReport {
    /// Averaged output change per axis, in counts at 3.9 mg/LSB.
    pub delta: [i32; 3],
    /// Averaged output change per axis, in mg (informational).
    pub delta_mg: [i32; 3],
    /// Indicates whether every axis stayed within its limits.
    pub passed: bool,
}

impl SelfTestReport {
    /// Builds a report from the averaged force-off and force-on readings.
    pub fn from_averages(off: [i32; 3], on: [i32; 3]) -> Self {
        let mut delta = [0i32; 3];
        for (axis, value) in delta.iter_mut().enumerate() {
            *value = on[axis] - off[axis];
        }

        let delta_mg = delta.map(|counts| counts * SENSITIVITY_TENTH_MG_PER_LSB / 10);
        let passed = delta
            .iter()
            .zip(SELF_TEST_LIMITS_LSB)
            .all(|(counts, (low, high))| (low..=high).contains(counts));

        Self {
            delta,
            delta_mg,
            passed,
        }
    }
}

/// Executes the self-test sequence as described in the datasheet.
///
/// Runs at 100 Hz, ±16 g full resolution with the FIFO bypassed, then restores
/// the previous configuration. The sensor is left measuring and must be at rest.
pub fn run_self_test<IFACE, CommE>(
    device: &mut Adxl345<IFACE>,
    delay: &mut impl DelayNs,
) -> Result<SelfTestReport, CommE>
where
    IFACE: Adxl345Interface<Error = CommE>,
{
    let saved = *device.config();
    let test_config = Config {
        data_rate: DataRate::Hz100,
        low_power: false,
        range: Range::G16,
        full_resolution: true,
        fifo_mode: FifoMode::Bypass,
        fifo_watermark: 0,
        ..saved
    };

    let measured = forced_averages(device, test_config, delay);

    // Release the force and restore the caller's profile even when measuring failed.
    let released = device.set_self_test_force(false);
    let restored = device.configure(saved);
    let (off, on) = measured?;
    released?;
    restored?;

    let report = SelfTestReport::from_averages(off, on);
    if !report.passed {
        log::warning!("self-test out of limits: {} mg", report.delta_mg);
    }

    Ok(report)
}

// Averages readings with the force off, then on. Leaves the force bit set on success.
fn forced_averages<IFACE, CommE>(
    device: &mut Adxl345<IFACE>,
    test_config: Config,
    delay: &mut impl DelayNs,
) -> Result<([i32; 3], [i32; 3]), CommE>
where
    IFACE: Adxl345Interface<Error = CommE>,
{
    device.configure(test_config)?;
    device.measure()?;
    delay.delay_ms(SETTLE_MS);
    let off = device.average_raw(delay, SELF_TEST_SAMPLES)?;

    device.set_self_test_force(true)?;
    delay.delay_ms(SETTLE_MS);
    let on = device.average_raw(delay, SELF_TEST_SAMPLES)?;

    Ok((off, on))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{
        SlaveAddr, REG_BW_RATE, REG_DATAX0, REG_DATA_FORMAT, REG_FIFO_CTL, REG_POWER_CTL,
    };
    use crate::error::Error;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x53;

    fn read(register: u8, value: u8) -> I2cTransaction {
        I2cTransaction::write_read(ADDR, vec![register], vec![value])
    }

    fn write(register: u8, value: u8) -> I2cTransaction {
        I2cTransaction::write(ADDR, vec![register, value])
    }

    fn frame(xyz: [i16; 3]) -> I2cTransaction {
        let mut bytes = Vec::with_capacity(6);
        for axis in xyz {
            bytes.extend_from_slice(&axis.to_le_bytes());
        }
        I2cTransaction::write_read(ADDR, vec![REG_DATAX0], bytes)
    }

    fn sequence(off: [i16; 3], on: [i16; 3]) -> Vec<I2cTransaction> {
        let mut expectations = vec![
            // Switch to 100 Hz, ±16 g full resolution, FIFO bypass.
            read(REG_BW_RATE, 0x0A),
            read(REG_DATA_FORMAT, 0x08),
            write(REG_DATA_FORMAT, 0x0B),
            write(REG_FIFO_CTL, 0x00),
            read(REG_POWER_CTL, 0x08),
        ];
        expectations.extend((0..SELF_TEST_SAMPLES).map(|_| frame(off)));
        expectations.push(read(REG_DATA_FORMAT, 0x0B));
        expectations.push(write(REG_DATA_FORMAT, 0x8B));
        expectations.extend((0..SELF_TEST_SAMPLES).map(|_| frame(on)));
        expectations.extend([
            read(REG_DATA_FORMAT, 0x8B),
            write(REG_DATA_FORMAT, 0x0B),
            // Restore ±2 g.
            read(REG_BW_RATE, 0x0A),
            read(REG_DATA_FORMAT, 0x0B),
            write(REG_DATA_FORMAT, 0x08),
            write(REG_FIFO_CTL, 0x00),
        ]);
        expectations
    }

    #[test]
    fn report_limits() {
        let pass = SelfTestReport::from_averages([10, -5, 256], [210, -205, 556]);
        assert_eq!(pass.delta, [200, -200, 300]);
        assert_eq!(pass.delta_mg, [780, -780, 1170]);
        assert!(pass.passed);

        let weak_z = SelfTestReport::from_averages([0, 0, 256], [200, -200, 300]);
        assert!(!weak_z.passed);

        let inverted_y = SelfTestReport::from_averages([0, 0, 0], [200, 200, 300]);
        assert!(!inverted_y.passed);
    }

    #[test]
    fn limits_are_inclusive_in_counts() {
        let low = SelfTestReport::from_averages([0; 3], [50, -50, 75]);
        assert!(low.passed);
        let high = SelfTestReport::from_averages([0; 3], [540, -540, 875]);
        assert!(high.passed);

        // Just inside the window, where whole-mg rounding would have rejected it.
        let near_low = SelfTestReport::from_averages([0; 3], [51, -51, 80]);
        assert_eq!(near_low.delta_mg, [198, -198, 312]);
        assert!(near_low.passed);

        let outside_window = [
            [49, -50, 75],
            [541, -50, 75],
            [50, -49, 75],
            [50, -541, 75],
            [50, -50, 74],
            [50, -50, 876],
        ];
        for outside in outside_window {
            assert!(!SelfTestReport::from_averages([0; 3], outside).passed, "{outside:?}");
        }
    }

    #[test]
    fn failed_measurement_restores_configuration() {
        let expectations = [
            read(REG_BW_RATE, 0x0A),
            read(REG_DATA_FORMAT, 0x08),
            write(REG_DATA_FORMAT, 0x0B),
            write(REG_FIFO_CTL, 0x00),
            read(REG_POWER_CTL, 0x08),
            I2cTransaction::write_read(ADDR, vec![REG_DATAX0], vec![0; 6])
                .with_error(ErrorKind::Other),
            // Force bit was never set.
            read(REG_DATA_FORMAT, 0x0B),
            read(REG_BW_RATE, 0x0A),
            read(REG_DATA_FORMAT, 0x0B),
            write(REG_DATA_FORMAT, 0x08),
            write(REG_FIFO_CTL, 0x00),
        ];
        let mut accel = Adxl345::new_i2c(I2cMock::new(&expectations), SlaveAddr::Default);

        let result = accel.run_self_test(&mut NoopDelay::new());
        assert_eq!(result, Err(Error::Interface(ErrorKind::Other)));
        assert_eq!(accel.config(), &Config::default());

        accel.release_i2c().0.done();
    }

    #[test]
    fn passing_self_test_restores_configuration() {
        let expectations = sequence([10, -5, 256], [210, -205, 556]);
        let mut accel = Adxl345::new_i2c(I2cMock::new(&expectations), SlaveAddr::Default);

        let report = accel.run_self_test(&mut NoopDelay::new()).unwrap();
        assert!(report.passed);
        assert_eq!(report.delta, [200, -200, 300]);
        assert_eq!(accel.config(), &Config::default());

        accel.release_i2c().0.done();
    }

    #[test]
    fn stuck_sensor_fails() {
        let expectations = sequence([3, 4, 256], [3, 4, 256]);
        let mut accel = Adxl345::new_i2c(I2cMock::new(&expectations), SlaveAddr::Default);

        let report = accel.run_self_test(&mut NoopDelay::new()).unwrap();
        assert!(!report.passed);
        assert_eq!(report.delta, [0, 0, 0]);

        accel.release_i2c().0.done();
    }
}
