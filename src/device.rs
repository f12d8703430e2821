//! High-level ADXL345 device driver implementation.

use crate::config::{Config, ConfigError, MAX_FIFO_WATERMARK};
use crate::error::{Error, Result};
use crate::events::{ActivityConfig, FreeFallConfig, TapConfig, OFFSET_TENTH_MG_PER_LSB};
use crate::fifo::{self, FifoLevel, FifoSettings};
use crate::interface::{Adxl345Interface, I2cInterface, Port, SpiInterface};
use crate::log;
use crate::params::{DataRate, Range, WakeupRate};
use crate::registers::{
    register_info,
    ActTapStatus,
    BwRate,
    DataFormat,
    FifoCtl,
    InterruptFlags,
    PowerCtl,
    EXPECTED_DEVID,
    REG_ACT_INACT_CTL,
    REG_ACT_TAP_STATUS,
    REG_BW_RATE,
    REG_DATAX0,
    REG_DATA_FORMAT,
    REG_DEVID,
    REG_DUR,
    REG_FIFO_CTL,
    REG_INT_ENABLE,
    REG_INT_MAP,
    REG_INT_SOURCE,
    REG_OFSX,
    REG_POWER_CTL,
    REG_TAP_AXES,
    REG_THRESH_ACT,
    REG_THRESH_FF,
    REG_THRESH_TAP,
};
use crate::sample::{Sample, RAW_AXIS_BYTES};
use crate::self_test::{run_self_test, SelfTestReport};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;

// ADXL345 datasheet turn-on time from standby, rounded up (microseconds).
const POWER_UP_DELAY_US: u32 = 1_400;
// +1 g on the Z axis, in tenths of mg, for offset calibration on a level surface.
const ONE_G_TENTH_MG: i32 = 10_000;

/// High-level synchronous driver for the ADXL345 accelerometer.
pub struct Adxl345<IFACE> {
    interface: IFACE,
    config: Config,
    device_id: Option<u8>,
    last_sample: Sample,
}

impl<IFACE> Adxl345<IFACE> {
    // ==================================================================
    // == Driver Construction & Ownership ===============================
    // ==================================================================
    /// Creates a new driver instance from the provided bus interface.
    ///
    /// No bus traffic is issued; call [`init`](Self::init) to program the sensor.
    pub fn new(interface: IFACE) -> Self {
        Self::with_config(interface, Config::default())
    }

    /// Creates a new driver instance that [`init`](Self::init) will program with `config`.
    pub fn with_config(interface: IFACE, config: Config) -> Self {
        Self {
            interface,
            config,
            device_id: None,
            last_sample: Sample::default(),
        }
    }

    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> (IFACE, Config) {
        (self.interface, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `DEVID` value captured by the last successful [`check_id`](Self::check_id).
    pub fn device_id(&self) -> Option<u8> {
        self.device_id
    }

    /// Most recent sample acquired by [`read_sample`](Self::read_sample) or a FIFO read.
    pub fn last_sample(&self) -> &Sample {
        &self.last_sample
    }
}

impl<I2C> Adxl345<I2cInterface<I2C>>
where
    I2C: I2c,
{
    // ==================================================================
    // == Bus Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for I2C transports.
    ///
    /// `address` is the 7-bit bus address, usually a
    /// [`SlaveAddr`](crate::registers::SlaveAddr).
    pub fn new_i2c(i2c: I2C, address: impl Into<u8>) -> Self {
        Self::new(I2cInterface::new(i2c, address.into()))
    }

    /// Releases the driver, returning the I2C bus and configuration.
    pub fn release_i2c(self) -> (I2C, Config) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

impl<SPI> Adxl345<SpiInterface<SPI>>
where
    SPI: SpiDevice,
{
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI) -> Self {
        Self::new(SpiInterface::new(spi))
    }

    /// Releases the driver, returning the SPI device and configuration.
    pub fn release_spi(self) -> (SPI, Config) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

impl<IFACE, CommE> Adxl345<IFACE>
where
    IFACE: Adxl345Interface<Error = CommE>,
{
    /// Port the driver talks through.
    pub fn port(&self) -> Port {
        IFACE::PORT
    }

    /// Bus address of the device; `None` on SPI.
    pub fn address(&self) -> Option<u8> {
        self.interface.address()
    }

    // ==================================================================
    // == Initialization & Global Configuration ==========================
    // ==================================================================
    /// Verifies the device and programs the active configuration, leaving it measuring.
    pub fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), CommE> {
        self.config.validate().map_err(Error::InvalidConfig)?;

        delay.delay_us(POWER_UP_DELAY_US);
        self.check_id()?;
        self.standby()?;
        self.configure(self.config)?;
        self.measure()?;

        log::debug!("adxl345 ready on {}", IFACE::PORT);
        Ok(())
    }

    /// Applies a new configuration to the device.
    ///
    /// Programs `BW_RATE`, `DATA_FORMAT` and `FIFO_CTL`. Power state is left untouched.
    pub fn configure(&mut self, config: Config) -> Result<(), CommE> {
        config.validate().map_err(Error::InvalidConfig)?;

        self.update_bw_rate(|bw| {
            bw.set_rate(config.data_rate);
            bw.set_low_power(config.low_power);
        })?;
        self.update_data_format(|format| {
            format.set_range(config.range);
            format.set_full_res(config.full_resolution);
            format.set_int_invert(config.interrupts_active_low);
            format.set_justify(false);
        })?;
        self.write_fifo_settings(FifoSettings::new(
            config.fifo_watermark,
            config.fifo_mode,
            config.fifo_trigger,
        ))?;

        self.config = config;
        Ok(())
    }

    /// Changes the output data rate.
    pub fn set_data_rate(&mut self, rate: DataRate) -> Result<(), CommE> {
        self.update_bw_rate(|bw| bw.set_rate(rate))
    }

    /// Enables or disables reduced power operation.
    pub fn set_low_power(&mut self, low_power: bool) -> Result<(), CommE> {
        self.update_bw_rate(|bw| bw.set_low_power(low_power))
    }

    /// Changes the g-range.
    pub fn set_range(&mut self, range: Range) -> Result<(), CommE> {
        self.update_data_format(|format| format.set_range(range))
    }

    /// Selects full resolution or fixed 10-bit output.
    pub fn set_full_resolution(&mut self, full_resolution: bool) -> Result<(), CommE> {
        self.update_data_format(|format| format.set_full_res(full_resolution))
    }

    // ==================================================================
    // == Power Control =================================================
    // ==================================================================
    /// Enters measurement mode.
    pub fn measure(&mut self) -> Result<(), CommE> {
        self.update_power_ctl(|power| {
            power.set_sleep(false);
            power.set_measure(true);
        })?;
        Ok(())
    }

    /// Enters standby; the sensor stops sampling.
    pub fn standby(&mut self) -> Result<(), CommE> {
        self.update_power_ctl(|power| power.set_measure(false))?;
        Ok(())
    }

    /// Updates the sleep related `POWER_CTL` fields.
    pub fn set_sleep(
        &mut self,
        link: Option<bool>,
        auto_sleep: Option<bool>,
        sleep: Option<bool>,
        wakeup: Option<WakeupRate>,
    ) -> Result<(), CommE> {
        self.update_power_ctl(|power| {
            if let Some(link) = link {
                power.set_link(link);
            }

            if let Some(auto_sleep) = auto_sleep {
                power.set_auto_sleep(auto_sleep);
            }

            if let Some(sleep) = sleep {
                power.set_sleep(sleep);
            }

            if let Some(rate) = wakeup {
                power.set_wakeup(rate);
            }
        })?;
        Ok(())
    }

    /// Reads `POWER_CTL`.
    pub fn power_ctl(&mut self) -> Result<PowerCtl, CommE> {
        Ok(PowerCtl::from(self.interface.read_register(REG_POWER_CTL)?))
    }

    // ==================================================================
    // == Register Access ===============================================
    // ==================================================================
    /// Reads one register from the register map.
    pub fn read_register(&mut self, address: u8) -> Result<u8, CommE> {
        register_info(address).ok_or(Error::InvalidRegister(address))?;
        Ok(self.interface.read_register(address)?)
    }

    /// Reads `buf.len()` consecutive registers starting at `address`.
    pub fn read_registers(&mut self, address: u8, buf: &mut [u8]) -> Result<(), CommE> {
        register_info(address).ok_or(Error::InvalidRegister(address))?;
        if let Some(extra) = buf.len().checked_sub(1) {
            let last = u8::try_from(usize::from(address) + extra)
                .map_err(|_| Error::InvalidRegister(address))?;
            register_info(last).ok_or(Error::InvalidRegister(last))?;
        }

        Ok(self.interface.read_many(address, buf)?)
    }

    /// Writes one register, rejecting reserved and read-only addresses.
    ///
    /// Writes to `BW_RATE`, `DATA_FORMAT` and `FIFO_CTL` are mirrored into the
    /// active configuration so samples keep the right scale. Values the driver
    /// cannot decode or run (left-justified output, low power outside
    /// 12.5-400 Hz) are rejected before reaching the bus.
    pub fn write_register(&mut self, address: u8, value: u8) -> Result<(), CommE> {
        let info = register_info(address).ok_or(Error::InvalidRegister(address))?;
        if !info.access.is_writable() {
            return Err(Error::ReadOnlyRegister(address));
        }
        check_raw_write(address, value).map_err(Error::InvalidConfig)?;

        self.interface.write_register(address, value)?;
        log::trace!("wrote {=u8:#x} to {}", value, info.name);

        self.mirror_register(address, value);
        Ok(())
    }

    // ==================================================================
    // == Identification ================================================
    // ==================================================================
    /// Reads the `DEVID` register.
    pub fn read_device_id(&mut self) -> Result<u8, CommE> {
        Ok(self.interface.read_register(REG_DEVID)?)
    }

    /// Verifies `DEVID` against the expected `0xE5` and remembers it.
    pub fn check_id(&mut self) -> Result<u8, CommE> {
        let id = self.read_device_id()?;
        if id != EXPECTED_DEVID {
            log::warning!("unexpected DEVID {=u8:#x}", id);
            return Err(Error::DeviceIdMismatch(id));
        }

        self.device_id = Some(id);
        Ok(id)
    }

    // ==================================================================
    // == Data Acquisition ==============================================
    // ==================================================================
    /// Reads a raw acceleration triplet with one burst from `DATAX0`.
    pub fn read_xyz_raw(&mut self) -> Result<[i16; 3], CommE> {
        let mut raw = [0u8; RAW_AXIS_BYTES];
        self.interface.read_many(REG_DATAX0, &mut raw)?;
        Ok(crate::sample::decode_xyz(&raw))
    }

    /// Reads one sample, scales it with the active range and keeps it as the last sample.
    pub fn read_sample(&mut self) -> Result<Sample, CommE> {
        let raw = self.read_xyz_raw()?;
        let sample = Sample::from_raw(raw, self.config.scale_mg_per_lsb());
        log::trace!("sample {}", sample.raw);

        self.last_sample = sample;
        Ok(sample)
    }

    /// Returns acceleration in g.
    pub fn read_xyz_g(&mut self) -> Result<[f32; 3], CommE> {
        Ok(self.read_sample()?.g)
    }

    /// Returns `true` when a new sample is waiting in the output registers.
    pub fn data_ready(&mut self) -> Result<bool, CommE> {
        Ok(self.interrupt_source()?.data_ready())
    }

    /// Averages `count` consecutive samples, waiting one output period before each.
    pub(crate) fn average_raw(
        &mut self,
        delay: &mut impl DelayNs,
        count: u8,
    ) -> Result<[i32; 3], CommE> {
        let count = count.max(1);
        let period_us = self.config.data_rate.period_us();

        let mut sum = [0i32; 3];
        for _ in 0..count {
            delay.delay_us(period_us);
            let raw = self.read_xyz_raw()?;
            for (acc, value) in sum.iter_mut().zip(raw) {
                *acc += i32::from(value);
            }
        }

        Ok(sum.map(|total| div_round(total, i32::from(count))))
    }

    // ==================================================================
    // == Offsets =======================================================
    // ==================================================================
    /// Writes the `OFSX`, `OFSY` and `OFSZ` trims (15.6 mg/LSB).
    pub fn set_offsets(&mut self, offsets: [i8; 3]) -> Result<(), CommE> {
        Ok(self.interface.write_many(REG_OFSX, &offsets.map(|o| o as u8))?)
    }

    /// Reads the `OFSX`, `OFSY` and `OFSZ` trims.
    pub fn offsets(&mut self) -> Result<[i8; 3], CommE> {
        let mut raw = [0u8; 3];
        self.interface.read_many(REG_OFSX, &mut raw)?;
        Ok(raw.map(|o| o as i8))
    }

    /// Computes and writes offset trims with the sensor at rest, Z axis up.
    ///
    /// The sensor must be measuring. Existing trims are cleared before
    /// `samples` readings are averaged.
    pub fn calibrate_offsets(
        &mut self,
        delay: &mut impl DelayNs,
        samples: u8,
    ) -> Result<[i8; 3], CommE> {
        self.set_offsets([0; 3])?;

        let average = self.average_raw(delay, samples)?;
        let scale = self
            .config
            .range
            .scale_tenth_mg_per_lsb(self.config.full_resolution);
        let target = [0, 0, ONE_G_TENTH_MG];

        let mut offsets = [0i8; 3];
        for ((offset, counts), expected) in offsets.iter_mut().zip(average).zip(target) {
            let trim = div_round(expected - counts * scale, OFFSET_TENTH_MG_PER_LSB);
            *offset = trim.clamp(i8::MIN.into(), i8::MAX.into()) as i8;
        }

        self.set_offsets(offsets)?;
        log::debug!("offsets calibrated to {}", offsets);
        Ok(offsets)
    }

    // ==================================================================
    // == Tap, Activity & Free-Fall =====================================
    // ==================================================================
    /// Programs `THRESH_TAP`, `DUR`, `Latent`, `Window` and `TAP_AXES`.
    pub fn configure_tap(&mut self, tap: &TapConfig) -> Result<(), CommE> {
        let threshold = tap.threshold_code().map_err(Error::InvalidConfig)?;
        let timing = tap.timing_codes().map_err(Error::InvalidConfig)?;

        self.interface.write_register(REG_THRESH_TAP, threshold)?;
        self.interface.write_many(REG_DUR, &timing)?;
        self.interface.write_register(REG_TAP_AXES, tap.tap_axes().into())?;
        Ok(())
    }

    /// Programs `THRESH_ACT`, `THRESH_INACT`, `TIME_INACT` and `ACT_INACT_CTL`.
    pub fn configure_activity(&mut self, activity: &ActivityConfig) -> Result<(), CommE> {
        let thresholds = activity.threshold_codes().map_err(Error::InvalidConfig)?;

        self.interface.write_many(REG_THRESH_ACT, &thresholds)?;
        self.interface
            .write_register(REG_ACT_INACT_CTL, activity.control().into())?;
        Ok(())
    }

    /// Programs `THRESH_FF` and `TIME_FF`.
    pub fn configure_free_fall(&mut self, free_fall: &FreeFallConfig) -> Result<(), CommE> {
        let codes = free_fall.codes().map_err(Error::InvalidConfig)?;
        Ok(self.interface.write_many(REG_THRESH_FF, &codes)?)
    }

    /// Reads `ACT_TAP_STATUS`.
    pub fn tap_status(&mut self) -> Result<ActTapStatus, CommE> {
        Ok(ActTapStatus::from(
            self.interface.read_register(REG_ACT_TAP_STATUS)?,
        ))
    }

    // ==================================================================
    // == Interrupts ====================================================
    // ==================================================================
    /// Writes `INT_ENABLE`. Map interrupts to their pins before enabling them.
    pub fn enable_interrupts(&mut self, flags: InterruptFlags) -> Result<(), CommE> {
        Ok(self.interface.write_register(REG_INT_ENABLE, flags.into())?)
    }

    /// Writes `INT_MAP`; set bits route to `INT2`, clear bits to `INT1`.
    pub fn map_interrupts(&mut self, int2: InterruptFlags) -> Result<(), CommE> {
        Ok(self.interface.write_register(REG_INT_MAP, int2.into())?)
    }

    /// Reads `INT_SOURCE`. Reading clears the latched event flags.
    pub fn interrupt_source(&mut self) -> Result<InterruptFlags, CommE> {
        Ok(InterruptFlags::from(
            self.interface.read_register(REG_INT_SOURCE)?,
        ))
    }

    // ==================================================================
    // == FIFO ==========================================================
    // ==================================================================
    /// Reads `FIFO_CTL`.
    pub fn fifo_settings(&mut self) -> Result<FifoSettings, CommE> {
        let raw = self.interface.read_register(REG_FIFO_CTL)?;
        Ok(FifoSettings::from(FifoCtl::from(raw)))
    }

    /// Changes FIFO mode, watermark and trigger pin.
    pub fn configure_fifo(&mut self, settings: FifoSettings) -> Result<(), CommE> {
        if settings.watermark > MAX_FIFO_WATERMARK {
            return Err(Error::InvalidConfig(ConfigError::FifoWatermark));
        }

        self.write_fifo_settings(settings)
    }

    /// Reads the FIFO fill level.
    pub fn fifo_level(&mut self) -> Result<FifoLevel, CommE> {
        fifo::read_fifo_level(&mut self.interface)
    }

    /// Pops buffered frames into `samples`, returning how many were read.
    ///
    /// `delay` spaces consecutive pops by [`fifo::POP_DELAY_US`].
    pub fn read_fifo_samples(
        &mut self,
        delay: &mut impl DelayNs,
        samples: &mut [Sample],
    ) -> Result<usize, CommE> {
        let count = fifo::read_fifo_samples(
            &mut self.interface,
            delay,
            samples,
            self.config.scale_mg_per_lsb(),
        )?;

        if let Some(last) = count.checked_sub(1).and_then(|index| samples.get(index)) {
            self.last_sample = *last;
        }
        Ok(count)
    }

    /// Discards every buffered frame.
    pub fn flush_fifo(&mut self, delay: &mut impl DelayNs) -> Result<usize, CommE> {
        fifo::flush_fifo(&mut self.interface, delay)
    }

    // ==================================================================
    // == Self-Test ======================================================
    // ==================================================================
    /// Executes the datasheet self-test routine.
    pub fn run_self_test(&mut self, delay: &mut impl DelayNs) -> Result<SelfTestReport, CommE> {
        run_self_test(self, delay)
    }

    /// Sets or clears the `SELF_TEST` force bit in `DATA_FORMAT`.
    pub(crate) fn set_self_test_force(&mut self, enabled: bool) -> Result<(), CommE> {
        self.update_data_format(|format| format.set_self_test(enabled))
    }

    // ==================================================================
    // == Internal Configuration Helpers =================================
    // ==================================================================

    fn write_fifo_settings(&mut self, settings: FifoSettings) -> Result<(), CommE> {
        self.interface
            .write_register(REG_FIFO_CTL, FifoCtl::from(settings).into())?;

        self.config.fifo_mode = settings.mode;
        self.config.fifo_watermark = settings.watermark;
        self.config.fifo_trigger = settings.trigger;
        Ok(())
    }

    fn update_bw_rate<F>(&mut self, mut mutate: F) -> Result<(), CommE>
    where
        F: FnMut(&mut BwRate),
    {
        let current = self.interface.read_register(REG_BW_RATE)?;

        let mut bw = BwRate::from(current);
        mutate(&mut bw);

        if bw.low_power() && !bw.rate().supports_low_power() {
            return Err(Error::InvalidConfig(ConfigError::LowPowerRate));
        }

        let updated = u8::from(bw);
        if updated != current {
            self.interface.write_register(REG_BW_RATE, updated)?;
        }

        self.mirror_register(REG_BW_RATE, updated);
        Ok(())
    }

    fn update_data_format<F>(&mut self, mut mutate: F) -> Result<(), CommE>
    where
        F: FnMut(&mut DataFormat),
    {
        let current = self.interface.read_register(REG_DATA_FORMAT)?;

        let mut format = DataFormat::from(current);
        mutate(&mut format);

        let updated = u8::from(format);
        if updated != current {
            self.interface.write_register(REG_DATA_FORMAT, updated)?;
        }

        self.mirror_register(REG_DATA_FORMAT, updated);
        Ok(())
    }

    fn update_power_ctl<F>(&mut self, mut mutate: F) -> Result<PowerCtl, CommE>
    where
        F: FnMut(&mut PowerCtl),
    {
        let current = self.interface.read_register(REG_POWER_CTL)?;

        let mut power = PowerCtl::from(current);
        mutate(&mut power);

        let updated = u8::from(power);
        if updated != current {
            self.interface.write_register(REG_POWER_CTL, updated)?;
        }

        Ok(power)
    }

    fn mirror_register(&mut self, address: u8, value: u8) {
        match address {
            REG_BW_RATE => {
                let bw = BwRate::from(value);
                self.config.data_rate = bw.rate();
                self.config.low_power = bw.low_power();
            }
            REG_DATA_FORMAT => {
                let format = DataFormat::from(value);
                self.config.range = format.range();
                self.config.full_resolution = format.full_res();
                self.config.interrupts_active_low = format.int_invert();
            }
            REG_FIFO_CTL => {
                let settings = FifoSettings::from(FifoCtl::from(value));
                self.config.fifo_mode = settings.mode;
                self.config.fifo_watermark = settings.watermark;
                self.config.fifo_trigger = settings.trigger;
            }
            _ => {}
        }
    }
}

fn check_raw_write(address: u8, value: u8) -> core::result::Result<(), ConfigError> {
    match address {
        REG_BW_RATE => {
            let bw = BwRate::from(value);
            if bw.low_power() && !bw.rate().supports_low_power() {
                return Err(ConfigError::LowPowerRate);
            }
        }
        REG_DATA_FORMAT if DataFormat::from(value).justify() => {
            return Err(ConfigError::LeftJustified);
        }
        _ => {}
    }
    Ok(())
}

/// Integer division rounding half away from zero; `divisor` must be positive.
fn div_round(value: i32, divisor: i32) -> i32 {
    if value >= 0 {
        (value + divisor / 2) / divisor
    } else {
        (value - divisor / 2) / divisor
    }
}
