//! Configuration primitives for the ADXL345 driver.

use crate::params::{DataRate, FifoMode, InterruptPin, Range};

/// Deepest FIFO watermark the 5-bit `FIFO_CTL.SAMPLES` field can hold.
pub const MAX_FIFO_WATERMARK: u8 = 31;

/// User-facing configuration for the ADXL345 sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Output data rate selection.
    pub data_rate: DataRate,
    /// Reduced power operation.
    pub low_power: bool,
    /// g-range selection.
    pub range: Range,
    /// Full resolution (3.9 mg/LSB at every range) instead of fixed 10-bit output.
    pub full_resolution: bool,
    /// Drive the interrupt pins active low.
    pub interrupts_active_low: bool,
    /// FIFO operating mode.
    pub fifo_mode: FifoMode,
    /// FIFO watermark (or trigger depth) in samples.
    pub fifo_watermark: u8,
    /// Pin receiving the FIFO trigger event.
    pub fifo_trigger: InterruptPin,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks whether this configuration is valid according to datasheet rules.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.low_power && !self.data_rate.supports_low_power() {
            return Err(ConfigError::LowPowerRate);
        }

        if self.fifo_watermark > MAX_FIFO_WATERMARK {
            return Err(ConfigError::FifoWatermark);
        }

        Ok(())
    }

    /// Scale factor of the output registers under this configuration, in mg/LSB.
    pub fn scale_mg_per_lsb(&self) -> f32 {
        self.range.scale_mg_per_lsb(self.full_resolution)
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the output data rate.
    pub fn data_rate(mut self, data_rate: DataRate) -> Self {
        self.config.data_rate = data_rate;
        self
    }

    /// Enables or disables reduced power operation.
    pub fn low_power(mut self, low_power: bool) -> Self {
        self.config.low_power = low_power;
        self
    }

    /// Overrides the g-range.
    pub fn range(mut self, range: Range) -> Self {
        self.config.range = range;
        self
    }

    /// Selects full resolution or fixed 10-bit output.
    pub fn full_resolution(mut self, full_resolution: bool) -> Self {
        self.config.full_resolution = full_resolution;
        self
    }

    /// Selects active-low interrupt outputs.
    pub fn interrupts_active_low(mut self, active_low: bool) -> Self {
        self.config.interrupts_active_low = active_low;
        self
    }

    /// Sets the FIFO mode and watermark.
    pub fn fifo(mut self, mode: FifoMode, watermark: u8) -> Self {
        self.config.fifo_mode = mode;
        self.config.fifo_watermark = watermark;
        self
    }

    /// Routes the FIFO trigger event to `pin`.
    pub fn fifo_trigger(mut self, pin: InterruptPin) -> Self {
        self.config.fifo_trigger = pin;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_rate: DataRate::Hz100,
            low_power: false,
            range: Range::G2,
            full_resolution: true,
            interrupts_active_low: false,
            fifo_mode: FifoMode::Bypass,
            fifo_watermark: 0,
            fifo_trigger: InterruptPin::Int1,
        }
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Reduced power operation requested outside the 12.5 Hz to 400 Hz window.
    LowPowerRate,
    /// FIFO watermark does not fit in five bits.
    FifoWatermark,
    /// Event parameter outside the register range.
    EventParameter,
    /// Left-justified output requested; samples are decoded right-justified.
    LeftJustified,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.scale_mg_per_lsb(), 3.9);
    }

    #[test]
    fn builder_overrides_fields() {
        let config = Config::new()
            .data_rate(DataRate::Hz800)
            .range(Range::G8)
            .full_resolution(false)
            .fifo(FifoMode::Stream, 16)
            .fifo_trigger(InterruptPin::Int2)
            .build();

        assert_eq!(config.data_rate, DataRate::Hz800);
        assert_eq!(config.range, Range::G8);
        assert_eq!(config.fifo_mode, FifoMode::Stream);
        assert_eq!(config.fifo_watermark, 16);
        assert_eq!(config.fifo_trigger, InterruptPin::Int2);
        assert_eq!(config.scale_mg_per_lsb(), 15.6);
    }

    #[test]
    fn low_power_needs_supported_rate() {
        let config = Config::new().data_rate(DataRate::Hz1600).low_power(true).build();
        assert_eq!(config.validate(), Err(ConfigError::LowPowerRate));

        let config = Config::new().data_rate(DataRate::Hz50).low_power(true).build();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn watermark_must_fit_register() {
        let config = Config::new().fifo(FifoMode::Fifo, 32).build();
        assert_eq!(config.validate(), Err(ConfigError::FifoWatermark));
    }
}
