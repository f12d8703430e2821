//! Strongly typed parameter enumerations for the ADXL345 driver.
//!
//! These enums map directly to datasheet field encodings and are used across
//! [`Config`](crate::config::Config) and the high-level driver APIs.
//!
//! # Examples
//!
//! ```rust
//! use adxl345::params::{DataRate, Range};
//!
//! let rate = DataRate::Hz100;
//! let range = Range::G16;
//! assert_eq!(rate.millihertz(), 100_000);
//! assert_eq!(range.scale_mg_per_lsb(true), 3.9);
//! ```

use modular_bitfield::prelude::Specifier;

use crate::sample::SENSITIVITY_TENTH_MG_PER_LSB;

/// Output data rate codes encoded in `BW_RATE[3:0]`.
///
/// The output bandwidth is half of the selected data rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 4]
pub enum DataRate {
    /// 0.10 Hz.
    Hz0_10 = 0b0000,
    /// 0.20 Hz.
    Hz0_20 = 0b0001,
    /// 0.39 Hz.
    Hz0_39 = 0b0010,
    /// 0.78 Hz.
    Hz0_78 = 0b0011,
    /// 1.56 Hz.
    Hz1_56 = 0b0100,
    /// 3.13 Hz.
    Hz3_13 = 0b0101,
    /// 6.25 Hz.
    Hz6_25 = 0b0110,
    /// 12.5 Hz.
    Hz12_5 = 0b0111,
    /// 25 Hz.
    Hz25 = 0b1000,
    /// 50 Hz.
    Hz50 = 0b1001,
    /// 100 Hz (reset default).
    Hz100 = 0b1010,
    /// 200 Hz.
    Hz200 = 0b1011,
    /// 400 Hz.
    Hz400 = 0b1100,
    /// 800 Hz.
    Hz800 = 0b1101,
    /// 1600 Hz.
    Hz1600 = 0b1110,
    /// 3200 Hz.
    Hz3200 = 0b1111,
}

impl DataRate {
    /// Returns the data rate in millihertz.
    pub const fn millihertz(self) -> u32 {
        match self {
            Self::Hz0_10 => 100,
            Self::Hz0_20 => 200,
            Self::Hz0_39 => 390,
            Self::Hz0_78 => 780,
            Self::Hz1_56 => 1_560,
            Self::Hz3_13 => 3_130,
            Self::Hz6_25 => 6_250,
            Self::Hz12_5 => 12_500,
            Self::Hz25 => 25_000,
            Self::Hz50 => 50_000,
            Self::Hz100 => 100_000,
            Self::Hz200 => 200_000,
            Self::Hz400 => 400_000,
            Self::Hz800 => 800_000,
            Self::Hz1600 => 1_600_000,
            Self::Hz3200 => 3_200_000,
        }
    }

    /// Returns the data rate in hertz.
    pub fn hz(self) -> f32 {
        self.millihertz() as f32 / 1000.0
    }

    /// Time between two consecutive output samples, rounded up to whole microseconds.
    pub const fn period_us(self) -> u32 {
        1_000_000_000u32.div_ceil(self.millihertz())
    }

    /// Reduced power operation is only available from 12.5 Hz to 400 Hz.
    pub const fn supports_low_power(self) -> bool {
        matches!(
            self,
            Self::Hz12_5 | Self::Hz25 | Self::Hz50 | Self::Hz100 | Self::Hz200 | Self::Hz400
        )
    }
}

/// g-range selection encoded in `DATA_FORMAT[1:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum Range {
    /// ±2 g.
    G2 = 0b00,
    /// ±4 g.
    G4 = 0b01,
    /// ±8 g.
    G8 = 0b10,
    /// ±16 g.
    G16 = 0b11,
}

impl Range {
    /// Returns the full-scale value in g.
    pub const fn g(self) -> u8 {
        match self {
            Self::G2 => 2,
            Self::G4 => 4,
            Self::G8 => 8,
            Self::G16 => 16,
        }
    }

    /// Scale factor in tenths of mg/LSB for this range.
    ///
    /// Full resolution keeps 3.9 mg/LSB at every range; fixed 10-bit mode
    /// doubles the step with each range increment.
    pub const fn scale_tenth_mg_per_lsb(self, full_resolution: bool) -> i32 {
        if full_resolution {
            SENSITIVITY_TENTH_MG_PER_LSB
        } else {
            SENSITIVITY_TENTH_MG_PER_LSB << self as u8
        }
    }

    /// Scale factor in mg/LSB for this range.
    pub fn scale_mg_per_lsb(self, full_resolution: bool) -> f32 {
        self.scale_tenth_mg_per_lsb(full_resolution) as f32 / 10.0
    }
}

/// FIFO operating modes encoded in `FIFO_CTL[7:6]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum FifoMode {
    /// FIFO bypassed.
    Bypass = 0b00,
    /// Collects up to 32 samples, then stops.
    Fifo = 0b01,
    /// Keeps the latest 32 samples, discarding the oldest.
    Stream = 0b10,
    /// Holds the samples surrounding a trigger event.
    Trigger = 0b11,
}

/// Sampling rate while asleep, encoded in `POWER_CTL[1:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum WakeupRate {
    /// 8 Hz.
    Hz8 = 0b00,
    /// 4 Hz.
    Hz4 = 0b01,
    /// 2 Hz.
    Hz2 = 0b10,
    /// 1 Hz.
    Hz1 = 0b11,
}

/// Output pin selection for interrupts and the FIFO trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum InterruptPin {
    /// `INT1` pin.
    Int1 = 0,
    /// `INT2` pin.
    Int2 = 1,
}

/// Coupling of the activity/inactivity detectors (`ACT_INACT_CTL` ACT/INACT ac/dc bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum Coupling {
    /// Compare against the absolute threshold.
    Dc = 0,
    /// Compare against the acceleration at the start of detection.
    Ac = 1,
}
