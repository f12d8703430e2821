//! Tap, activity and free-fall detection settings.
//!
//! Each setting is expressed in physical units and converted to the register
//! scale factors when written to the device.

use crate::config::ConfigError;
use crate::params::Coupling;
use crate::registers::{ActInactCtl, TapAxes};

/// Scale of `THRESH_TAP`, `THRESH_ACT`, `THRESH_INACT` and `THRESH_FF`, in µg.
pub const THRESHOLD_UG_PER_LSB: u32 = 62_500;
/// Scale of `DUR`.
pub const TAP_DURATION_US_PER_LSB: u32 = 625;
/// Scale of `Latent` and `Window`.
pub const TAP_LATENCY_US_PER_LSB: u32 = 1_250;
/// Scale of `TIME_FF`.
pub const FREE_FALL_MS_PER_LSB: u32 = 5;
/// Scale of `OFSX`, `OFSY` and `OFSZ`, in tenths of mg.
pub const OFFSET_TENTH_MG_PER_LSB: i32 = 156;

/// Axis selection shared by the tap and activity detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Axes {
    /// X axis.
    pub x: bool,
    /// Y axis.
    pub y: bool,
    /// Z axis.
    pub z: bool,
}

impl Axes {
    /// All three axes.
    pub const ALL: Self = Self {
        x: true,
        y: true,
        z: true,
    };
}

/// Threshold in mg converted to the 62.5 mg/LSB register scale.
pub(crate) fn threshold_code(mg: u32) -> core::result::Result<u8, ConfigError> {
    scaled_code(mg.saturating_mul(1_000), THRESHOLD_UG_PER_LSB)
}

fn scaled_code(value: u32, per_lsb: u32) -> core::result::Result<u8, ConfigError> {
    u8::try_from(value / per_lsb).map_err(|_| ConfigError::EventParameter)
}

/// Single and double tap detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapConfig {
    /// Acceleration a tap must exceed, in mg (62.5 mg/LSB, 16 g max).
    pub threshold_mg: u32,
    /// Maximum time above threshold for a tap, in µs (625 µs/LSB).
    pub duration_us: u32,
    /// Wait after the first tap before the double-tap window opens, in µs (1.25 ms/LSB).
    pub latency_us: u32,
    /// Length of the double-tap window, in µs (1.25 ms/LSB). Zero disables double tap.
    pub window_us: u32,
    /// Axes taking part in tap detection.
    pub axes: Axes,
    /// Suppress a double tap when acceleration stays above threshold during latency.
    pub suppress_double_tap: bool,
}

impl TapConfig {
    /// Register payload for `THRESH_TAP` (0x1D).
    pub fn threshold_code(&self) -> core::result::Result<u8, ConfigError> {
        threshold_code(self.threshold_mg)
    }

    /// Register payloads for `DUR`, `Latent` and `Window` (0x21..=0x23).
    pub fn timing_codes(&self) -> core::result::Result<[u8; 3], ConfigError> {
        Ok([
            scaled_code(self.duration_us, TAP_DURATION_US_PER_LSB)?,
            scaled_code(self.latency_us, TAP_LATENCY_US_PER_LSB)?,
            scaled_code(self.window_us, TAP_LATENCY_US_PER_LSB)?,
        ])
    }

    /// Register payload for `TAP_AXES` (0x2A).
    pub fn tap_axes(&self) -> TapAxes {
        TapAxes::new()
            .with_tap_x(self.axes.x)
            .with_tap_y(self.axes.y)
            .with_tap_z(self.axes.z)
            .with_suppress(self.suppress_double_tap)
    }
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            threshold_mg: 3_000,
            duration_us: 10_000,
            latency_us: 100_000,
            window_us: 300_000,
            axes: Axes::ALL,
            suppress_double_tap: false,
        }
    }
}

/// Activity and inactivity detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActivityConfig {
    /// Activity threshold in mg (62.5 mg/LSB).
    pub activity_threshold_mg: u32,
    /// Inactivity threshold in mg (62.5 mg/LSB).
    pub inactivity_threshold_mg: u32,
    /// Time below the inactivity threshold before inactivity is declared, in seconds.
    pub inactivity_time_s: u8,
    /// Axes taking part in activity detection.
    pub activity_axes: Axes,
    /// Axes taking part in inactivity detection.
    pub inactivity_axes: Axes,
    /// Activity detector coupling.
    pub activity_coupling: Coupling,
    /// Inactivity detector coupling.
    pub inactivity_coupling: Coupling,
}

impl ActivityConfig {
    /// Register payloads for `THRESH_ACT`, `THRESH_INACT` and `TIME_INACT` (0x24..=0x26).
    pub fn threshold_codes(&self) -> core::result::Result<[u8; 3], ConfigError> {
        Ok([
            threshold_code(self.activity_threshold_mg)?,
            threshold_code(self.inactivity_threshold_mg)?,
            self.inactivity_time_s,
        ])
    }

    /// Register payload for `ACT_INACT_CTL` (0x27).
    pub fn control(&self) -> ActInactCtl {
        ActInactCtl::new()
            .with_act_coupling(self.activity_coupling)
            .with_act_x(self.activity_axes.x)
            .with_act_y(self.activity_axes.y)
            .with_act_z(self.activity_axes.z)
            .with_inact_coupling(self.inactivity_coupling)
            .with_inact_x(self.inactivity_axes.x)
            .with_inact_y(self.inactivity_axes.y)
            .with_inact_z(self.inactivity_axes.z)
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            activity_threshold_mg: 250,
            inactivity_threshold_mg: 125,
            inactivity_time_s: 5,
            activity_axes: Axes::ALL,
            inactivity_axes: Axes::ALL,
            activity_coupling: Coupling::Ac,
            inactivity_coupling: Coupling::Ac,
        }
    }
}

/// Free-fall detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FreeFallConfig {
    /// All axes must read below this value, in mg (62.5 mg/LSB). 300 mg to 600 mg is typical.
    pub threshold_mg: u32,
    /// Minimum time below threshold, in ms (5 ms/LSB). 100 ms to 350 ms is typical.
    pub time_ms: u32,
}

impl FreeFallConfig {
    /// Register payloads for `THRESH_FF` and `TIME_FF` (0x28..=0x29).
    pub fn codes(&self) -> core::result::Result<[u8; 2], ConfigError> {
        Ok([
            threshold_code(self.threshold_mg)?,
            scaled_code(self.time_ms, FREE_FALL_MS_PER_LSB)?,
        ])
    }
}

impl Default for FreeFallConfig {
    fn default() -> Self {
        Self {
            threshold_mg: 375,
            time_ms: 200,
        }
    }
}
