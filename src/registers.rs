//! Register map definitions for the ADXL345 accelerometer.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::{Coupling, DataRate, FifoMode, InterruptPin, Range, WakeupRate};

/// Register address of `DEVID`.
pub const REG_DEVID: u8 = 0x00;
/// Register address of `THRESH_TAP`.
pub const REG_THRESH_TAP: u8 = 0x1D;
/// Register address of `OFSX`.
pub const REG_OFSX: u8 = 0x1E;
/// Register address of `OFSY`.
pub const REG_OFSY: u8 = 0x1F;
/// Register address of `OFSZ`.
pub const REG_OFSZ: u8 = 0x20;
/// Register address of `DUR`.
pub const REG_DUR: u8 = 0x21;
/// Register address of `Latent`.
pub const REG_LATENT: u8 = 0x22;
/// Register address of `Window`.
pub const REG_WINDOW: u8 = 0x23;
/// Register address of `THRESH_ACT`.
pub const REG_THRESH_ACT: u8 = 0x24;
/// Register address of `THRESH_INACT`.
pub const REG_THRESH_INACT: u8 = 0x25;
/// Register address of `TIME_INACT`.
pub const REG_TIME_INACT: u8 = 0x26;
/// Register address of `ACT_INACT_CTL`.
pub const REG_ACT_INACT_CTL: u8 = 0x27;
/// Register address of `THRESH_FF`.
pub const REG_THRESH_FF: u8 = 0x28;
/// Register address of `TIME_FF`.
pub const REG_TIME_FF: u8 = 0x29;
/// Register address of `TAP_AXES`.
pub const REG_TAP_AXES: u8 = 0x2A;
/// Register address of `ACT_TAP_STATUS`.
pub const REG_ACT_TAP_STATUS: u8 = 0x2B;
/// Register address of `BW_RATE`.
pub const REG_BW_RATE: u8 = 0x2C;
/// Register address of `POWER_CTL`.
pub const REG_POWER_CTL: u8 = 0x2D;
/// Register address of `INT_ENABLE`.
pub const REG_INT_ENABLE: u8 = 0x2E;
/// Register address of `INT_MAP`.
pub const REG_INT_MAP: u8 = 0x2F;
/// Register address of `INT_SOURCE`.
pub const REG_INT_SOURCE: u8 = 0x30;
/// Register address of `DATA_FORMAT`.
pub const REG_DATA_FORMAT: u8 = 0x31;
/// Register address of `DATAX0`.
pub const REG_DATAX0: u8 = 0x32;
/// Register address of `DATAX1`.
pub const REG_DATAX1: u8 = 0x33;
/// Register address of `DATAY0`.
pub const REG_DATAY0: u8 = 0x34;
/// Register address of `DATAY1`.
pub const REG_DATAY1: u8 = 0x35;
/// Register address of `DATAZ0`.
pub const REG_DATAZ0: u8 = 0x36;
/// Register address of `DATAZ1`.
pub const REG_DATAZ1: u8 = 0x37;
/// Register address of `FIFO_CTL`.
pub const REG_FIFO_CTL: u8 = 0x38;
/// Register address of `FIFO_STATUS`.
pub const REG_FIFO_STATUS: u8 = 0x39;

/// Fixed value of the `DEVID` register.
pub const EXPECTED_DEVID: u8 = 0xE5;

/// 7-bit I2C address of the sensor, selected by the `ALT ADDRESS` pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveAddr {
    /// `ALT ADDRESS` tied to ground: `0x53`.
    Default,
    /// `ALT ADDRESS` tied high: `0x1D`.
    Alternate,
}

impl SlaveAddr {
    /// Returns the 7-bit bus address.
    pub const fn addr(self) -> u8 {
        match self {
            Self::Default => 0x53,
            Self::Alternate => 0x1D,
        }
    }
}

impl From<SlaveAddr> for u8 {
    fn from(value: SlaveAddr) -> Self {
        value.addr()
    }
}

/// Access permissions encoded for each register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterAccess {
    /// Read-only register.
    ReadOnly,
    /// Read/write register.
    ReadWrite,
}

impl RegisterAccess {
    /// Returns `true` when the register accepts writes.
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

/// One row of the register map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterInfo {
    /// Datasheet mnemonic.
    pub name: &'static str,
    /// Register address.
    pub address: u8,
    /// Access permission classification.
    pub access: RegisterAccess,
    /// Power-on reset value.
    pub reset: u8,
}

const fn row(name: &'static str, address: u8, access: RegisterAccess, reset: u8) -> RegisterInfo {
    RegisterInfo {
        name,
        address,
        access,
        reset,
    }
}

use RegisterAccess::{ReadOnly as R, ReadWrite as RW};

/// Every register exposed by the ADXL345, in address order.
///
/// Addresses `0x01` to `0x1C` are reserved and absent from the table.
pub static REGISTER_MAP: [RegisterInfo; 30] = [
    row("DEVID", REG_DEVID, R, 0xE5),
    row("THRESH_TAP", REG_THRESH_TAP, RW, 0x00),
    row("OFSX", REG_OFSX, RW, 0x00),
    row("OFSY", REG_OFSY, RW, 0x00),
    row("OFSZ", REG_OFSZ, RW, 0x00),
    row("DUR", REG_DUR, RW, 0x00),
    row("Latent", REG_LATENT, RW, 0x00),
    row("Window", REG_WINDOW, RW, 0x00),
    row("THRESH_ACT", REG_THRESH_ACT, RW, 0x00),
    row("THRESH_INACT", REG_THRESH_INACT, RW, 0x00),
    row("TIME_INACT", REG_TIME_INACT, RW, 0x00),
    row("ACT_INACT_CTL", REG_ACT_INACT_CTL, RW, 0x00),
    row("THRESH_FF", REG_THRESH_FF, RW, 0x00),
    row("TIME_FF", REG_TIME_FF, RW, 0x00),
    row("TAP_AXES", REG_TAP_AXES, RW, 0x00),
    row("ACT_TAP_STATUS", REG_ACT_TAP_STATUS, R, 0x00),
    row("BW_RATE", REG_BW_RATE, RW, 0x0A),
    row("POWER_CTL", REG_POWER_CTL, RW, 0x00),
    row("INT_ENABLE", REG_INT_ENABLE, RW, 0x00),
    row("INT_MAP", REG_INT_MAP, RW, 0x00),
    row("INT_SOURCE", REG_INT_SOURCE, R, 0x02),
    row("DATA_FORMAT", REG_DATA_FORMAT, RW, 0x00),
    row("DATAX0", REG_DATAX0, R, 0x00),
    row("DATAX1", REG_DATAX1, R, 0x00),
    row("DATAY0", REG_DATAY0, R, 0x00),
    row("DATAY1", REG_DATAY1, R, 0x00),
    row("DATAZ0", REG_DATAZ0, R, 0x00),
    row("DATAZ1", REG_DATAZ1, R, 0x00),
    row("FIFO_CTL", REG_FIFO_CTL, RW, 0x00),
    row("FIFO_STATUS", REG_FIFO_STATUS, R, 0x00),
];

/// Looks up a register by address.
pub fn register_info(address: u8) -> Option<&'static RegisterInfo> {
    REGISTER_MAP.iter().find(|info| info.address == address)
}

/// Minimal metadata exposed by every register value type.
pub trait Register {
    /// Raw storage backing the register payload.
    type Raw: Copy;
    /// Register address as documented in the datasheet.
    const ADDRESS: u8;
    /// Access permission classification.
    const ACCESS: RegisterAccess;
    /// Optional reset/default value defined by the datasheet.
    const RESET_VALUE: Option<Self::Raw>;
}

macro_rules! byte_register {
    ($ty:ident, $address:expr, $access:expr, $reset:expr) => {
        impl From<u8> for $ty {
            fn from(value: u8) -> Self {
                Self::from_bytes([value])
            }
        }

        impl From<$ty> for u8 {
            fn from(value: $ty) -> Self {
                value.into_bytes()[0]
            }
        }

        impl Register for $ty {
            type Raw = u8;
            const ADDRESS: u8 = $address;
            const ACCESS: RegisterAccess = $access;
            const RESET_VALUE: Option<Self::Raw> = Some($reset);
        }
    };
}

/// Bitfield representation of the `ACT_INACT_CTL` register (address `0x27`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActInactCtl {
    // Inactivity Z-axis participation (bit 0).
    pub inact_z: bool,
    // Inactivity Y-axis participation (bit 1).
    pub inact_y: bool,
    // Inactivity X-axis participation (bit 2).
    pub inact_x: bool,
    // Inactivity ac/dc coupling (bit 3).
    pub inact_coupling: Coupling,
    // Activity Z-axis participation (bit 4).
    pub act_z: bool,
    // Activity Y-axis participation (bit 5).
    pub act_y: bool,
    // Activity X-axis participation (bit 6).
    pub act_x: bool,
    // Activity ac/dc coupling (bit 7).
    pub act_coupling: Coupling,
}

byte_register!(ActInactCtl, REG_ACT_INACT_CTL, RW, 0x00);

/// Bitfield representation of the `TAP_AXES` register (address `0x2A`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapAxes {
    // Z-axis tap detection (bit 0).
    pub tap_z: bool,
    // Y-axis tap detection (bit 1).
    pub tap_y: bool,
    // X-axis tap detection (bit 2).
    pub tap_x: bool,
    // Suppress double tap when acceleration exceeds THRESH_TAP inside the latency window (bit 3).
    pub suppress: bool,
    #[skip]
    __: B4,
}

byte_register!(TapAxes, REG_TAP_AXES, RW, 0x00);

/// Bitfield representation of the `ACT_TAP_STATUS` register (address `0x2B`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActTapStatus {
    // Z-axis involved in the tap event (bit 0).
    pub tap_z: bool,
    // Y-axis involved in the tap event (bit 1).
    pub tap_y: bool,
    // X-axis involved in the tap event (bit 2).
    pub tap_x: bool,
    // Device is asleep (bit 3).
    pub asleep: bool,
    // Z-axis involved in the activity event (bit 4).
    pub act_z: bool,
    // Y-axis involved in the activity event (bit 5).
    pub act_y: bool,
    // X-axis involved in the activity event (bit 6).
    pub act_x: bool,
    #[skip]
    __: B1,
}

byte_register!(ActTapStatus, REG_ACT_TAP_STATUS, R, 0x00);

/// Bitfield representation of the `BW_RATE` register (address `0x2C`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BwRate {
    // Output data rate (bits 3:0).
    pub rate: DataRate,
    // Reduced power operation (bit 4).
    pub low_power: bool,
    #[skip]
    __: B3,
}

byte_register!(BwRate, REG_BW_RATE, RW, 0x0A);

/// Bitfield representation of the `POWER_CTL` register (address `0x2D`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCtl {
    // Sampling rate during sleep (bits 1:0).
    pub wakeup: WakeupRate,
    // Sleep mode (bit 2).
    pub sleep: bool,
    // Measurement mode; standby when cleared (bit 3).
    pub measure: bool,
    // Automatic sleep on inactivity (bit 4).
    pub auto_sleep: bool,
    // Serial link of activity and inactivity (bit 5).
    pub link: bool,
    #[skip]
    __: B2,
}

byte_register!(PowerCtl, REG_POWER_CTL, RW, 0x00);

/// Shared bit layout of `INT_ENABLE` (`0x2E`), `INT_MAP` (`0x2F`) and `INT_SOURCE` (`0x30`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptFlags {
    // FIFO overrun (bit 0).
    pub overrun: bool,
    // FIFO watermark reached (bit 1).
    pub watermark: bool,
    // Free-fall (bit 2).
    pub free_fall: bool,
    // Inactivity (bit 3).
    pub inactivity: bool,
    // Activity (bit 4).
    pub activity: bool,
    // Double tap (bit 5).
    pub double_tap: bool,
    // Single tap (bit 6).
    pub single_tap: bool,
    // New data available (bit 7).
    pub data_ready: bool,
}

byte_register!(InterruptFlags, REG_INT_SOURCE, R, 0x02);

impl InterruptFlags {
    /// Returns `true` when no flag is set.
    pub fn is_empty(self) -> bool {
        u8::from(self) == 0
    }
}

/// Bitfield representation of the `DATA_FORMAT` register (address `0x31`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFormat {
    // g-range (bits 1:0).
    pub range: Range,
    // Left-justified (MSB) output when set (bit 2).
    pub justify: bool,
    // Full resolution, 3.9 mg/LSB at every range (bit 3).
    pub full_res: bool,
    #[skip]
    __: B1,
    // Interrupts active low (bit 5).
    pub int_invert: bool,
    // 3-wire SPI (bit 6).
    pub spi_3wire: bool,
    // Self-test force (bit 7).
    pub self_test: bool,
}

byte_register!(DataFormat, REG_DATA_FORMAT, RW, 0x00);

/// Bitfield representation of the `FIFO_CTL` register (address `0x38`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoCtl {
    // Watermark / trigger depth (bits 4:0).
    pub samples: B5,
    // Pin carrying the trigger event (bit 5).
    pub trigger: InterruptPin,
    // FIFO mode (bits 7:6).
    pub mode: FifoMode,
}

byte_register!(FifoCtl, REG_FIFO_CTL, RW, 0x00);

/// Bitfield representation of the `FIFO_STATUS` register (address `0x39`).
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoStatus {
    // Number of samples stored in the FIFO (bits 5:0).
    pub entries: B6,
    #[skip]
    __: B1,
    // A trigger event occurred (bit 7).
    pub triggered: bool,
}

byte_register!(FifoStatus, REG_FIFO_STATUS, R, 0x00);
