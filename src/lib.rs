//! `#![no_std]` driver for the Analog Devices ADXL345 3-axis digital accelerometer.
//!
//! The driver talks to the sensor through any `embedded-hal` 1.0 I2C bus or SPI
//! device. Constructing a driver never touches the bus; call
//! [`Adxl345::init`] to program the sensor and [`Adxl345::read_sample`] to
//! acquire acceleration data.
//!
//! ```rust,ignore
//! use adxl345::{Adxl345, config::Config, registers::SlaveAddr};
//!
//! let mut accel = Adxl345::new_i2c(i2c, SlaveAddr::Default);
//! accel.init(&mut delay)?;
//! let sample = accel.read_sample()?;
//! ```
#![cfg_attr(not(test), no_std)]

mod error;

pub mod config;
pub mod device;
pub mod events;
pub mod fifo;
pub mod interface;
mod log;
pub mod params;
pub mod registers;
pub mod sample;
pub mod self_test;

pub use crate::device::Adxl345;
pub use crate::error::{Error, Result};
pub use crate::sample::Sample;
