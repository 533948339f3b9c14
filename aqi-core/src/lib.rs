//! # aqi-core — PM2.5 to Air Quality Index
//!
//! Converts a particulate-matter concentration (PM2.5, µg/m³) into the
//! US EPA Air Quality Index using the piecewise-linear breakpoint formula:
//!
//! ```text
//! aqi = round((aqi_high - aqi_low) / (pm_high - pm_low) * (pm - pm_low) + aqi_low)
//! ```
//!
//! The concentration is first rounded to one decimal place, the resolution
//! of the published table.
//!
//! ## Example
//!
//! ```rust
//! use aqi_core::{convert, convert_detailed, AqiCategory};
//!
//! assert_eq!(convert(12.0).unwrap(), 56);
//!
//! let detail = convert_detailed(35.5).unwrap();
//! assert_eq!(detail.aqi, 101);
//! assert_eq!(detail.category, AqiCategory::UnhealthyForSensitiveGroups);
//! assert!(!detail.saturated);
//! ```
//!
//! ## Modules
//!
//! - [`breakpoint`] - Breakpoint table and conversion
//! - [`types`] - Sensor readings and AQI categories
//! - [`error`] - Error handling

pub mod breakpoint;
pub mod error;
pub mod types;

pub use breakpoint::{
    AqiConversion, Breakpoint, PM25_BREAKPOINTS, convert, convert_detailed, round_to_tenth,
};
pub use error::{ConversionError, ConversionResult};
pub use types::{AqiCategory, SensorReading};

#[cfg(test)]
mod tests;
