//! Sensor readings and AQI health categories

use std::fmt;

use serde::{Deserialize, Serialize};

/// A parsed provider reading for one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Provider sensor index
    pub sensor_id: String,

    /// 24-hour average PM2.5 concentration in µg/m³
    pub pm25_24hr_average: f64,

    /// Provider timestamp of the data, as sent
    pub timestamp: String,
}

impl SensorReading {
    pub fn new(sensor_id: impl Into<String>, pm25_24hr_average: f64, timestamp: impl Into<String>) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            pm25_24hr_average,
            timestamp: timestamp.into(),
        }
    }
}

/// EPA health band of an AQI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    /// 0 - 50
    Good,
    /// 51 - 100
    Moderate,
    /// 101 - 150
    UnhealthyForSensitiveGroups,
    /// 151 - 200
    Unhealthy,
    /// 201 - 300
    VeryUnhealthy,
    /// 301 and above
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: i32) -> Self {
        match aqi {
            i32::MIN..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitiveGroups,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    /// Human-readable label as published by AirNow
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
