//! US EPA PM2.5 breakpoint table and the piecewise-linear conversion.
//!
//! See the EPA "Technical Assistance Document for the Reporting of Daily Air
//! Quality" (2024 revision) for the published table.

use serde::Serialize;

use crate::error::{ConversionError, ConversionResult};
use crate::types::AqiCategory;

/// One row of the breakpoint table.
///
/// A concentration belongs to the first row whose `pm_high` it does not
/// exceed, so shared boundary points fall in the lower interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakpoint {
    /// Low end of the concentration range (µg/m³)
    pub pm_low: f64,
    /// High end of the concentration range (µg/m³), inclusive
    pub pm_high: f64,
    /// AQI at `pm_low`
    pub aqi_low: i32,
    /// AQI at `pm_high`
    pub aqi_high: i32,
}

impl Breakpoint {
    pub const fn new(pm_low: f64, pm_high: f64, aqi_low: i32, aqi_high: i32) -> Self {
        Self {
            pm_low,
            pm_high,
            aqi_low,
            aqi_high,
        }
    }

    /// Returns true if `pm25` is at or below this row's upper bound.
    #[inline]
    pub fn covers(&self, pm25: f64) -> bool {
        pm25 <= self.pm_high
    }

    /// Linear interpolation across this row, before rounding.
    #[inline]
    pub fn interpolate(&self, pm25: f64) -> f64 {
        let slope = f64::from(self.aqi_high - self.aqi_low) / (self.pm_high - self.pm_low);
        slope * (pm25 - self.pm_low) + f64::from(self.aqi_low)
    }
}

/// The fixed PM2.5 table.
///
/// Lower bounds after the first row sit 0.1 above the previous upper bound,
/// so the table is contiguous at the one-decimal resolution inputs are
/// rounded to. The last row is open-ended: concentrations above 500.0 still
/// use its slope.
pub const PM25_BREAKPOINTS: [Breakpoint; 6] = [
    Breakpoint::new(0.0, 9.0, 0, 50),
    Breakpoint::new(9.1, 35.4, 51, 100),
    Breakpoint::new(35.5, 55.4, 101, 150),
    Breakpoint::new(55.5, 125.4, 151, 200),
    Breakpoint::new(125.5, 225.4, 201, 300),
    Breakpoint::new(225.5, 500.0, 301, 500),
];

/// Result of a conversion with the details the plain [`convert`] drops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AqiConversion {
    /// Computed index
    pub aqi: i32,
    /// Concentration after rounding to one decimal place
    pub pm25: f64,
    /// Health band for `aqi`
    pub category: AqiCategory,
    /// True when the concentration is above the table ceiling and the
    /// result was extrapolated from the final row (may exceed 500).
    pub saturated: bool,
}

/// Round half-up to one decimal place.
#[inline]
pub fn round_to_tenth(pm25: f64) -> f64 {
    (pm25 * 10.0).round() / 10.0
}

/// Round an interpolated value to the nearest index.
///
/// Extrapolations past `i32::MAX` (inputs above roughly 3e9 µg/m³) saturate
/// at `i32::MAX`; the result stays monotonic.
fn to_index(raw: f64) -> i32 {
    let raw = raw.round();
    if raw >= f64::from(i32::MAX) {
        i32::MAX
    } else {
        raw as i32
    }
}

/// Convert a PM2.5 concentration to an AQI value.
pub fn convert(pm25: f64) -> ConversionResult<i32> {
    convert_detailed(pm25).map(|c| c.aqi)
}

/// Convert a PM2.5 concentration, reporting category and saturation.
///
/// Values above the top of the table are not clamped to 500; the final
/// row's formula is applied and `saturated` is set. Only results beyond
/// `i32::MAX` are capped there.
pub fn convert_detailed(pm25: f64) -> ConversionResult<AqiConversion> {
    if !pm25.is_finite() || pm25 < 0.0 {
        return Err(ConversionError::OutOfDomain(pm25));
    }

    let rounded = match round_to_tenth(pm25) {
        // normalize -0.0
        r if r == 0.0 => 0.0,
        r => r,
    };
    let top = PM25_BREAKPOINTS[PM25_BREAKPOINTS.len() - 1];
    let (row, saturated) = match PM25_BREAKPOINTS.iter().find(|bp| bp.covers(rounded)) {
        Some(bp) => (*bp, false),
        None => (top, true),
    };

    let aqi = to_index(row.interpolate(rounded));

    Ok(AqiConversion {
        aqi,
        pm25: rounded,
        category: AqiCategory::from_aqi(aqi),
        saturated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_well_formed() {
        for bp in PM25_BREAKPOINTS.iter() {
            assert!(bp.pm_low < bp.pm_high);
            assert!(bp.aqi_low < bp.aqi_high);
        }
        for pair in PM25_BREAKPOINTS.windows(2) {
            assert!(pair[0].pm_high < pair[1].pm_low);
            assert!(pair[0].aqi_high < pair[1].aqi_low);
            assert!((pair[1].pm_low - pair[0].pm_high - 0.1).abs() < 1e-9);
            assert_eq!(pair[1].aqi_low, pair[0].aqi_high + 1);
        }
    }

    #[test]
    fn test_boundaries() {
        let cases = [
            (0.0, 0),
            (9.0, 50),
            (9.1, 51),
            (35.4, 100),
            (35.5, 101),
            (55.4, 150),
            (55.5, 151),
            (125.4, 200),
            (125.5, 201),
            (225.4, 300),
            (225.5, 301),
            (500.0, 500),
        ];
        for (pm, expected) in cases {
            assert_eq!(convert(pm).unwrap(), expected, "pm2.5 = {pm}");
        }
    }

    #[test]
    fn test_input_is_rounded_to_tenth() {
        assert_eq!(round_to_tenth(12.04), 12.0);
        assert_eq!(round_to_tenth(12.05), 12.1);
        assert_eq!(convert(9.04).unwrap(), 50);
        assert_eq!(convert(35.44).unwrap(), 100);
        assert_eq!(convert_detailed(12.04).unwrap().pm25, 12.0);
    }

    #[test]
    fn test_mid_range_value() {
        assert_eq!(convert(12.0).unwrap(), 56);
        assert_eq!(convert(100.0).unwrap(), 182);
    }

    #[test]
    fn test_above_table_is_extrapolated() {
        let detail = convert_detailed(600.0).unwrap();
        assert_eq!(detail.aqi, 572);
        assert!(detail.saturated);
        assert_eq!(detail.category, AqiCategory::Hazardous);

        let at_ceiling = convert_detailed(500.0).unwrap();
        assert!(!at_ceiling.saturated);
    }

    #[test]
    fn test_huge_values_cap_at_i32_max() {
        let detail = convert_detailed(1e300).unwrap();
        assert_eq!(detail.aqi, i32::MAX);
        assert!(detail.saturated);
        assert_eq!(detail.category, AqiCategory::Hazardous);

        let below = convert(1e6).unwrap();
        assert!(below > 500 && below < i32::MAX);
        assert!(convert(1e12).unwrap() >= below);
    }

    #[test]
    fn test_negative_is_out_of_domain() {
        assert_eq!(convert(-1.0), Err(ConversionError::OutOfDomain(-1.0)));
        assert!(convert(-0.01).is_err());
    }

    #[test]
    fn test_non_finite_is_out_of_domain() {
        assert!(matches!(
            convert(f64::NAN),
            Err(ConversionError::OutOfDomain(_))
        ));
        assert!(convert(f64::INFINITY).is_err());
    }

    #[test]
    fn test_negative_zero_after_rounding() {
        let detail = convert_detailed(-0.0).unwrap();
        assert_eq!(detail.aqi, 0);
        assert!(detail.pm25.is_sign_positive());
    }
}
