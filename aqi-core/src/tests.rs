//! Crate-level properties of the converter

use crate::*;

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES OVER THE WHOLE DOMAIN
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_convert_is_monotonic_and_non_negative() {
    let mut previous = 0;
    for tenth in 0..=10_000 {
        let pm = f64::from(tenth) / 10.0;
        let aqi = convert(pm).unwrap();
        assert!(aqi >= 0, "negative AQI {aqi} for pm2.5 = {pm}");
        assert!(aqi >= previous, "AQI decreased at pm2.5 = {pm}: {previous} -> {aqi}");
        previous = aqi;
    }
}

#[test]
fn test_convert_is_monotonic_between_tenths() {
    let mut previous = 0;
    for hundredth in 0..=60_000 {
        let pm = f64::from(hundredth) / 100.0;
        let aqi = convert(pm).unwrap();
        assert!(aqi >= previous, "AQI decreased at pm2.5 = {pm}");
        previous = aqi;
    }
}

#[test]
fn test_convert_is_idempotent() {
    for pm in [0.0, 4.2, 12.0, 35.45, 88.8, 225.5, 499.9, 612.3] {
        assert_eq!(convert(pm), convert(pm));
        assert_eq!(convert_detailed(pm), convert_detailed(pm));
    }
}

#[test]
fn test_saturation_only_above_table() {
    for tenth in 0..=5_000 {
        let pm = f64::from(tenth) / 10.0;
        let detail = convert_detailed(pm).unwrap();
        assert!(!detail.saturated, "pm2.5 = {pm} flagged saturated");
        assert!(detail.aqi <= 500);
    }
    assert!(convert_detailed(500.1).unwrap().saturated);
}

#[test]
fn test_category_matches_aqi() {
    let detail = convert_detailed(12.0).unwrap();
    assert_eq!(detail.category, AqiCategory::Moderate);
    assert_eq!(detail.category, AqiCategory::from_aqi(detail.aqi));
}

#[test]
fn test_conversion_serializes() {
    let detail = convert_detailed(600.0).unwrap();
    let json = serde_json::to_value(detail).unwrap();
    assert_eq!(json["aqi"], 572);
    assert_eq!(json["saturated"], true);
    assert_eq!(json["category"], "hazardous");
}
