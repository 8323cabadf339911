//! Length units and conversion to feet.
//!
//! All engine calculations run in feet and cubic feet. Values are converted
//! once at the boundary and never rounded here; rounding is a display concern.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Unit token that could not be recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid unit '{0}', expected one of ft, m, cm, in")]
pub struct InvalidUnit(pub String);

/// Supported linear units.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum LengthUnit {
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "cm")]
    Centimeters,
    #[serde(rename = "in")]
    Inches,
}

impl LengthUnit {
    /// Multiplier that converts one of this unit into feet.
    pub const fn feet_factor(self) -> f64 {
        match self {
            LengthUnit::Feet => 1.0,
            LengthUnit::Meters => 3.28084,
            LengthUnit::Centimeters => 0.0328084,
            LengthUnit::Inches => 0.0833333,
        }
    }

    /// Short token used in requests and responses.
    pub const fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Feet => "ft",
            LengthUnit::Meters => "m",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Inches => "in",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for LengthUnit {
    type Err = InvalidUnit;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ft" | "feet" | "foot" => Ok(LengthUnit::Feet),
            "m" | "meters" | "meter" | "metres" | "metre" => Ok(LengthUnit::Meters),
            "cm" | "centimeters" | "centimeter" | "centimetres" | "centimetre" => {
                Ok(LengthUnit::Centimeters)
            }
            "in" | "inches" | "inch" => Ok(LengthUnit::Inches),
            _ => Err(InvalidUnit(raw.to_string())),
        }
    }
}

/// Converts a length into feet.
#[inline]
pub fn to_feet(value: f64, unit: LengthUnit) -> f64 {
    value * unit.feet_factor()
}

/// Converts a length in feet into `unit`.
#[inline]
pub fn from_feet(value: f64, unit: LengthUnit) -> f64 {
    value / unit.feet_factor()
}

/// Converts a length between two units, going through feet.
pub fn convert(value: f64, from: LengthUnit, to: LengthUnit) -> f64 {
    if from == to {
        return value;
    }
    from_feet(to_feet(value, from), to)
}

/// Volume in cubic feet of a cuboid given in `unit`.
///
/// # Parameters
/// * `length`, `width`, `height` - Edge lengths in `unit`
/// * `unit` - Unit of all three edges
pub fn volume_cubic_feet(length: f64, width: f64, height: f64, unit: LengthUnit) -> f64 {
    to_feet(length, unit) * to_feet(width, unit) * to_feet(height, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn converts_with_fixed_factors() {
        assert!((to_feet(10.0, LengthUnit::Feet) - 10.0).abs() < EPS);
        assert!((to_feet(1.0, LengthUnit::Meters) - 3.28084).abs() < EPS);
        assert!((to_feet(100.0, LengthUnit::Centimeters) - 3.28084).abs() < EPS);
        assert!((to_feet(12.0, LengthUnit::Inches) - 0.9999996).abs() < EPS);
    }

    #[test]
    fn from_feet_inverts_to_feet() {
        for unit in [
            LengthUnit::Feet,
            LengthUnit::Meters,
            LengthUnit::Centimeters,
            LengthUnit::Inches,
        ] {
            let back = from_feet(to_feet(7.5, unit), unit);
            assert!((back - 7.5).abs() < 1e-9, "{unit}");
        }
    }

    #[test]
    fn convert_same_unit_is_identity() {
        assert_eq!(convert(3.3, LengthUnit::Meters, LengthUnit::Meters), 3.3);
        let cm = convert(1.0, LengthUnit::Meters, LengthUnit::Centimeters);
        assert!((cm - 100.0).abs() < 1e-6);
    }

    #[test]
    fn volume_is_product_of_converted_edges() {
        assert!((volume_cubic_feet(10.0, 6.0, 6.0, LengthUnit::Feet) - 360.0).abs() < EPS);
        let expected = 3.28084_f64.powi(3);
        assert!((volume_cubic_feet(1.0, 1.0, 1.0, LengthUnit::Meters) - expected).abs() < EPS);
    }

    #[test]
    fn parses_tokens_and_long_names() {
        assert_eq!("ft".parse::<LengthUnit>(), Ok(LengthUnit::Feet));
        assert_eq!(" M ".parse::<LengthUnit>(), Ok(LengthUnit::Meters));
        assert_eq!("centimeters".parse::<LengthUnit>(), Ok(LengthUnit::Centimeters));
        assert_eq!("Inches".parse::<LengthUnit>(), Ok(LengthUnit::Inches));
    }

    #[test]
    fn rejects_unknown_unit_instead_of_defaulting() {
        let err = "yards".parse::<LengthUnit>().unwrap_err();
        assert_eq!(err, InvalidUnit("yards".to_string()));
        assert!(err.to_string().contains("yards"));
    }
}
