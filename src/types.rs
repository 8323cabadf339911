//! Common types and traits for cuboid cargo and cargo space.
//!
//! Dimensions are kept on named axes (length, width, height). Nothing in this
//! crate permutes axes: a box that only fits after turning it does not fit.

use std::ops::Mul;

use serde::Serialize;
use utoipa::ToSchema;

/// Length, width and height of a cuboid.
///
/// # Examples
/// ```
/// use load_it_now::types::Dims;
///
/// let truck = Dims::new(10.0, 6.0, 6.0);
/// let crate_ = Dims::new(2.0, 2.0, 2.0);
/// assert_eq!(truck.volume(), 360.0);
/// assert!(crate_.fits_within(&truck));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct Dims {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dims {
    #[inline]
    pub const fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Product of all three edges.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Axis-for-axis `<=` against `container`, without tolerance and without
    /// trying other orientations.
    #[inline]
    pub fn fits_within(&self, container: &Self) -> bool {
        self.length <= container.length
            && self.width <= container.width
            && self.height <= container.height
    }

    #[inline]
    pub const fn as_tuple(&self) -> (f64, f64, f64) {
        (self.length, self.width, self.height)
    }
}

impl Mul<f64> for Dims {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.length * scalar, self.width * scalar, self.height * scalar)
    }
}

impl From<(f64, f64, f64)> for Dims {
    #[inline]
    fn from(tuple: (f64, f64, f64)) -> Self {
        Self::new(tuple.0, tuple.1, tuple.2)
    }
}

/// Objects with a spatial extent expressed in feet.
pub trait Dimensional {
    /// Dimensions converted to feet.
    fn dimensions_ft(&self) -> Dims;

    /// Volume in cubic feet.
    fn volume_cubic_feet(&self) -> f64 {
        self.dimensions_ft().volume()
    }

    /// Checks whether this object fits into `container` in its given orientation.
    fn fits_in(&self, container: &impl Dimensional) -> bool {
        self.dimensions_ft().fits_within(&container.dimensions_ft())
    }
}

/// Objects that cost money to deploy.
pub trait Priced {
    /// Price of deploying one instance.
    fn price(&self) -> f64;
}

/// Shared validation helpers.
pub mod validation {
    /// Validates a single dimension.
    ///
    /// # Returns
    /// `Ok(())` for positive finite values, otherwise error text
    pub fn validate_dimension(value: f64, name: &str) -> Result<(), String> {
        if value.is_nan() {
            return Err(format!("{} must not be NaN", name));
        }
        if value.is_infinite() {
            return Err(format!("{} must not be infinite", name));
        }
        if value <= 0.0 {
            return Err(format!("{} must be positive, got: {}", name, value));
        }
        Ok(())
    }

    /// Validates a price.
    pub fn validate_price(value: f64) -> Result<(), String> {
        if !value.is_finite() || value <= 0.0 {
            return Err(format!("Price must be a positive number, got: {}", value));
        }
        Ok(())
    }

    /// Validates all three edges of a cuboid.
    pub fn validate_dimensions_3d(dims: (f64, f64, f64)) -> Result<(), String> {
        validate_dimension(dims.0, "Length")?;
        validate_dimension(dims.1, "Width")?;
        validate_dimension(dims.2, "Height")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dims_volume_and_scale() {
        let dims = Dims::new(10.0, 6.0, 6.0);
        assert!((dims.volume() - 360.0).abs() < 1e-12);
        assert_eq!(dims * 0.5, Dims::new(5.0, 3.0, 3.0));
    }

    #[test]
    fn test_fits_within_is_per_axis() {
        let truck = Dims::new(10.0, 6.0, 6.0);
        assert!(Dims::new(10.0, 6.0, 6.0).fits_within(&truck));
        assert!(!Dims::new(12.0, 2.0, 2.0).fits_within(&truck));
        assert!(!Dims::new(2.0, 2.0, 6.5).fits_within(&truck));
    }

    #[test]
    fn test_fits_within_does_not_rotate() {
        let truck = Dims::new(10.0, 6.0, 6.0);
        // Would fit lying down along the length axis.
        let standing = Dims::new(2.0, 2.0, 8.0);
        assert!(!standing.fits_within(&truck));
        assert!(Dims::new(8.0, 2.0, 2.0).fits_within(&truck));
    }

    #[test]
    fn test_validation_dimension() {
        assert!(validation::validate_dimension(10.0, "Width").is_ok());
        assert!(validation::validate_dimension(0.0, "Width").is_err());
        assert!(validation::validate_dimension(-1.0, "Width").is_err());
        assert!(validation::validate_dimension(f64::NAN, "Width").is_err());
        assert!(validation::validate_dimension(f64::INFINITY, "Width").is_err());
    }

    #[test]
    fn test_validation_price() {
        assert!(validation::validate_price(20000.0).is_ok());
        assert!(validation::validate_price(0.0).is_err());
        assert!(validation::validate_price(f64::NAN).is_err());
    }
}
