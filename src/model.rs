//! Data models for the truck loading engine.
//!
//! This module defines the records the optimizer works on:
//! - `TruckType`: a vehicle category with dimensions, price and fleet limits
//! - `BoxType`: a cargo category with dimensions and a quantity to ship
//! - `Inventory`: the owned, per-run list of remaining boxes per category
//!
//! Records are validated on construction; the optimizer assumes valid input.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{Dimensional, Dims, Priced, validation};
use crate::units::{LengthUnit, to_feet};

/// Validation error for truck and box data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid available count: {0}")]
    InvalidAvailableCount(String),
    #[error("Missing constraint value for constraint truck '{0}'")]
    MissingConstraintValue(String),
}

fn validate_name(name: &str, kind: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidName(format!(
            "{} name must not be empty",
            kind
        )));
    }
    Ok(())
}

fn validate_dims(name: &str, dims: Dims) -> Result<(), ValidationError> {
    validation::validate_dimensions_3d(dims.as_tuple())
        .map_err(|msg| ValidationError::InvalidDimension(format!("{}: {}", name, msg)))
}

/// A truck category.
///
/// `available` caps how many trucks of this type a flexible allocation may use.
/// `fixed_count` turns the type into a constraint truck: exactly that many are
/// deployed and paid for, whatever they end up carrying.
#[derive(Clone, Debug, PartialEq)]
pub struct TruckType {
    pub name: String,
    pub dims: Dims,
    pub unit: LengthUnit,
    pub price: f64,
    pub available: Option<u32>,
    pub fixed_count: Option<u32>,
}

impl TruckType {
    /// Creates a flexible truck type with validation.
    ///
    /// # Examples
    /// ```
    /// use load_it_now::model::TruckType;
    /// use load_it_now::types::Dims;
    /// use load_it_now::units::LengthUnit;
    ///
    /// let ok = TruckType::new("Tata 407", Dims::new(10.0, 6.0, 6.0), LengthUnit::Feet, 20000.0);
    /// assert!(ok.is_ok());
    ///
    /// let bad = TruckType::new("Tata 407", Dims::new(10.0, 6.0, 6.0), LengthUnit::Feet, 0.0);
    /// assert!(bad.is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        dims: Dims,
        unit: LengthUnit,
        price: f64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name(&name, "Truck")?;
        validate_dims(&name, dims)?;
        validation::validate_price(price)
            .map_err(|msg| ValidationError::InvalidPrice(format!("{}: {}", name, msg)))?;
        Ok(Self {
            name,
            dims,
            unit,
            price,
            available: None,
            fixed_count: None,
        })
    }

    /// Caps the number of trucks of this type.
    pub fn with_available(mut self, available: u32) -> Result<Self, ValidationError> {
        if available == 0 {
            return Err(ValidationError::InvalidAvailableCount(format!(
                "{}: available count must be positive",
                self.name
            )));
        }
        self.available = Some(available);
        Ok(self)
    }

    /// Fixes the exact number of trucks of this type. Zero is allowed and
    /// removes the type from both the constraint and the flexible fleet.
    pub fn with_fixed_count(mut self, count: u32) -> Self {
        self.fixed_count = Some(count);
        self
    }

    /// True when the count of this type is fixed by the caller.
    pub fn is_constraint(&self) -> bool {
        self.fixed_count.is_some()
    }

    /// Cap used by a flexible allocation of this type.
    pub fn max_trucks(&self, unbounded_cap: u32) -> u32 {
        self.available.unwrap_or(unbounded_cap)
    }
}

impl Dimensional for TruckType {
    fn dimensions_ft(&self) -> Dims {
        self.dims * to_feet(1.0, self.unit)
    }
}

impl Priced for TruckType {
    fn price(&self) -> f64 {
        self.price
    }
}

/// A cargo category.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxType {
    pub name: String,
    pub dims: Dims,
    pub unit: LengthUnit,
    pub quantity: u32,
}

impl BoxType {
    /// Creates a cargo category with validation.
    pub fn new(
        name: impl Into<String>,
        dims: Dims,
        unit: LengthUnit,
        quantity: u32,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name(&name, "Box")?;
        validate_dims(&name, dims)?;
        if quantity == 0 {
            return Err(ValidationError::InvalidQuantity(format!(
                "{}: quantity must be positive",
                name
            )));
        }
        Ok(Self {
            name,
            dims,
            unit,
            quantity,
        })
    }
}

impl Dimensional for BoxType {
    fn dimensions_ft(&self) -> Dims {
        self.dims * to_feet(1.0, self.unit)
    }
}

/// Checks whether a box fits a truck in its given orientation.
pub fn fits(cargo: &impl Dimensional, truck: &TruckType) -> bool {
    cargo.fits_in(truck)
}

/// One cargo category inside an `Inventory`.
#[derive(Clone, Debug, PartialEq)]
pub struct InventoryEntry {
    pub name: String,
    pub dims_ft: Dims,
    pub unit_volume: f64,
    pub quantity: u32,
    pub remaining: u32,
}

impl Dimensional for InventoryEntry {
    fn dimensions_ft(&self) -> Dims {
        self.dims_ft
    }
}

/// Boxes still waiting for a truck, in declaration order.
///
/// Each allocation step takes the inventory by value and hands back the
/// updated one, so candidates computed from the same starting point are
/// independent of each other.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn from_boxes(boxes: &[BoxType]) -> Self {
        let entries = boxes
            .iter()
            .map(|b| {
                let dims_ft = b.dimensions_ft();
                InventoryEntry {
                    name: b.name.clone(),
                    dims_ft,
                    unit_volume: dims_ft.volume(),
                    quantity: b.quantity,
                    remaining: b.quantity,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [InventoryEntry] {
        &mut self.entries
    }

    /// True once every category has been fully allocated.
    pub fn is_exhausted(&self) -> bool {
        self.entries.iter().all(|e| e.remaining == 0)
    }

    pub fn total_remaining(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.remaining)).sum()
    }

    pub fn total_requested(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    /// Requested cargo volume in cubic feet.
    pub fn total_volume(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.unit_volume * f64::from(e.quantity))
            .sum()
    }

    /// Categories with boxes left over, in declaration order.
    pub fn unshipped(&self) -> Vec<UnshippedBox> {
        self.entries
            .iter()
            .filter(|e| e.remaining > 0)
            .map(|e| UnshippedBox {
                name: e.name.clone(),
                quantity: e.remaining,
            })
            .collect()
    }
}

/// Boxes of one category that no truck in a solution carries.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct UnshippedBox {
    pub name: String,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truck(dims: (f64, f64, f64), unit: LengthUnit) -> TruckType {
        TruckType::new("T", Dims::from(dims), unit, 100.0).unwrap()
    }

    fn cargo(dims: (f64, f64, f64), unit: LengthUnit, qty: u32) -> BoxType {
        BoxType::new("B", Dims::from(dims), unit, qty).unwrap()
    }

    #[test]
    fn truck_volume_is_in_cubic_feet() {
        let t = truck((10.0, 6.0, 6.0), LengthUnit::Feet);
        assert!((t.volume_cubic_feet() - 360.0).abs() < 1e-9);

        let m = truck((1.0, 1.0, 1.0), LengthUnit::Meters);
        assert!((m.volume_cubic_feet() - 3.28084_f64.powi(3)).abs() < 1e-9);
    }

    #[test]
    fn fits_compares_across_units() {
        let t = truck((10.0, 6.0, 6.0), LengthUnit::Feet);
        assert!(fits(&cargo((24.0, 24.0, 24.0), LengthUnit::Inches, 1), &t));
        assert!(!fits(&cargo((12.0, 2.0, 2.0), LengthUnit::Feet, 1), &t));
        assert!(!fits(&cargo((2.0, 2.0, 2.0), LengthUnit::Meters, 1), &t));
    }

    #[test]
    fn rejects_invalid_records() {
        assert!(matches!(
            TruckType::new(" ", Dims::new(1.0, 1.0, 1.0), LengthUnit::Feet, 1.0),
            Err(ValidationError::InvalidName(_))
        ));
        assert!(matches!(
            TruckType::new("T", Dims::new(1.0, -1.0, 1.0), LengthUnit::Feet, 1.0),
            Err(ValidationError::InvalidDimension(_))
        ));
        assert!(matches!(
            TruckType::new("T", Dims::new(1.0, 1.0, 1.0), LengthUnit::Feet, -5.0),
            Err(ValidationError::InvalidPrice(_))
        ));
        assert!(matches!(
            BoxType::new("B", Dims::new(1.0, 1.0, 1.0), LengthUnit::Inches, 0),
            Err(ValidationError::InvalidQuantity(_))
        ));
        assert!(matches!(
            truck((1.0, 1.0, 1.0), LengthUnit::Feet).with_available(0),
            Err(ValidationError::InvalidAvailableCount(_))
        ));
    }

    #[test]
    fn flexible_cap_falls_back_to_unbounded() {
        let t = truck((1.0, 1.0, 1.0), LengthUnit::Feet);
        assert_eq!(t.max_trucks(999), 999);
        assert_eq!(t.with_available(3).unwrap().max_trucks(999), 3);
    }

    #[test]
    fn inventory_tracks_remaining_per_category() {
        let boxes = vec![
            cargo((2.0, 2.0, 2.0), LengthUnit::Feet, 5),
            BoxType::new("C", Dims::new(1.0, 1.0, 1.0), LengthUnit::Feet, 3).unwrap(),
        ];
        let mut inv = Inventory::from_boxes(&boxes);
        assert_eq!(inv.total_requested(), 8);
        assert!((inv.total_volume() - 43.0).abs() < 1e-9);
        assert!(!inv.is_exhausted());

        inv.entries_mut()[0].remaining = 0;
        assert_eq!(inv.total_remaining(), 3);
        assert_eq!(
            inv.unshipped(),
            vec![UnshippedBox {
                name: "C".to_string(),
                quantity: 3
            }]
        );

        inv.entries_mut()[1].remaining = 0;
        assert!(inv.is_exhausted());
        assert_eq!(inv.total_remaining(), 0);
    }
}
