//! Utilization, cost and completeness figures for a chosen solution, and the
//! insight categories derived from them.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::optimizer::{OptimizationOutcome, Solution};

/// Thresholds that turn metrics into insights.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InsightThresholds {
    /// Cost per cubic foot below which efficiency is excellent.
    pub excellent_cost_efficiency: f64,
    /// Cost per cubic foot above which larger trucks should be considered.
    pub poor_cost_efficiency: f64,
    /// Utilization percentage above which utilization is excellent.
    pub excellent_utilization: f64,
    /// Utilization percentage below which smaller trucks should be considered.
    pub low_utilization: f64,
}

impl InsightThresholds {
    pub const DEFAULT_EXCELLENT_COST_EFFICIENCY: f64 = 100.0;
    pub const DEFAULT_POOR_COST_EFFICIENCY: f64 = 300.0;
    pub const DEFAULT_EXCELLENT_UTILIZATION: f64 = 80.0;
    pub const DEFAULT_LOW_UTILIZATION: f64 = 50.0;
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            excellent_cost_efficiency: Self::DEFAULT_EXCELLENT_COST_EFFICIENCY,
            poor_cost_efficiency: Self::DEFAULT_POOR_COST_EFFICIENCY,
            excellent_utilization: Self::DEFAULT_EXCELLENT_UTILIZATION,
            low_utilization: Self::DEFAULT_LOW_UTILIZATION,
        }
    }
}

/// A classified observation about a solution.
#[derive(Clone, Debug, PartialEq)]
pub enum Insight {
    ExcellentCostEfficiency,
    ConsiderLargerTrucks,
    ExcellentUtilization,
    LowUtilization,
    AllCargoShippable,
    PartiallyUnshippable { unshippable_percent: f64 },
}

impl Insight {
    pub fn code(&self) -> &'static str {
        match self {
            Insight::ExcellentCostEfficiency => "excellent_cost_efficiency",
            Insight::ConsiderLargerTrucks => "consider_larger_trucks",
            Insight::ExcellentUtilization => "excellent_utilization",
            Insight::LowUtilization => "low_utilization",
            Insight::AllCargoShippable => "all_cargo_shippable",
            Insight::PartiallyUnshippable { .. } => "partially_unshippable",
        }
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insight::ExcellentCostEfficiency => write!(f, "Excellent cost efficiency"),
            Insight::ConsiderLargerTrucks => {
                write!(f, "High cost per cubic foot, consider larger trucks")
            }
            Insight::ExcellentUtilization => write!(f, "Excellent space utilization"),
            Insight::LowUtilization => write!(f, "Low utilization, consider smaller trucks"),
            Insight::AllCargoShippable => write!(f, "All cargo can be shipped"),
            Insight::PartiallyUnshippable {
                unshippable_percent,
            } => write!(f, "{:.1}% of the cargo cannot be shipped", unshippable_percent),
        }
    }
}

/// Serializable form of an `Insight`.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct InsightNote {
    pub code: String,
    pub message: String,
}

impl From<&Insight> for InsightNote {
    fn from(insight: &Insight) -> Self {
        Self {
            code: insight.code().to_string(),
            message: insight.to_string(),
        }
    }
}

/// Figures describing one solution.
#[derive(Clone, Debug, PartialEq)]
pub struct SolutionMetrics {
    /// Requested cargo volume over deployed truck volume, in percent.
    pub utilization_rate: f64,
    /// Total cost per cubic foot of deployed truck volume.
    pub cost_efficiency: f64,
    /// Shipped boxes over requested boxes, in percent.
    pub shipping_completeness: f64,
    pub shipped_count: u64,
    pub requested_count: u64,
    pub insights: Vec<Insight>,
}

impl SolutionMetrics {
    /// Computes metrics for `solution`.
    ///
    /// # Parameters
    /// * `solution` - The solution to describe
    /// * `total_box_volume` - Requested cargo volume in cubic feet
    /// * `requested_count` - Number of boxes requested across all categories
    /// * `thresholds` - Insight thresholds
    pub fn evaluate(
        solution: &Solution,
        total_box_volume: f64,
        requested_count: u64,
        thresholds: &InsightThresholds,
    ) -> Self {
        let used_volume = solution.capacity_volume();
        let (utilization_rate, cost_efficiency) = if used_volume > 0.0 {
            (
                total_box_volume / used_volume * 100.0,
                solution.total_cost() / used_volume,
            )
        } else {
            (0.0, 0.0)
        };

        let unshipped: u64 = solution
            .unshipped_boxes()
            .iter()
            .map(|b| u64::from(b.quantity))
            .sum();
        let shipped_count = requested_count.saturating_sub(unshipped);
        let shipping_completeness = if requested_count > 0 {
            shipped_count as f64 / requested_count as f64 * 100.0
        } else {
            100.0
        };

        let mut insights = Vec::new();
        if used_volume > 0.0 {
            if cost_efficiency < thresholds.excellent_cost_efficiency {
                insights.push(Insight::ExcellentCostEfficiency);
            } else if cost_efficiency > thresholds.poor_cost_efficiency {
                insights.push(Insight::ConsiderLargerTrucks);
            }

            if utilization_rate > thresholds.excellent_utilization {
                insights.push(Insight::ExcellentUtilization);
            } else if utilization_rate < thresholds.low_utilization {
                insights.push(Insight::LowUtilization);
            }
        }

        if shipped_count == requested_count {
            insights.push(Insight::AllCargoShippable);
        } else {
            insights.push(Insight::PartiallyUnshippable {
                unshippable_percent: 100.0 - shipping_completeness,
            });
        }

        Self {
            utilization_rate,
            cost_efficiency,
            shipping_completeness,
            shipped_count,
            requested_count,
            insights,
        }
    }
}

/// Metrics for the recommended solution of `outcome`, if there is one.
pub fn evaluate_recommendation(
    outcome: &OptimizationOutcome,
    thresholds: &InsightThresholds,
) -> Option<SolutionMetrics> {
    outcome.recommendation.as_ref().map(|best| {
        SolutionMetrics::evaluate(
            best,
            outcome.total_box_volume,
            outcome.total_box_count,
            thresholds,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoxType, TruckType};
    use crate::optimizer::optimize;
    use crate::types::Dims;
    use crate::units::LengthUnit;

    fn run(
        truck_dims: (f64, f64, f64),
        price: f64,
        available: Option<u32>,
        qty: u32,
    ) -> OptimizationOutcome {
        let mut truck =
            TruckType::new("T", Dims::from(truck_dims), LengthUnit::Feet, price).unwrap();
        if let Some(n) = available {
            truck = truck.with_available(n).unwrap();
        }
        let boxes =
            vec![BoxType::new("Crate", Dims::new(2.0, 2.0, 2.0), LengthUnit::Feet, qty).unwrap()];
        optimize(&[truck], &boxes)
    }

    #[test]
    fn full_truck_is_excellent_on_every_axis() {
        let outcome = run((10.0, 6.0, 6.0), 18000.0, None, 45);
        let metrics = evaluate_recommendation(&outcome, &InsightThresholds::default()).unwrap();

        assert!((metrics.utilization_rate - 100.0).abs() < 1e-9);
        assert!((metrics.cost_efficiency - 50.0).abs() < 1e-9);
        assert_eq!(metrics.shipping_completeness, 100.0);
        assert_eq!(
            metrics.insights,
            vec![
                Insight::ExcellentCostEfficiency,
                Insight::ExcellentUtilization,
                Insight::AllCargoShippable
            ]
        );
    }

    #[test]
    fn expensive_half_empty_truck_suggests_changes() {
        // 5 crates = 40 ft3 in a 360 ft3 truck costing 360000.
        let outcome = run((10.0, 6.0, 6.0), 360000.0, None, 5);
        let metrics = evaluate_recommendation(&outcome, &InsightThresholds::default()).unwrap();

        assert!((metrics.cost_efficiency - 1000.0).abs() < 1e-9);
        assert!(metrics.insights.contains(&Insight::ConsiderLargerTrucks));
        assert!(metrics.insights.contains(&Insight::LowUtilization));
    }

    #[test]
    fn middle_band_produces_no_cost_or_utilization_insight() {
        // 30 crates = 240 ft3 of 360 ft3 (66.7 %), 200 per ft3.
        let outcome = run((10.0, 6.0, 6.0), 72000.0, None, 30);
        let metrics = evaluate_recommendation(&outcome, &InsightThresholds::default()).unwrap();
        assert_eq!(metrics.insights, vec![Insight::AllCargoShippable]);
    }

    #[test]
    fn reports_unshippable_share() {
        let outcome = run((10.0, 6.0, 6.0), 20000.0, Some(1), 50);
        let metrics = evaluate_recommendation(&outcome, &InsightThresholds::default()).unwrap();

        assert_eq!(metrics.shipped_count, 45);
        assert!((metrics.shipping_completeness - 90.0).abs() < 1e-9);
        let last = metrics.insights.last().unwrap();
        assert_eq!(last.code(), "partially_unshippable");
        assert_eq!(last.to_string(), "10.0% of the cargo cannot be shipped");
    }

    #[test]
    fn thresholds_are_configurable() {
        let outcome = run((10.0, 6.0, 6.0), 72000.0, None, 30);
        let strict = InsightThresholds {
            excellent_cost_efficiency: 250.0,
            low_utilization: 70.0,
            ..InsightThresholds::default()
        };
        let metrics = evaluate_recommendation(&outcome, &strict).unwrap();
        assert!(metrics.insights.contains(&Insight::ExcellentCostEfficiency));
        assert!(metrics.insights.contains(&Insight::LowUtilization));
    }

    #[test]
    fn no_recommendation_means_no_metrics() {
        let outcome = run((1.0, 1.0, 1.0), 10.0, None, 5);
        assert!(evaluate_recommendation(&outcome, &InsightThresholds::default()).is_none());
    }

    #[test]
    fn insight_note_carries_code_and_message() {
        let note = InsightNote::from(&Insight::LowUtilization);
        assert_eq!(note.code, "low_utilization");
        assert_eq!(note.message, "Low utilization, consider smaller trucks");
    }
}
