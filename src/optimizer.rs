//! Allocation and ranking engine for loading boxes onto trucks.
//!
//! A run goes through the following steps:
//! - constraint trucks are filled first, each with exactly its fixed count
//! - every flexible truck type is then tried on its own against what is left
//! - the resulting candidates are ranked (ships everything first, then cheapest)
//!
//! Filling is volume based: a truck takes boxes of a category as long as the box
//! fits the truck axis-for-axis and the remaining cubic feet allow it.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::model::{BoxType, Inventory, TruckType, UnshippedBox, fits};
use crate::types::{Dimensional, Priced};

/// Order in which box categories are offered to a truck being filled.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FillOrder {
    /// Last declared category first.
    #[default]
    Reverse,
    /// First declared category first.
    Declaration,
}

impl FillOrder {
    fn indices(self, len: usize) -> Vec<usize> {
        match self {
            FillOrder::Reverse => (0..len).rev().collect(),
            FillOrder::Declaration => (0..len).collect(),
        }
    }
}

/// Configuration for the loading algorithm.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LoadingConfig {
    /// Cap used for flexible truck types without an available count.
    pub unbounded_truck_cap: u32,
    /// Category order within a single truck.
    pub fill_order: FillOrder,
    /// Added to the free-volume quotient before flooring it.
    pub fit_epsilon: f64,
}

impl LoadingConfig {
    pub const DEFAULT_UNBOUNDED_TRUCK_CAP: u32 = 999;
    pub const DEFAULT_FILL_ORDER: FillOrder = FillOrder::Reverse;
    pub const DEFAULT_FIT_EPSILON: f64 = 1e-9;

    /// Creates a builder for a custom configuration.
    pub fn builder() -> LoadingConfigBuilder {
        LoadingConfigBuilder::default()
    }
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            unbounded_truck_cap: Self::DEFAULT_UNBOUNDED_TRUCK_CAP,
            fill_order: Self::DEFAULT_FILL_ORDER,
            fit_epsilon: Self::DEFAULT_FIT_EPSILON,
        }
    }
}

/// Builder for `LoadingConfig`.
#[derive(Clone, Debug, Default)]
pub struct LoadingConfigBuilder {
    config: LoadingConfig,
}

impl LoadingConfigBuilder {
    pub fn unbounded_truck_cap(mut self, cap: u32) -> Self {
        self.config.unbounded_truck_cap = cap;
        self
    }

    pub fn fill_order(mut self, order: FillOrder) -> Self {
        self.config.fill_order = order;
        self
    }

    pub fn fit_epsilon(mut self, epsilon: f64) -> Self {
        self.config.fit_epsilon = epsilon;
        self
    }

    pub fn build(self) -> LoadingConfig {
        self.config
    }
}

/// Boxes of one category placed in one truck.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct LoadedBox {
    pub name: String,
    pub quantity_in_truck: u32,
    /// Cubic feet taken by these boxes.
    pub volume_used: f64,
}

/// Load of a single truck instance.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct TruckLoad {
    pub truck_type: String,
    /// 1-based number within its truck type.
    pub truck_number: u32,
    pub is_constraint: bool,
    pub boxes: Vec<LoadedBox>,
    pub volume_used: f64,
    pub truck_volume: f64,
    /// `volume_used / truck_volume` in percent.
    pub volume_utilization: f64,
}

/// Outcome of filling trucks of one type.
#[derive(Clone, Debug)]
pub struct FleetLoad {
    pub distribution: Vec<TruckLoad>,
    pub inventory: Inventory,
    pub trucks_used: u32,
    pub total_cost: f64,
    /// Cubic feet of cargo loaded.
    pub cargo_volume: f64,
    /// Cubic feet of every truck used.
    pub capacity_volume: f64,
}

impl FleetLoad {
    pub fn can_ship_all(&self) -> bool {
        self.inventory.is_exhausted()
    }
}

/// Offers every category once to an empty truck and moves what fits out of
/// the inventory.
///
/// # Returns
/// The boxes loaded (empty if nothing could be placed) and the volume they use
fn fill_truck(
    truck: &TruckType,
    truck_volume: f64,
    inventory: &mut Inventory,
    config: &LoadingConfig,
) -> (Vec<LoadedBox>, f64) {
    let mut loaded = Vec::new();
    let mut volume_used = 0.0;
    let entries = inventory.entries_mut();

    for idx in config.fill_order.indices(entries.len()) {
        let entry = &mut entries[idx];
        if entry.remaining == 0 || !fits(&*entry, truck) {
            continue;
        }

        let can_fit =
            ((truck_volume - volume_used) / entry.unit_volume + config.fit_epsilon).floor();
        // `as` saturates: negative quotients become 0.
        let take = if can_fit >= f64::from(entry.remaining) {
            entry.remaining
        } else {
            can_fit as u32
        };
        if take == 0 {
            continue;
        }

        let volume = f64::from(take) * entry.unit_volume;
        entry.remaining -= take;
        volume_used += volume;
        loaded.push(LoadedBox {
            name: entry.name.clone(),
            quantity_in_truck: take,
            volume_used: volume,
        });
    }

    (loaded, volume_used)
}

/// Fills trucks of one type, one after another, from `inventory`.
///
/// Stops when the inventory is exhausted, when `max_trucks` trucks are in use,
/// or when a truck could not take a single box. That last truck is not counted.
///
/// # Parameters
/// * `truck` - The truck type to fill
/// * `inventory` - Boxes still to be shipped; the updated value is returned
/// * `max_trucks` - Upper bound on the number of trucks
/// * `config` - Loading parameters
pub fn load_trucks(
    truck: &TruckType,
    inventory: Inventory,
    max_trucks: u32,
    config: &LoadingConfig,
) -> FleetLoad {
    let truck_volume = truck.volume_cubic_feet();
    let mut inventory = inventory;
    let mut distribution = Vec::new();
    let mut trucks_used = 0u32;
    let mut cargo_volume = 0.0;

    while !inventory.is_exhausted() && trucks_used < max_trucks {
        let (boxes, volume_used) = fill_truck(truck, truck_volume, &mut inventory, config);
        if boxes.is_empty() {
            debug!(truck = %truck.name, "no remaining box fits, stopping");
            break;
        }

        trucks_used += 1;
        cargo_volume += volume_used;
        debug!(
            truck = %truck.name,
            number = trucks_used,
            boxes = boxes.iter().map(|b| b.quantity_in_truck).sum::<u32>(),
            volume_used,
            "truck filled"
        );
        distribution.push(TruckLoad {
            truck_type: truck.name.clone(),
            truck_number: trucks_used,
            is_constraint: truck.is_constraint(),
            boxes,
            volume_used,
            truck_volume,
            volume_utilization: volume_used / truck_volume * 100.0,
        });
    }

    FleetLoad {
        distribution,
        inventory,
        trucks_used,
        total_cost: f64::from(trucks_used) * truck.price(),
        cargo_volume,
        capacity_volume: f64::from(trucks_used) * truck_volume,
    }
}

/// Fixed-count truck type as reported to the caller.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ConstraintTruckSummary {
    pub name: String,
    pub fixed_count: u32,
    pub cost: f64,
}

/// Count of one truck type within a mixed solution.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct FleetEntry {
    pub name: String,
    pub count: u32,
    pub is_constraint: bool,
}

/// Result of filling all constraint trucks.
#[derive(Clone, Debug)]
pub struct ConstraintAllocation {
    pub distribution: Vec<TruckLoad>,
    pub inventory: Inventory,
    pub constraint_cost: f64,
    pub cargo_volume: f64,
    pub capacity_volume: f64,
    pub fleet: Vec<FleetEntry>,
    pub summaries: Vec<ConstraintTruckSummary>,
}

/// Fills every constraint truck with exactly its fixed count.
///
/// Each type costs `fixed_count * price`, even when some of its trucks stay
/// empty. Types are processed in the given order, each one working on what the
/// previous ones left.
pub fn allocate_constraints(
    trucks: &[&TruckType],
    inventory: Inventory,
    config: &LoadingConfig,
) -> ConstraintAllocation {
    let mut allocation = ConstraintAllocation {
        distribution: Vec::new(),
        inventory,
        constraint_cost: 0.0,
        cargo_volume: 0.0,
        capacity_volume: 0.0,
        fleet: Vec::new(),
        summaries: Vec::new(),
    };

    for truck in trucks {
        let fixed_count = match truck.fixed_count {
            Some(count) if count > 0 => count,
            _ => continue,
        };

        let load = load_trucks(
            truck,
            std::mem::take(&mut allocation.inventory),
            fixed_count,
            config,
        );
        let cost = f64::from(fixed_count) * truck.price();
        debug!(
            truck = %truck.name,
            fixed_count,
            used = load.trucks_used,
            cost,
            "constraint trucks allocated"
        );

        allocation.inventory = load.inventory;
        allocation.distribution.extend(load.distribution);
        allocation.constraint_cost += cost;
        allocation.cargo_volume += load.cargo_volume;
        allocation.capacity_volume += f64::from(fixed_count) * truck.volume_cubic_feet();
        allocation.fleet.push(FleetEntry {
            name: truck.name.clone(),
            count: fixed_count,
            is_constraint: true,
        });
        allocation.summaries.push(ConstraintTruckSummary {
            name: truck.name.clone(),
            fixed_count,
            cost,
        });
    }

    allocation
}

/// Candidate that uses a single flexible truck type.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct SingleTypeSolution {
    pub truck_type: String,
    pub trucks_used: u32,
    pub total_cost: f64,
    pub distribution: Vec<TruckLoad>,
    pub unshipped_boxes: Vec<UnshippedBox>,
    pub can_ship_all: bool,
    /// Mean truck utilization in percent.
    pub volume_utilization: f64,
    /// True when the truck type had no available count.
    pub is_unlimited: bool,
    pub capacity_volume: f64,
}

/// Candidate made of all constraint trucks plus at most one flexible type.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct MixedSolution {
    pub truck_types: Vec<FleetEntry>,
    pub total_cost: f64,
    pub distribution: Vec<TruckLoad>,
    pub unshipped_boxes: Vec<UnshippedBox>,
    pub can_ship_all: bool,
    pub volume_utilization: f64,
    pub constraint_cost: f64,
    pub flexible_cost: f64,
    pub constraint_volume: f64,
    pub flexible_volume: f64,
    pub capacity_volume: f64,
}

/// One candidate assignment of boxes to trucks.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Solution {
    SingleType(SingleTypeSolution),
    Mixed(MixedSolution),
}

impl Solution {
    pub fn total_cost(&self) -> f64 {
        match self {
            Solution::SingleType(s) => s.total_cost,
            Solution::Mixed(m) => m.total_cost,
        }
    }

    pub fn can_ship_all(&self) -> bool {
        match self {
            Solution::SingleType(s) => s.can_ship_all,
            Solution::Mixed(m) => m.can_ship_all,
        }
    }

    pub fn distribution(&self) -> &[TruckLoad] {
        match self {
            Solution::SingleType(s) => &s.distribution,
            Solution::Mixed(m) => &m.distribution,
        }
    }

    pub fn unshipped_boxes(&self) -> &[UnshippedBox] {
        match self {
            Solution::SingleType(s) => &s.unshipped_boxes,
            Solution::Mixed(m) => &m.unshipped_boxes,
        }
    }

    /// Cubic feet of every truck paid for in this solution.
    pub fn capacity_volume(&self) -> f64 {
        match self {
            Solution::SingleType(s) => s.capacity_volume,
            Solution::Mixed(m) => m.capacity_volume,
        }
    }

    /// Number of boxes of `name` loaded across all trucks.
    pub fn shipped_of(&self, name: &str) -> u64 {
        self.distribution()
            .iter()
            .flat_map(|load| load.boxes.iter())
            .filter(|b| b.name == name)
            .map(|b| u64::from(b.quantity_in_truck))
            .sum()
    }

    /// True when at least one truck carries something.
    pub fn loads_anything(&self) -> bool {
        !self.distribution().is_empty()
    }
}

fn average_utilization(distribution: &[TruckLoad]) -> f64 {
    if distribution.is_empty() {
        return 0.0;
    }
    let sum: f64 = distribution.iter().map(|t| t.volume_utilization).sum();
    sum / distribution.len() as f64
}

fn single_type_solution(truck: &TruckType, load: FleetLoad) -> Solution {
    let can_ship_all = load.can_ship_all();
    Solution::SingleType(SingleTypeSolution {
        truck_type: truck.name.clone(),
        trucks_used: load.trucks_used,
        total_cost: load.total_cost,
        volume_utilization: average_utilization(&load.distribution),
        unshipped_boxes: load.inventory.unshipped(),
        distribution: load.distribution,
        can_ship_all,
        is_unlimited: truck.available.is_none(),
        capacity_volume: load.capacity_volume,
    })
}

fn constraint_only_solution(constraints: &ConstraintAllocation) -> Solution {
    Solution::Mixed(MixedSolution {
        truck_types: constraints.fleet.clone(),
        total_cost: constraints.constraint_cost,
        distribution: constraints.distribution.clone(),
        unshipped_boxes: constraints.inventory.unshipped(),
        can_ship_all: constraints.inventory.is_exhausted(),
        volume_utilization: average_utilization(&constraints.distribution),
        constraint_cost: constraints.constraint_cost,
        flexible_cost: 0.0,
        constraint_volume: constraints.cargo_volume,
        flexible_volume: 0.0,
        capacity_volume: constraints.capacity_volume,
    })
}

fn mixed_solution(
    constraints: &ConstraintAllocation,
    truck: &TruckType,
    load: FleetLoad,
) -> Solution {
    let mut truck_types = constraints.fleet.clone();
    truck_types.push(FleetEntry {
        name: truck.name.clone(),
        count: load.trucks_used,
        is_constraint: false,
    });

    let mut distribution = constraints.distribution.clone();
    distribution.extend(load.distribution);

    Solution::Mixed(MixedSolution {
        truck_types,
        total_cost: constraints.constraint_cost + load.total_cost,
        volume_utilization: average_utilization(&distribution),
        distribution,
        unshipped_boxes: load.inventory.unshipped(),
        can_ship_all: load.inventory.is_exhausted(),
        constraint_cost: constraints.constraint_cost,
        flexible_cost: load.total_cost,
        constraint_volume: constraints.cargo_volume,
        flexible_volume: load.cargo_volume,
        capacity_volume: constraints.capacity_volume + load.capacity_volume,
    })
}

/// Candidates produced before ranking.
#[derive(Clone, Debug)]
pub struct Enumeration {
    pub solutions: Vec<Solution>,
    pub constraint_trucks: Vec<ConstraintTruckSummary>,
    pub is_mixed: bool,
}

/// Builds one candidate per flexible truck type.
///
/// Without constraint trucks every flexible type is tried against the full
/// inventory. With constraint trucks those are filled first and every flexible
/// type is tried against the residual, each giving one mixed candidate. When
/// the constraint trucks already carry everything, or no flexible type exists,
/// a single constraint-only candidate is produced instead.
pub fn enumerate_solutions(
    trucks: &[TruckType],
    inventory: &Inventory,
    config: &LoadingConfig,
) -> Enumeration {
    let constraint_trucks: Vec<&TruckType> = trucks
        .iter()
        .filter(|t| t.fixed_count.is_some_and(|count| count > 0))
        .collect();
    let flexible_trucks: Vec<&TruckType> = trucks.iter().filter(|t| !t.is_constraint()).collect();

    for skipped in trucks.iter().filter(|t| t.fixed_count == Some(0)) {
        debug!(truck = %skipped.name, "constraint truck fixed at zero, skipping");
    }

    if constraint_trucks.is_empty() {
        let solutions = flexible_trucks
            .iter()
            .map(|truck| {
                let load = load_trucks(
                    truck,
                    inventory.clone(),
                    truck.max_trucks(config.unbounded_truck_cap),
                    config,
                );
                single_type_solution(truck, load)
            })
            .collect();
        return Enumeration {
            solutions,
            constraint_trucks: Vec::new(),
            is_mixed: false,
        };
    }

    let constraints = allocate_constraints(&constraint_trucks, inventory.clone(), config);
    let solutions = if constraints.inventory.is_exhausted() || flexible_trucks.is_empty() {
        vec![constraint_only_solution(&constraints)]
    } else {
        flexible_trucks
            .iter()
            .map(|truck| {
                let load = load_trucks(
                    truck,
                    constraints.inventory.clone(),
                    truck.max_trucks(config.unbounded_truck_cap),
                    config,
                );
                mixed_solution(&constraints, truck, load)
            })
            .collect()
    };

    Enumeration {
        solutions,
        constraint_trucks: constraints.summaries,
        is_mixed: true,
    }
}

/// Orders candidates: those that ship everything first, then by total cost.
///
/// The sort is stable, so equal candidates keep their enumeration order.
pub fn rank_solutions(solutions: &mut [Solution]) {
    solutions.sort_by(|a, b| {
        b.can_ship_all().cmp(&a.can_ship_all()).then_with(|| {
            a.total_cost()
                .partial_cmp(&b.total_cost())
                .unwrap_or(Ordering::Equal)
        })
    });
}

/// Complete result of one optimization run.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct OptimizationOutcome {
    pub solutions: Vec<Solution>,
    /// Highest ranked candidate that loads at least one box; `None` when no
    /// candidate loads a single box.
    pub recommendation: Option<Solution>,
    pub total_box_volume: f64,
    pub total_box_count: u64,
    pub is_mixed_solution: bool,
    pub constraint_trucks: Vec<ConstraintTruckSummary>,
}

impl OptimizationOutcome {
    /// True when no truck type can carry any of the boxes.
    pub fn no_feasible_solution(&self) -> bool {
        self.recommendation.is_none()
    }
}

/// Main entry point: enumerates, ranks and picks a recommendation.
///
/// # Parameters
/// * `trucks` - Truck types in declaration order
/// * `boxes` - Box categories in declaration order
pub fn optimize(trucks: &[TruckType], boxes: &[BoxType]) -> OptimizationOutcome {
    optimize_with_config(trucks, boxes, &LoadingConfig::default())
}

/// Like `optimize`, with custom loading parameters.
pub fn optimize_with_config(
    trucks: &[TruckType],
    boxes: &[BoxType],
    config: &LoadingConfig,
) -> OptimizationOutcome {
    let inventory = Inventory::from_boxes(boxes);
    let total_box_volume = inventory.total_volume();
    let total_box_count = inventory.total_requested();

    if trucks.is_empty() || boxes.is_empty() {
        info!(
            trucks = trucks.len(),
            boxes = boxes.len(),
            "nothing to optimize"
        );
        return OptimizationOutcome {
            solutions: Vec::new(),
            recommendation: None,
            total_box_volume,
            total_box_count,
            is_mixed_solution: false,
            constraint_trucks: Vec::new(),
        };
    }

    let Enumeration {
        mut solutions,
        constraint_trucks,
        is_mixed,
    } = enumerate_solutions(trucks, &inventory, config);
    rank_solutions(&mut solutions);

    let recommendation = solutions.iter().find(|s| s.loads_anything()).cloned();

    info!(
        candidates = solutions.len(),
        mixed = is_mixed,
        recommended_cost = recommendation.as_ref().map(Solution::total_cost),
        ships_all = recommendation.as_ref().is_some_and(Solution::can_ship_all),
        "optimization finished"
    );

    OptimizationOutcome {
        solutions,
        recommendation,
        total_box_volume,
        total_box_count,
        is_mixed_solution: is_mixed,
        constraint_trucks,
    }
}
