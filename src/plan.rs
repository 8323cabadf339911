//! JSON boundary of the planner.
//!
//! Requests describe trucks and boxes the way a form layer produces them; they
//! are validated here before the optimizer ever sees them. Responses carry the
//! ranked solutions and, optionally, metrics for the recommendation.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

use crate::error::Result;
use crate::insights::{InsightNote, InsightThresholds, SolutionMetrics, evaluate_recommendation};
use crate::model::{BoxType, TruckType, UnshippedBox, ValidationError};
use crate::optimizer::{
    ConstraintTruckSummary, FleetEntry, LoadedBox, LoadingConfig, MixedSolution,
    OptimizationOutcome, SingleTypeSolution, Solution, TruckLoad, optimize_with_config,
};
use crate::types::Dims;
use crate::units::LengthUnit;

fn default_truck_unit() -> String {
    LengthUnit::Feet.symbol().to_string()
}

fn default_box_unit() -> String {
    LengthUnit::Inches.symbol().to_string()
}

/// A truck category as submitted by the caller.
#[derive(Deserialize, Clone, Debug, ToSchema)]
pub struct TruckRequest {
    pub name: String,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// `ft`, `m`, `cm` or `in`; defaults to `ft`.
    #[serde(default = "default_truck_unit")]
    pub unit: String,
    pub price: Option<f64>,
    #[serde(default)]
    pub available: Option<u32>,
    #[serde(default)]
    pub is_constraint: bool,
    #[serde(default)]
    pub constraint_value: Option<u32>,
}

/// A box category as submitted by the caller.
#[derive(Deserialize, Clone, Debug, ToSchema)]
pub struct BoxRequest {
    pub name: String,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// `ft`, `m`, `cm` or `in`; defaults to `in`.
    #[serde(default = "default_box_unit")]
    pub unit: String,
    pub quantity: Option<u32>,
}

#[derive(Deserialize, Clone, Debug, ToSchema)]
#[schema(
    example = json!({
        "trucks": [
            { "name": "Tata 407", "length": 10.0, "width": 6.0, "height": 6.0, "unit": "ft", "price": 20000.0 },
            { "name": "Eicher", "length": 5.0, "width": 2.0, "height": 2.0, "unit": "m", "price": 45000.0,
              "is_constraint": true, "constraint_value": 1 }
        ],
        "boxes": [
            { "name": "Carton", "length": 24.0, "width": 24.0, "height": 24.0, "unit": "in", "quantity": 50 }
        ]
    })
)]
pub struct PlanRequest {
    #[serde(default)]
    pub trucks: Vec<TruckRequest>,
    #[serde(default)]
    pub boxes: Vec<BoxRequest>,
}

/// Request whose records passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedPlanRequest {
    pub trucks: Vec<TruckType>,
    pub boxes: Vec<BoxType>,
}

fn required<T>(
    value: Option<T>,
    record: &str,
    field: &str,
) -> std::result::Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingField(format!("{}: {}", record, field)))
}

impl TruckRequest {
    fn into_truck(self) -> Result<TruckType> {
        let unit = self.unit.parse::<LengthUnit>()?;
        let dims = Dims::new(
            required(self.length, &self.name, "length")?,
            required(self.width, &self.name, "width")?,
            required(self.height, &self.name, "height")?,
        );
        let price = required(self.price, &self.name, "price")?;

        let mut truck = TruckType::new(self.name, dims, unit, price)?;
        if let Some(available) = self.available {
            truck = truck.with_available(available)?;
        }
        if self.is_constraint {
            let count = self
                .constraint_value
                .ok_or_else(|| ValidationError::MissingConstraintValue(truck.name.clone()))?;
            truck = truck.with_fixed_count(count);
        }
        Ok(truck)
    }
}

impl BoxRequest {
    fn into_box(self) -> Result<BoxType> {
        let unit = self.unit.parse::<LengthUnit>()?;
        let dims = Dims::new(
            required(self.length, &self.name, "length")?,
            required(self.width, &self.name, "width")?,
            required(self.height, &self.name, "height")?,
        );
        let quantity = required(self.quantity, &self.name, "quantity")?;
        Ok(BoxType::new(self.name, dims, unit, quantity)?)
    }
}

impl PlanRequest {
    /// Validates every record and converts it into engine types.
    pub fn into_validated(self) -> Result<ValidatedPlanRequest> {
        let trucks = self
            .trucks
            .into_iter()
            .map(TruckRequest::into_truck)
            .collect::<Result<Vec<_>>>()?;
        let boxes = self
            .boxes
            .into_iter()
            .map(BoxRequest::into_box)
            .collect::<Result<Vec<_>>>()?;
        debug!(trucks = trucks.len(), boxes = boxes.len(), "plan request validated");
        Ok(ValidatedPlanRequest { trucks, boxes })
    }
}

/// Reads a plan request from JSON.
pub fn read_request(reader: impl Read) -> Result<PlanRequest> {
    Ok(serde_json::from_reader(reader)?)
}

/// Reads a plan request from a JSON file.
pub fn load_request(path: &Path) -> Result<PlanRequest> {
    let file = File::open(path)?;
    read_request(BufReader::new(file))
}

/// Metrics of the recommended solution.
#[derive(Serialize, Clone, Debug, PartialEq, ToSchema)]
pub struct MetricsReport {
    pub utilization_rate: f64,
    pub cost_efficiency: f64,
    pub shipping_completeness: f64,
    pub shipped_count: u64,
    pub requested_count: u64,
    pub insights: Vec<InsightNote>,
}

impl From<SolutionMetrics> for MetricsReport {
    fn from(metrics: SolutionMetrics) -> Self {
        Self {
            utilization_rate: metrics.utilization_rate,
            cost_efficiency: metrics.cost_efficiency,
            shipping_completeness: metrics.shipping_completeness,
            shipped_count: metrics.shipped_count,
            requested_count: metrics.requested_count,
            insights: metrics.insights.iter().map(InsightNote::from).collect(),
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, ToSchema)]
pub struct PlanResponse {
    #[serde(flatten)]
    pub outcome: OptimizationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsReport>,
}

impl PlanResponse {
    /// Builds the response; metrics are attached only when `thresholds` is given
    /// and the outcome has a recommendation.
    pub fn from_outcome(
        outcome: OptimizationOutcome,
        thresholds: Option<&InsightThresholds>,
    ) -> Self {
        let metrics = thresholds
            .and_then(|t| evaluate_recommendation(&outcome, t))
            .map(MetricsReport::from);
        Self { outcome, metrics }
    }
}

/// Validates `request`, runs the optimizer and assembles the response.
pub fn run_plan(
    request: PlanRequest,
    loading: &LoadingConfig,
    thresholds: Option<&InsightThresholds>,
) -> Result<PlanResponse> {
    let ValidatedPlanRequest { trucks, boxes } = request.into_validated()?;
    let outcome = optimize_with_config(&trucks, &boxes, loading);
    Ok(PlanResponse::from_outcome(outcome, thresholds))
}

#[derive(OpenApi)]
#[openapi(
    info(title = "load-it-now", description = "Truck loading plan request and response formats"),
    components(
        schemas(
            PlanRequest,
            TruckRequest,
            BoxRequest,
            PlanResponse,
            OptimizationOutcome,
            Solution,
            SingleTypeSolution,
            MixedSolution,
            TruckLoad,
            LoadedBox,
            FleetEntry,
            ConstraintTruckSummary,
            UnshippedBox,
            MetricsReport,
            InsightNote
        )
    )
)]
struct ApiDoc;

/// OpenAPI document describing the request and response formats.
pub fn openapi_json() -> Result<String> {
    Ok(ApiDoc::openapi().to_pretty_json()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;

    fn parse(raw: &str) -> PlanRequest {
        read_request(raw.as_bytes()).unwrap()
    }

    #[test]
    fn applies_default_units() {
        let request = parse(
            r#"{
                "trucks": [{ "name": "T", "length": 10, "width": 6, "height": 6, "price": 1 }],
                "boxes": [{ "name": "B", "length": 24, "width": 24, "height": 24, "quantity": 3 }]
            }"#,
        );
        let validated = request.into_validated().unwrap();
        assert_eq!(validated.trucks[0].unit, LengthUnit::Feet);
        assert_eq!(validated.boxes[0].unit, LengthUnit::Inches);
        assert!(validated.trucks[0].fixed_count.is_none());
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let request = parse(
            r#"{ "trucks": [{ "name": "T", "length": 1, "width": 1, "height": 1, "unit": "yd", "price": 1 }] }"#,
        );
        assert!(matches!(request.into_validated(), Err(PlanError::InvalidUnit(_))));
    }

    #[test]
    fn missing_numeric_field_is_invalid_input() {
        let request =
            parse(r#"{ "trucks": [{ "name": "T", "length": 1, "width": 1, "height": 1 }] }"#);
        match request.into_validated() {
            Err(PlanError::InvalidInput(ValidationError::MissingField(msg))) => {
                assert!(msg.contains("price"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_positive_values_are_invalid_input() {
        let request = parse(
            r#"{ "boxes": [{ "name": "B", "length": 1, "width": 0, "height": 1, "quantity": 1 }] }"#,
        );
        assert!(matches!(
            request.into_validated(),
            Err(PlanError::InvalidInput(ValidationError::InvalidDimension(_)))
        ));

        let request = parse(
            r#"{ "boxes": [{ "name": "B", "length": 1, "width": 1, "height": 1, "quantity": 0 }] }"#,
        );
        assert!(matches!(
            request.into_validated(),
            Err(PlanError::InvalidInput(ValidationError::InvalidQuantity(_)))
        ));
    }

    #[test]
    fn constraint_truck_needs_a_value() {
        let request = parse(
            r#"{ "trucks": [{ "name": "T", "length": 1, "width": 1, "height": 1, "price": 1, "is_constraint": true }] }"#,
        );
        assert!(matches!(
            request.into_validated(),
            Err(PlanError::InvalidInput(ValidationError::MissingConstraintValue(_)))
        ));

        let request = parse(
            r#"{ "trucks": [{ "name": "T", "length": 1, "width": 1, "height": 1, "price": 1,
                 "is_constraint": true, "constraint_value": 2, "available": 5 }] }"#,
        );
        let truck = &request.into_validated().unwrap().trucks[0];
        assert_eq!(truck.fixed_count, Some(2));
        assert_eq!(truck.available, Some(5));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(read_request("{ not json".as_bytes()), Err(PlanError::Json(_))));
    }

    #[test]
    fn response_serializes_single_type_form_with_metrics() {
        let request = parse(
            r#"{
                "trucks": [{ "name": "Tata 407", "length": 10, "width": 6, "height": 6, "price": 20000 }],
                "boxes": [{ "name": "Crate", "length": 2, "width": 2, "height": 2, "unit": "ft", "quantity": 50 }]
            }"#,
        );
        let response = run_plan(
            request,
            &LoadingConfig::default(),
            Some(&InsightThresholds::default()),
        )
        .unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["recommendation"]["truck_type"], "Tata 407");
        assert_eq!(value["recommendation"]["trucks_used"], 2);
        assert_eq!(value["is_mixed_solution"], false);
        assert!(value["recommendation"].get("truck_types").is_none());
        assert_eq!(value["metrics"]["shipped_count"], 50);
        let insights = value["metrics"]["insights"].as_array().unwrap();
        assert_eq!(insights.last().unwrap()["code"], "all_cargo_shippable");
    }

    #[test]
    fn response_omits_metrics_when_disabled() {
        let request = parse(
            r#"{
                "trucks": [{ "name": "T", "length": 10, "width": 6, "height": 6, "price": 1, "is_constraint": true, "constraint_value": 1 }],
                "boxes": [{ "name": "B", "length": 2, "width": 2, "height": 2, "unit": "ft", "quantity": 5 }]
            }"#,
        );
        let response = run_plan(request, &LoadingConfig::default(), None).unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert!(value.get("metrics").is_none());
        assert_eq!(value["recommendation"]["truck_types"][0]["is_constraint"], true);
        assert_eq!(value["constraint_trucks"][0]["fixed_count"], 1);
    }

    #[test]
    fn openapi_document_lists_plan_schemas() {
        let doc = openapi_json().unwrap();
        assert!(doc.contains("PlanRequest"));
        assert!(doc.contains("MixedSolution"));
    }
}
