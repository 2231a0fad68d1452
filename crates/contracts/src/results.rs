//! Result structures returned across the engine boundary.
//!
//! The source of record for field bounds: every score is a finite float in
//! [0,1], confidence tops out at 0.95, and currency amounts are rounded to
//! two decimals. All results are JSON-serializable snapshots with no
//! references back into engine state.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    BudgetCategory, EventSizeClass, MitigationPriority, Point, Rating, RiskCategory, RiskLevel,
    VendorCategory,
};

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

/// Which estimate the forecast was built from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForecastBasis {
    /// Weighted average over historical samples with similarity > 0.6.
    SimilarHistory,
    /// `capacity * utilization_rate` fallback.
    CapacityHeuristic,
}

/// Named multiplier breakdown so a caller can explain the prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastFactors {
    pub basis: ForecastBasis,
    pub base_attendance: f64,
    pub qualifying_samples: usize,
    pub weather_multiplier: f64,
    pub marketing_multiplier: f64,
    pub competition_multiplier: f64,
    pub seasonal_multiplier: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

/// 95 / 80 / 50 percent bands around the point prediction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceIntervals {
    pub p95: Interval,
    pub p80: Interval,
    pub p50: Interval,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub day_index: u32,
    pub expected_attendance: u32,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastResult {
    pub schema_version: String,
    pub event_id: String,
    pub predicted_attendance: u32,
    /// Clamped to [0.0, 0.95].
    pub confidence_score: f64,
    pub factors: ForecastFactors,
    pub confidence_intervals: ConfidenceIntervals,
    pub daily_forecast: Vec<DailyForecast>,
    /// Neutral defaults applied for absent optional inputs.
    #[serde(default)]
    pub defaults_applied: Vec<String>,
}

impl fmt::Display for ForecastResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event={} predicted={} confidence={:.2}",
            self.event_id, self.predicted_attendance, self.confidence_score
        )
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorPlacement {
    pub vendor_id: String,
    pub category: VendorCategory,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PathwayKind {
    Main,
    Secondary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pathway {
    pub kind: PathwayKind,
    pub width: f64,
    pub coordinates: Vec<Point>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExitLocation {
    North,
    South,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EmergencyExit {
    pub location: ExitLocation,
    pub width: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    Restroom,
    InfoBooth,
    FirstAid,
    Security,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Facility {
    pub kind: FacilityKind,
    pub position: Point,
}

/// Spatial plan; `placements` preserves placement order (food first, then
/// retail, service, entertainment).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutPlan {
    pub placements: Vec<VendorPlacement>,
    pub pathways: Vec<Pathway>,
    pub emergency_exits: Vec<EmergencyExit>,
    pub facility_locations: Vec<Facility>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutResult {
    pub schema_version: String,
    pub layout: LayoutPlan,
    pub efficiency_score: f64,
    pub crowd_flow_score: f64,
    pub accessibility_score: f64,
    pub recommendations: Vec<String>,
}

/// Priority tag used when generating alternative layouts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPriority {
    CrowdFlow,
    VendorRevenue,
}

impl LayoutPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CrowdFlow => "crowd_flow",
            Self::VendorRevenue => "vendor_revenue",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlternativeLayout {
    pub priority: LayoutPriority,
    pub result: LayoutResult,
}

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventBudgetProfile {
    pub size_class: EventSizeClass,
    pub risk_level: RiskLevel,
    pub outdoor: bool,
    pub duration_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationResult {
    pub schema_version: String,
    pub total_budget: f64,
    pub profile: EventBudgetProfile,
    /// Category → currency amount, rounded to 2 decimals; sums to the total
    /// budget within ±1.0.
    pub allocation: BTreeMap<BudgetCategory, f64>,
    pub rationale: BTreeMap<BudgetCategory, String>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryAssessment {
    pub category: RiskCategory,
    /// Clamped to [0,1].
    pub risk_score: f64,
    pub factors: Vec<String>,
    pub mitigation_priority: MitigationPriority,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MitigationStrategy {
    pub strategy: String,
    pub implementation: String,
    pub cost_estimate: Rating,
    pub effectiveness: Rating,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskResult {
    pub schema_version: String,
    pub overall_risk_score: f64,
    pub risk_level: RiskLevel,
    pub category_assessments: Vec<CategoryAssessment>,
    /// Categories scoring > 0.7, sorted descending by score.
    pub critical_risks: Vec<CategoryAssessment>,
    pub mitigation_strategies: BTreeMap<RiskCategory, Vec<MitigationStrategy>>,
}

impl fmt::Display for RiskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "overall={:.2} level={} critical={}",
            self.overall_risk_score,
            self.risk_level.as_str(),
            self.critical_risks.len()
        )
    }
}

// ---------------------------------------------------------------------------
// Orchestrator dashboards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub expected_revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueProjection {
    pub schema_version: String,
    pub ticket_price: f64,
    pub gross_ticket_revenue: f64,
    pub low_estimate: f64,
    pub high_estimate: f64,
    pub daily_revenue: Vec<DailyRevenue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoiOutlook {
    pub schema_version: String,
    pub projected_revenue: f64,
    pub total_budget: f64,
    /// `(revenue - budget) / budget`; 0.0 when the budget is zero.
    pub projected_roi: f64,
    pub assessment: String,
    pub opportunities: Vec<String>,
}

/// Predicted attendance against the historical mean.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum BenchmarkComparison {
    Historical {
        historical_mean_attendance: f64,
        predicted_to_historical_ratio: f64,
        sample_count: usize,
    },
    NoHistoricalData,
}

/// Combined decision-support report for a single event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanningReport {
    pub schema_version: String,
    pub event_id: String,
    pub forecast: ForecastResult,
    pub risk: RiskResult,
    pub allocation: Option<AllocationResult>,
    pub layout: Option<LayoutResult>,
    pub revenue: RevenueProjection,
    pub roi: Option<RoiOutlook>,
    pub benchmark: BenchmarkComparison,
    /// Sections omitted or defaulted because optional inputs were absent.
    #[serde(default)]
    pub defaults_applied: Vec<String>,
}
