//! v1 cross-boundary contracts for the event planning recommendation engine.
//!
//! Every type here is a plain value: the engine never holds references into
//! caller-owned state, and nothing survives beyond a single call.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub mod results;

pub use results::*;

pub const SCHEMA_VERSION_V1: &str = "1.0";

// ---------------------------------------------------------------------------
// Geometry values
// ---------------------------------------------------------------------------

/// A point on the venue plane, in metres.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle on the venue plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

// ---------------------------------------------------------------------------
// Event inputs
// ---------------------------------------------------------------------------

/// Immutable event facts supplied by the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventProfile {
    pub event_id: String,
    pub capacity: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub category: Option<String>,
    pub ticket_price: Option<f64>,
    pub marketing_budget: Option<f64>,
    pub social_followers: Option<u32>,
    #[serde(default)]
    pub expected_attendance: Option<u32>,
    pub created_at: NaiveDate,
    pub outdoor: bool,
    #[serde(default)]
    pub public_event: bool,
}

impl EventProfile {
    /// Inclusive duration in days; ≥ 1 whenever `end_date >= start_date`.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn start_month(&self) -> u32 {
        self.start_date.month()
    }

    /// Expected headcount for risk tiers; falls back to venue capacity.
    pub fn expected_headcount(&self) -> u32 {
        self.expected_attendance.unwrap_or(self.capacity)
    }
}

/// A date window occupied by another event, used for the competition factor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Attendance observation from a past event; similarity is computed per call
/// and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalEventSample {
    pub attendance: u32,
    pub date: NaiveDate,
    pub capacity: Option<u32>,
    pub duration_days: Option<u32>,
    pub category: Option<String>,
}

/// Already-resolved weather data; absence of any field yields a neutral
/// multiplier of 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct WeatherSnapshot {
    pub temperature: Option<f64>,
    /// Percent, 0–100.
    pub precipitation_probability: Option<f64>,
    pub wind_speed: Option<f64>,
}

// ---------------------------------------------------------------------------
// Venue and vendors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VenueSpace {
    pub capacity: u32,
    pub outdoor: bool,
}

impl VenueSpace {
    /// Area available for vendor placement, m².
    pub fn usable_area(&self) -> f64 {
        f64::from(self.capacity) * 1.5
    }

    pub fn total_area(&self) -> f64 {
        f64::from(self.capacity) * 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vendor {
    pub vendor_id: String,
    pub business_type: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VendorCategory {
    Food,
    Retail,
    Service,
    Entertainment,
}

impl VendorCategory {
    /// Placement order: food vendors claim the high-traffic cells first.
    pub const PLACEMENT_ORDER: [VendorCategory; 4] = [
        VendorCategory::Food,
        VendorCategory::Retail,
        VendorCategory::Service,
        VendorCategory::Entertainment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Retail => "retail",
            Self::Service => "service",
            Self::Entertainment => "entertainment",
        }
    }
}

/// Spacing and access constraints for layout optimization. Defaults match
/// indoor venues; `for_venue` widens them for outdoor sites.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LayoutConstraints {
    pub min_distance_between_vendors: f64,
    pub max_walking_distance: f64,
    pub crowd_flow_efficiency: f64,
    pub emergency_access_width: f64,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            min_distance_between_vendors: 3.0,
            max_walking_distance: 50.0,
            crowd_flow_efficiency: 0.8,
            emergency_access_width: 4.0,
        }
    }
}

impl LayoutConstraints {
    pub fn for_venue(venue: &VenueSpace) -> Self {
        let mut constraints = Self::default();
        if venue.outdoor {
            constraints.min_distance_between_vendors = 4.0;
            constraints.emergency_access_width = 5.0;
        }
        constraints
    }
}

// ---------------------------------------------------------------------------
// Budget inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BudgetCategory {
    VenueCosts,
    MarketingPromotion,
    SecuritySafety,
    Infrastructure,
    Entertainment,
    FoodBeverage,
    Logistics,
    Contingency,
}

impl BudgetCategory {
    pub const ALL: [BudgetCategory; 8] = [
        BudgetCategory::VenueCosts,
        BudgetCategory::MarketingPromotion,
        BudgetCategory::SecuritySafety,
        BudgetCategory::Infrastructure,
        BudgetCategory::Entertainment,
        BudgetCategory::FoodBeverage,
        BudgetCategory::Logistics,
        BudgetCategory::Contingency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VenueCosts => "venue_costs",
            Self::MarketingPromotion => "marketing_promotion",
            Self::SecuritySafety => "security_safety",
            Self::Infrastructure => "infrastructure",
            Self::Entertainment => "entertainment",
            Self::FoodBeverage => "food_beverage",
            Self::Logistics => "logistics",
            Self::Contingency => "contingency",
        }
    }
}

/// How a spending category performed at a prior event of this organizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryPerformance {
    pub category: BudgetCategory,
    /// 0.0–1.0; > 0.9 earns the category budget, < 0.6 costs it.
    pub efficiency_score: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventSizeClass {
    Small,
    Medium,
    Large,
    Mega,
}

impl EventSizeClass {
    pub fn from_capacity(capacity: u32) -> Self {
        match capacity {
            0..=500 => Self::Small,
            501..=2000 => Self::Medium,
            2001..=10000 => Self::Large,
            _ => Self::Mega,
        }
    }
}

// ---------------------------------------------------------------------------
// Risk vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Weather,
    Safety,
    Security,
    Financial,
    Operational,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::Weather,
        RiskCategory::Safety,
        RiskCategory::Security,
        RiskCategory::Financial,
        RiskCategory::Operational,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Safety => "safety",
            Self::Security => "security",
            Self::Financial => "financial",
            Self::Operational => "operational",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MitigationPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Buckets at 0.3 / 0.6 / 0.8.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Critical
        } else if score >= 0.6 {
            Self::High
        } else if score >= 0.3 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Qualitative band used for mitigation cost and effectiveness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Low,
    Medium,
    High,
}

// ---------------------------------------------------------------------------
// Error contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingInput,
    ValidationFailed,
}

/// Structured failure reported across the engine boundary. Validation
/// failures carry every violated constraint, not just the first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineError {
    pub schema_version: String,
    pub code: ErrorCode,
    pub message: String,
    #[serde(default)]
    pub violations: Vec<String>,
}

impl EngineError {
    pub fn missing_input(message: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            code: ErrorCode::MissingInput,
            message: message.into(),
            violations: Vec::new(),
        }
    }

    pub fn validation(violations: Vec<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            code: ErrorCode::ValidationFailed,
            message: format!("{} constraint(s) violated", violations.len()),
            violations,
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            ErrorCode::MissingInput => write!(f, "missing input: {}", self.message),
            ErrorCode::ValidationFailed => {
                write!(f, "validation failed: {}", self.violations.join("; "))
            }
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_inclusive() {
        let event = EventProfile {
            event_id: "evt_001".to_string(),
            capacity: 1000,
            start_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 5, 3).unwrap(),
            category: None,
            ticket_price: None,
            marketing_budget: None,
            social_followers: None,
            expected_attendance: None,
            created_at: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            outdoor: false,
            public_event: false,
        };
        assert_eq!(event.duration_days(), 3);
    }

    #[test]
    fn outdoor_venues_widen_constraints() {
        let indoor = LayoutConstraints::for_venue(&VenueSpace {
            capacity: 800,
            outdoor: false,
        });
        let outdoor = LayoutConstraints::for_venue(&VenueSpace {
            capacity: 800,
            outdoor: true,
        });
        assert_eq!(indoor.min_distance_between_vendors, 3.0);
        assert_eq!(outdoor.min_distance_between_vendors, 4.0);
        assert_eq!(outdoor.emergency_access_width, 5.0);
    }

    #[test]
    fn size_class_boundaries() {
        assert_eq!(EventSizeClass::from_capacity(500), EventSizeClass::Small);
        assert_eq!(EventSizeClass::from_capacity(2000), EventSizeClass::Medium);
        assert_eq!(EventSizeClass::from_capacity(10000), EventSizeClass::Large);
        assert_eq!(EventSizeClass::from_capacity(10001), EventSizeClass::Mega);
    }

    #[test]
    fn engine_error_round_trip() {
        let error = EngineError::validation(vec![
            "vendors v1 and v2 are 2.10m apart (minimum 3.00m)".to_string(),
        ]);
        let encoded = serde_json::to_string(&error).expect("serialize");
        let decoded: EngineError = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(error, decoded);
        assert_eq!(decoded.code, ErrorCode::ValidationFailed);
    }
}
