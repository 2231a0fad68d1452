//! Budget allocation across the eight fixed spending categories.
//!
//! Percentages are adjusted additively by event profile, historical category
//! performance, and schedule risk, then normalized so the allocated amounts
//! sum to the supplied total within rounding tolerance.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use contracts::{
    AllocationResult, BudgetCategory, CategoryPerformance, EngineError, EventBudgetProfile,
    EventProfile, EventSizeClass, RiskLevel, SCHEMA_VERSION_V1,
};

use crate::validate_event;

/// Allocated totals may drift from the budget by at most one currency unit.
pub const ROUNDING_TOLERANCE: f64 = 1.0;

/// Contingency must hold at least 2% of the total budget.
pub const CONTINGENCY_FLOOR: f64 = 0.02;

pub fn allocate(
    event: &EventProfile,
    total_budget: f64,
    performance: &[CategoryPerformance],
    as_of: NaiveDate,
) -> Result<AllocationResult, EngineError> {
    validate_event(event)?;
    if !total_budget.is_finite() || total_budget <= 0.0 {
        return Err(EngineError::missing_input(format!(
            "total_budget must be positive, got {total_budget}"
        )));
    }

    let profile = classify(event);
    let mut percentages = base_percentages();
    apply_profile_adjustments(&mut percentages, &profile);
    apply_performance_adjustments(&mut percentages, performance);
    apply_schedule_adjustments(&mut percentages, event, as_of);
    normalize(&mut percentages);

    let allocation: BTreeMap<BudgetCategory, f64> = percentages
        .iter()
        .map(|(category, share)| (*category, round_currency(share * total_budget)))
        .collect();

    validate(&allocation, total_budget)?;

    Ok(AllocationResult {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        total_budget,
        rationale: rationale(&percentages, &profile),
        risks: budget_risks(&percentages, event, as_of),
        opportunities: opportunities(&percentages),
        profile,
        allocation,
    })
}

/// Size class plus a simple risk point count: mega size, >3-day duration,
/// outdoor, and >5000 expected attendance each contribute one point.
pub fn classify(event: &EventProfile) -> EventBudgetProfile {
    let size_class = EventSizeClass::from_capacity(event.capacity);
    let duration_days = event.duration_days();

    let mut points = 0;
    if size_class == EventSizeClass::Mega {
        points += 1;
    }
    if duration_days > 3 {
        points += 1;
    }
    if event.outdoor {
        points += 1;
    }
    if event.expected_headcount() > 5000 {
        points += 1;
    }
    let risk_level = match points {
        0 | 1 => RiskLevel::Low,
        2 | 3 => RiskLevel::Medium,
        _ => RiskLevel::High,
    };

    EventBudgetProfile {
        size_class,
        risk_level,
        outdoor: event.outdoor,
        duration_days,
    }
}

fn base_percentages() -> BTreeMap<BudgetCategory, f64> {
    BTreeMap::from([
        (BudgetCategory::VenueCosts, 0.25),
        (BudgetCategory::MarketingPromotion, 0.15),
        (BudgetCategory::SecuritySafety, 0.12),
        (BudgetCategory::Infrastructure, 0.18),
        (BudgetCategory::Entertainment, 0.15),
        (BudgetCategory::FoodBeverage, 0.05),
        (BudgetCategory::Logistics, 0.08),
        (BudgetCategory::Contingency, 0.02),
    ])
}

fn adjust(percentages: &mut BTreeMap<BudgetCategory, f64>, category: BudgetCategory, delta: f64) {
    *percentages.entry(category).or_insert(0.0) += delta;
}

fn apply_profile_adjustments(
    percentages: &mut BTreeMap<BudgetCategory, f64>,
    profile: &EventBudgetProfile,
) {
    match profile.size_class {
        EventSizeClass::Small => {
            adjust(percentages, BudgetCategory::MarketingPromotion, 0.05);
            adjust(percentages, BudgetCategory::SecuritySafety, -0.03);
            adjust(percentages, BudgetCategory::Contingency, -0.02);
        }
        EventSizeClass::Mega => {
            adjust(percentages, BudgetCategory::SecuritySafety, 0.05);
            adjust(percentages, BudgetCategory::Logistics, 0.03);
            adjust(percentages, BudgetCategory::Contingency, 0.02);
            adjust(percentages, BudgetCategory::MarketingPromotion, -0.05);
            adjust(percentages, BudgetCategory::Entertainment, -0.05);
        }
        EventSizeClass::Medium | EventSizeClass::Large => {}
    }

    if profile.outdoor {
        adjust(percentages, BudgetCategory::Infrastructure, 0.05);
        adjust(percentages, BudgetCategory::Contingency, 0.03);
        adjust(percentages, BudgetCategory::VenueCosts, -0.05);
        adjust(percentages, BudgetCategory::Entertainment, -0.03);
    }

    if profile.risk_level >= RiskLevel::High {
        adjust(percentages, BudgetCategory::SecuritySafety, 0.03);
        adjust(percentages, BudgetCategory::Contingency, 0.05);
        adjust(percentages, BudgetCategory::MarketingPromotion, -0.05);
        adjust(percentages, BudgetCategory::Entertainment, -0.03);
    }
}

fn apply_performance_adjustments(
    percentages: &mut BTreeMap<BudgetCategory, f64>,
    performance: &[CategoryPerformance],
) {
    for record in performance {
        if record.efficiency_score > 0.9 {
            adjust(percentages, record.category, 0.02);
        } else if record.efficiency_score < 0.6 {
            adjust(percentages, record.category, -0.03);
        }
    }
}

fn is_winter(month: u32) -> bool {
    matches!(month, 12 | 1 | 2)
}

fn created_recently(event: &EventProfile, as_of: NaiveDate) -> bool {
    (as_of - event.created_at).num_days() < 90
}

fn apply_schedule_adjustments(
    percentages: &mut BTreeMap<BudgetCategory, f64>,
    event: &EventProfile,
    as_of: NaiveDate,
) {
    if is_winter(event.start_month()) {
        adjust(percentages, BudgetCategory::Contingency, 0.02);
        adjust(percentages, BudgetCategory::Infrastructure, 0.01);
    }
    if created_recently(event, as_of) {
        adjust(percentages, BudgetCategory::Contingency, 0.03);
        adjust(percentages, BudgetCategory::MarketingPromotion, 0.02);
    }
}

/// Rescale so the shares sum to exactly 1.0. Guarded: a degenerate
/// non-positive sum leaves the map untouched and lets validation report it.
fn normalize(percentages: &mut BTreeMap<BudgetCategory, f64>) {
    let sum: f64 = percentages.values().sum();
    if sum > 0.0 {
        for share in percentages.values_mut() {
            *share /= sum;
        }
    }
}

fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn validate(
    allocation: &BTreeMap<BudgetCategory, f64>,
    total_budget: f64,
) -> Result<(), EngineError> {
    let mut violations = Vec::new();

    let allocated: f64 = allocation.values().sum();
    if (allocated - total_budget).abs() > ROUNDING_TOLERANCE {
        violations.push(format!(
            "allocated total {allocated:.2} differs from budget {total_budget:.2} by more than {ROUNDING_TOLERANCE:.1}"
        ));
    }
    for (category, amount) in allocation {
        if *amount < 0.0 {
            violations.push(format!(
                "category {} has negative amount {amount:.2}",
                category.as_str()
            ));
        }
    }
    let contingency = allocation
        .get(&BudgetCategory::Contingency)
        .copied()
        .unwrap_or(0.0);
    // Amounts are rounded to cents, so the floor must be compared at the
    // same precision or an exact 2% share can miss it by a sub-cent.
    let floor = round_currency(CONTINGENCY_FLOOR * total_budget);
    if contingency < floor {
        violations.push(format!(
            "contingency {contingency:.2} is below the {:.0}% floor ({floor:.2})",
            CONTINGENCY_FLOOR * 100.0,
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(EngineError::validation(violations))
    }
}

fn rationale(
    percentages: &BTreeMap<BudgetCategory, f64>,
    profile: &EventBudgetProfile,
) -> BTreeMap<BudgetCategory, String> {
    percentages
        .iter()
        .map(|(category, share)| {
            let text = match category {
                BudgetCategory::VenueCosts => format!(
                    "{:.1}% reserved for venue hire and site fees",
                    share * 100.0
                ),
                BudgetCategory::MarketingPromotion => format!(
                    "{:.1}% for promotion across a {:?} audience",
                    share * 100.0,
                    profile.size_class
                ),
                BudgetCategory::SecuritySafety => format!(
                    "{:.1}% for stewarding and safety cover at {} risk",
                    share * 100.0,
                    profile.risk_level.as_str()
                ),
                BudgetCategory::Infrastructure => format!(
                    "{:.1}% for staging, power, and{} infrastructure",
                    share * 100.0,
                    if profile.outdoor { " weatherproof" } else { "" }
                ),
                BudgetCategory::Entertainment => {
                    format!("{:.1}% for programming and performers", share * 100.0)
                }
                BudgetCategory::FoodBeverage => {
                    format!("{:.1}% for catering operations", share * 100.0)
                }
                BudgetCategory::Logistics => {
                    format!("{:.1}% for transport and crew logistics", share * 100.0)
                }
                BudgetCategory::Contingency => format!(
                    "{:.1}% held back for unplanned expenses",
                    share * 100.0
                ),
            };
            (*category, text)
        })
        .collect()
}

fn budget_risks(
    percentages: &BTreeMap<BudgetCategory, f64>,
    event: &EventProfile,
    as_of: NaiveDate,
) -> Vec<String> {
    let share = |category: BudgetCategory| percentages.get(&category).copied().unwrap_or(0.0);
    let mut risks = Vec::new();
    if share(BudgetCategory::Contingency) < 0.05 {
        risks.push("contingency below 5% leaves little room for overruns".to_string());
    }
    if share(BudgetCategory::VenueCosts) > 0.40 {
        risks.push("venue costs above 40% squeeze every other category".to_string());
    }
    if created_recently(event, as_of) && share(BudgetCategory::MarketingPromotion) < 0.10 {
        risks.push("marketing below 10% is thin for a newly announced event".to_string());
    }
    risks
}

fn opportunities(percentages: &BTreeMap<BudgetCategory, f64>) -> Vec<String> {
    let share = |category: BudgetCategory| percentages.get(&category).copied().unwrap_or(0.0);
    let mut opportunities = Vec::new();
    if share(BudgetCategory::Logistics) > 0.12 {
        opportunities
            .push("logistics above 12%: consolidate supplier deliveries".to_string());
    }
    if share(BudgetCategory::FoodBeverage) < 0.03 {
        opportunities.push(
            "food & beverage under 3%: negotiate vendor revenue share instead of direct spend"
                .to_string(),
        );
    }
    if share(BudgetCategory::Infrastructure) > 0.25 {
        opportunities
            .push("infrastructure above 25%: consider rental partnerships".to_string());
    }
    opportunities
}
