//! Composite risk scoring across the five fixed categories, with critical
//! risk detection and a gated mitigation catalog.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use contracts::{
    CategoryAssessment, EngineError, EventProfile, MitigationPriority, MitigationStrategy, Rating,
    RiskCategory, RiskLevel, RiskResult, SCHEMA_VERSION_V1,
};

use crate::validate_event;

/// A category scoring above this joins the critical list.
pub const CRITICAL_CUTOFF: f64 = 0.7;

/// Assess the requested categories (pass `RiskCategory::ALL` for the
/// default set). `total_budget` feeds the financial exposure increment.
pub fn assess(
    event: &EventProfile,
    total_budget: Option<f64>,
    as_of: NaiveDate,
    categories: &[RiskCategory],
) -> Result<RiskResult, EngineError> {
    validate_event(event)?;

    let category_assessments: Vec<CategoryAssessment> = categories
        .iter()
        .map(|category| assess_category(*category, event, total_budget, as_of))
        .collect();

    let weight_sum: f64 = categories.iter().map(|category| weight(*category)).sum();
    let overall_risk_score = if weight_sum > 0.0 {
        category_assessments
            .iter()
            .map(|assessment| assessment.risk_score * weight(assessment.category))
            .sum::<f64>()
            / weight_sum
    } else {
        0.0
    };

    let mut critical_risks: Vec<CategoryAssessment> = category_assessments
        .iter()
        .filter(|assessment| assessment.risk_score > CRITICAL_CUTOFF)
        .cloned()
        .collect();
    critical_risks.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.category.cmp(&b.category))
    });

    let mitigation_strategies = category_assessments
        .iter()
        .map(|assessment| {
            (
                assessment.category,
                strategies_for(assessment.category, assessment.risk_score),
            )
        })
        .collect::<BTreeMap<_, _>>();

    Ok(RiskResult {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        overall_risk_score,
        risk_level: RiskLevel::from_score(overall_risk_score),
        category_assessments,
        critical_risks,
        mitigation_strategies,
    })
}

/// Fixed aggregation weights.
fn weight(category: RiskCategory) -> f64 {
    match category {
        RiskCategory::Weather => 0.20,
        RiskCategory::Safety => 0.25,
        RiskCategory::Security => 0.20,
        RiskCategory::Financial => 0.20,
        RiskCategory::Operational => 0.15,
    }
}

fn base_risk(category: RiskCategory) -> f64 {
    match category {
        RiskCategory::Weather => 0.30,
        RiskCategory::Safety => 0.20,
        RiskCategory::Security => 0.25,
        RiskCategory::Financial => 0.30,
        RiskCategory::Operational => 0.35,
    }
}

/// Above this score the category gets a high mitigation priority.
fn high_priority_threshold(category: RiskCategory) -> f64 {
    match category {
        RiskCategory::Weather | RiskCategory::Safety | RiskCategory::Operational => 0.6,
        RiskCategory::Security => 0.65,
        RiskCategory::Financial => 0.7,
    }
}

fn assess_category(
    category: RiskCategory,
    event: &EventProfile,
    total_budget: Option<f64>,
    as_of: NaiveDate,
) -> CategoryAssessment {
    let month = event.start_month();
    let duration = event.duration_days();
    let headcount = event.expected_headcount();

    let mut increments: Vec<(f64, &str)> = Vec::new();
    match category {
        RiskCategory::Weather => {
            if matches!(month, 12 | 1 | 2) {
                increments.push((0.3, "winter start date"));
            } else if matches!(month, 6 | 7 | 8) {
                increments.push((0.2, "summer heat window"));
            }
            if event.outdoor {
                increments.push((0.2, "outdoor venue"));
            }
            if duration > 3 {
                increments.push((0.1, "multi-day weather exposure"));
            }
        }
        RiskCategory::Safety => {
            if headcount > 10_000 {
                increments.push((0.4, "crowd above 10000"));
            } else if headcount > 5_000 {
                increments.push((0.3, "crowd above 5000"));
            } else if headcount > 2_000 {
                increments.push((0.2, "crowd above 2000"));
            }
            if event.outdoor {
                increments.push((0.1, "open-site crowd management"));
            }
            if duration > 3 {
                increments.push((0.1, "fatigue over long run"));
            }
        }
        RiskCategory::Security => {
            if event.public_event {
                increments.push((0.15, "open public access"));
            }
            if headcount > 10_000 {
                increments.push((0.25, "crowd above 10000"));
            } else if headcount > 5_000 {
                increments.push((0.15, "crowd above 5000"));
            }
            if event.outdoor {
                increments.push((0.1, "unfenced perimeter"));
            }
        }
        RiskCategory::Financial => {
            if (as_of - event.created_at).num_days() < 90 {
                increments.push((0.2, "event announced under 90 days ago"));
            }
            if total_budget.is_some_and(|budget| budget > 1_000_000.0) {
                increments.push((0.2, "budget above 1,000,000"));
            }
        }
        RiskCategory::Operational => {
            if duration > 5 {
                increments.push((0.2, "run longer than 5 days"));
            } else if duration > 3 {
                increments.push((0.1, "run longer than 3 days"));
            }
        }
    }

    let mut factors = vec![format!("base {} exposure", category.as_str())];
    let mut score = base_risk(category);
    for (amount, factor) in increments {
        score += amount;
        factors.push(factor.to_string());
    }

    let risk_score = score.clamp(0.0, 1.0);
    let mitigation_priority = if risk_score > high_priority_threshold(category) {
        MitigationPriority::High
    } else if risk_score >= 0.3 {
        MitigationPriority::Medium
    } else {
        MitigationPriority::Low
    };

    CategoryAssessment {
        category,
        risk_score,
        factors,
        mitigation_priority,
    }
}

fn strategy(
    name: &str,
    implementation: &str,
    cost_estimate: Rating,
    effectiveness: Rating,
) -> MitigationStrategy {
    MitigationStrategy {
        strategy: name.to_string(),
        implementation: implementation.to_string(),
        cost_estimate,
        effectiveness,
    }
}

/// Fixed catalog, gated by score thresholds.
fn strategies_for(category: RiskCategory, score: f64) -> Vec<MitigationStrategy> {
    let mut strategies = Vec::new();
    match category {
        RiskCategory::Weather => {
            strategies.push(strategy(
                "weather monitoring",
                "daily forecast checks from 14 days out",
                Rating::Low,
                Rating::Medium,
            ));
            if score > 0.6 {
                strategies.push(strategy(
                    "temporary shelter infrastructure",
                    "covered stages and queue marquees",
                    Rating::High,
                    Rating::High,
                ));
            }
            if score > 0.8 {
                strategies.push(strategy(
                    "weather insurance",
                    "cancellation cover for severe conditions",
                    Rating::Medium,
                    Rating::High,
                ));
            }
        }
        RiskCategory::Safety => {
            strategies.push(strategy(
                "certified stewarding",
                "steward-to-attendee ratio per crowd tier",
                Rating::Medium,
                Rating::High,
            ));
            if score > 0.5 {
                strategies.push(strategy(
                    "medical posts",
                    "first aid stations with defined response routes",
                    Rating::Medium,
                    Rating::High,
                ));
            }
            if score > 0.7 {
                strategies.push(strategy(
                    "crowd density monitoring",
                    "live occupancy counts at pinch points",
                    Rating::Medium,
                    Rating::Medium,
                ));
            }
        }
        RiskCategory::Security => {
            strategies.push(strategy(
                "entry screening",
                "bag checks at every gate",
                Rating::Medium,
                Rating::Medium,
            ));
            if score > 0.6 {
                strategies.push(strategy(
                    "perimeter control",
                    "fencing and patrolled access points",
                    Rating::High,
                    Rating::High,
                ));
            }
        }
        RiskCategory::Financial => {
            strategies.push(strategy(
                "staged vendor payments",
                "milestone-based payouts with holdbacks",
                Rating::Low,
                Rating::Medium,
            ));
            if score > 0.6 {
                strategies.push(strategy(
                    "pre-sale targets",
                    "go/no-go checkpoints tied to ticket sales",
                    Rating::Low,
                    Rating::High,
                ));
            }
        }
        RiskCategory::Operational => {
            strategies.push(strategy(
                "runbook rehearsal",
                "walk-through of open, peak, and close procedures",
                Rating::Low,
                Rating::Medium,
            ));
            if score > 0.5 {
                strategies.push(strategy(
                    "standby crew",
                    "on-call relief staffing for multi-day runs",
                    Rating::Medium,
                    Rating::Medium,
                ));
            }
        }
    }
    strategies
}
