use chrono::NaiveDate;
use contracts::{EngineError, ErrorCode, EventProfile, LayoutConstraints, Vendor, VenueSpace};
use planning_core::recommend::PlanningRequest;
use planning_core::{budget, forecast, layout, recommend, risk};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn valid_event() -> EventProfile {
    EventProfile {
        event_id: "evt_hardening".to_string(),
        capacity: 1_500,
        start_date: date(2026, 7, 10),
        end_date: date(2026, 7, 12),
        category: Some("fair".to_string()),
        ticket_price: Some(12.0),
        marketing_budget: Some(30_000.0),
        social_followers: Some(5_000),
        expected_attendance: None,
        created_at: date(2025, 11, 1),
        outdoor: false,
        public_event: true,
    }
}

fn stalls(count: usize) -> Vec<Vendor> {
    (0..count)
        .map(|index| Vendor {
            vendor_id: format!("stall_{index}"),
            business_type: "food stall".to_string(),
            width: None,
            height: None,
        })
        .collect()
}

fn assert_missing_input(error: &EngineError) {
    assert_eq!(error.code, ErrorCode::MissingInput);
    assert!(error.violations.is_empty());
}

#[test]
fn reversed_dates_are_rejected_everywhere() {
    let mut event = valid_event();
    event.end_date = date(2026, 7, 1);
    let as_of = date(2026, 1, 1);

    assert_missing_input(&forecast::forecast(&event, &[], None, &[], as_of).unwrap_err());
    assert_missing_input(&budget::allocate(&event, 100_000.0, &[], as_of).unwrap_err());
    assert_missing_input(
        &risk::assess(&event, None, as_of, &contracts::RiskCategory::ALL).unwrap_err(),
    );
}

#[test]
fn zero_capacity_event_is_rejected() {
    let mut event = valid_event();
    event.capacity = 0;
    let error = forecast::forecast(&event, &[], None, &[], date(2026, 1, 1)).unwrap_err();
    assert_missing_input(&error);
    assert!(error.message.contains("capacity"));
}

#[test]
fn empty_vendor_list_is_rejected_before_placement() {
    let venue = VenueSpace {
        capacity: 1_000,
        outdoor: false,
    };
    let error = layout::optimize(&venue, &[], None).unwrap_err();
    assert_missing_input(&error);
}

#[test]
fn non_positive_budgets_are_rejected() {
    let event = valid_event();
    for bad_budget in [0.0, -500.0, f64::NAN] {
        let error = budget::allocate(&event, bad_budget, &[], date(2026, 1, 1)).unwrap_err();
        assert_eq!(error.code, ErrorCode::MissingInput);
    }
}

#[test]
fn layout_validation_lists_every_violated_pair() {
    let venue = VenueSpace {
        capacity: 400,
        outdoor: false,
    };
    let constraints = LayoutConstraints {
        min_distance_between_vendors: 1_000.0,
        ..LayoutConstraints::default()
    };
    let error = layout::optimize(&venue, &stalls(4), Some(constraints)).unwrap_err();
    assert_eq!(error.code, ErrorCode::ValidationFailed);
    // 4 vendors → 6 pairs, all too close at that threshold.
    assert_eq!(error.violations.len(), 6);
    for violation in &error.violations {
        assert!(violation.contains("apart"), "unexpected entry: {violation}");
    }
}

#[test]
fn allocation_failure_reports_contingency_violation() {
    // Small, indoor, low-risk: the small-event adjustment drives the
    // contingency share to 0%, below the 2% floor.
    let mut event = valid_event();
    event.capacity = 300;
    event.start_date = date(2026, 7, 10);
    event.end_date = date(2026, 7, 10);
    // Long-announced, so no recency adjustment tops the contingency back up.
    event.created_at = date(2025, 1, 1);
    let error = budget::allocate(&event, 200_000.0, &[], date(2026, 1, 1)).unwrap_err();
    assert_eq!(error.code, ErrorCode::ValidationFailed);
    assert!(error
        .violations
        .iter()
        .any(|violation| violation.contains("contingency")));
}

#[test]
fn engine_error_serializes_for_the_boundary() {
    let venue = VenueSpace {
        capacity: 400,
        outdoor: false,
    };
    let constraints = LayoutConstraints {
        min_distance_between_vendors: 1_000.0,
        ..LayoutConstraints::default()
    };
    let error = layout::optimize(&venue, &stalls(3), Some(constraints)).unwrap_err();

    let encoded = serde_json::to_value(&error).unwrap();
    assert_eq!(encoded["code"], "VALIDATION_FAILED");
    assert_eq!(encoded["violations"].as_array().unwrap().len(), 3);
}

#[test]
fn orchestrator_propagates_terminal_failures() {
    let mut request = PlanningRequest {
        event: valid_event(),
        historical_events: Vec::new(),
        weather: None,
        competing_events: Vec::new(),
        venue: Some(VenueSpace {
            capacity: 1_500,
            outdoor: false,
        }),
        vendors: stalls(3),
        constraints: None,
        total_budget: Some(250_000.0),
        historical_performance: Vec::new(),
        as_of: date(2026, 1, 1),
    };
    assert!(recommend::plan_event(&request).is_ok());

    request.event.end_date = date(2026, 7, 1);
    let error = recommend::plan_event(&request).unwrap_err();
    assert_eq!(error.code, ErrorCode::MissingInput);
}
