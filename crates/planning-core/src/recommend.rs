//! Recommendation orchestrator: composes the four sub-engines into combined
//! decision-support dashboards for a single event.
//!
//! Sequencing matters only in one place: the revenue projection depends on
//! the attendance forecast. Everything else could run in parallel on the
//! caller's side.

use chrono::NaiveDate;
use contracts::{
    AllocationResult, BenchmarkComparison, CategoryPerformance, DailyRevenue, DateSpan,
    EngineError, EventProfile, ForecastResult, HistoricalEventSample, LayoutConstraints,
    PlanningReport, RevenueProjection, RoiOutlook, Vendor, VenueSpace, WeatherSnapshot,
    SCHEMA_VERSION_V1,
};
use tracing::debug;

use crate::{budget, forecast, layout, risk};

/// Everything the orchestrator needs, resolved by collaborators up front.
/// All fields are plain values; absent optional inputs degrade the report
/// instead of failing it.
#[derive(Debug, Clone)]
pub struct PlanningRequest {
    pub event: EventProfile,
    pub historical_events: Vec<HistoricalEventSample>,
    pub weather: Option<WeatherSnapshot>,
    pub competing_events: Vec<DateSpan>,
    pub venue: Option<VenueSpace>,
    pub vendors: Vec<Vendor>,
    pub constraints: Option<LayoutConstraints>,
    pub total_budget: Option<f64>,
    pub historical_performance: Vec<CategoryPerformance>,
    pub as_of: NaiveDate,
}

/// Ticket revenue implied by the forecast; free events project zero.
pub fn revenue_projection(event: &EventProfile, forecast: &ForecastResult) -> RevenueProjection {
    let ticket_price = event.ticket_price.unwrap_or(0.0);
    let gross = f64::from(forecast.predicted_attendance) * ticket_price;

    RevenueProjection {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        ticket_price,
        gross_ticket_revenue: gross,
        low_estimate: forecast.confidence_intervals.p95.low.max(0.0) * ticket_price,
        high_estimate: forecast.confidence_intervals.p95.high * ticket_price,
        daily_revenue: forecast
            .daily_forecast
            .iter()
            .map(|day| DailyRevenue {
                date: day.date,
                expected_revenue: f64::from(day.expected_attendance) * ticket_price,
            })
            .collect(),
    }
}

/// Projected return on the event budget; a zero budget yields ROI 0.0
/// rather than a division error.
pub fn roi_outlook(
    revenue: &RevenueProjection,
    total_budget: f64,
    allocation: Option<&AllocationResult>,
) -> RoiOutlook {
    let projected_roi = if total_budget > 0.0 {
        (revenue.gross_ticket_revenue - total_budget) / total_budget
    } else {
        0.0
    };

    let assessment = if projected_roi >= 0.5 {
        "strong return; ticket revenue comfortably covers the budget"
    } else if projected_roi >= 0.0 {
        "break-even to modest return; monitor pre-sales closely"
    } else if projected_roi >= -0.5 {
        "projected shortfall; secondary revenue streams needed"
    } else {
        "ticket revenue covers less than half the budget"
    };

    RoiOutlook {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        projected_revenue: revenue.gross_ticket_revenue,
        total_budget,
        projected_roi,
        assessment: assessment.to_string(),
        opportunities: allocation
            .map(|result| result.opportunities.clone())
            .unwrap_or_default(),
    }
}

/// Predicted attendance against the historical mean. Empty history, or a
/// zero mean, reports `no_historical_data` instead of a ratio.
pub fn benchmark_analysis(
    forecast: &ForecastResult,
    historical: &[HistoricalEventSample],
) -> BenchmarkComparison {
    if historical.is_empty() {
        return BenchmarkComparison::NoHistoricalData;
    }
    let mean = historical
        .iter()
        .map(|sample| f64::from(sample.attendance))
        .sum::<f64>()
        / historical.len() as f64;
    if mean <= 0.0 {
        return BenchmarkComparison::NoHistoricalData;
    }
    BenchmarkComparison::Historical {
        historical_mean_attendance: mean,
        predicted_to_historical_ratio: f64::from(forecast.predicted_attendance) / mean,
        sample_count: historical.len(),
    }
}

/// Full report: forecast → risk → budget → layout → dashboards.
///
/// Missing optional inputs (budget, venue, vendors) omit the corresponding
/// section and are recorded in `defaults_applied`; malformed required
/// inputs and validation failures are terminal.
pub fn plan_event(request: &PlanningRequest) -> Result<PlanningReport, EngineError> {
    let event = &request.event;
    let mut defaults_applied = Vec::new();

    let forecast = forecast::forecast(
        event,
        &request.historical_events,
        request.weather.as_ref(),
        &request.competing_events,
        request.as_of,
    )?;
    debug!(
        event_id = %event.event_id,
        predicted = forecast.predicted_attendance,
        confidence = forecast.confidence_score,
        "attendance forecast complete"
    );

    let risk = risk::assess(
        event,
        request.total_budget,
        request.as_of,
        &contracts::RiskCategory::ALL,
    )?;
    debug!(
        event_id = %event.event_id,
        overall = risk.overall_risk_score,
        level = risk.risk_level.as_str(),
        "risk assessment complete"
    );

    let allocation = match request.total_budget {
        Some(total_budget) => Some(budget::allocate(
            event,
            total_budget,
            &request.historical_performance,
            request.as_of,
        )?),
        None => {
            defaults_applied.push("no_budget_supplied".to_string());
            None
        }
    };

    let layout = match (&request.venue, request.vendors.is_empty()) {
        (Some(venue), false) => Some(layout::optimize(
            venue,
            &request.vendors,
            request.constraints,
        )?),
        _ => {
            defaults_applied.push("no_layout_inputs".to_string());
            None
        }
    };

    // Revenue depends on the forecast and must sequence after it.
    let revenue = revenue_projection(event, &forecast);
    let roi = request
        .total_budget
        .map(|total_budget| roi_outlook(&revenue, total_budget, allocation.as_ref()));
    let benchmark = benchmark_analysis(&forecast, &request.historical_events);

    defaults_applied.extend(forecast.defaults_applied.iter().cloned());
    defaults_applied.sort();
    defaults_applied.dedup();

    Ok(PlanningReport {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        event_id: event.event_id.clone(),
        forecast,
        risk,
        allocation,
        layout,
        revenue,
        roi,
        benchmark,
        defaults_applied,
    })
}
