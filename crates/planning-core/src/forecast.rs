//! Attendance forecasting: historical similarity matching plus
//! weather/marketing/competition/seasonal adjustment multipliers.

use chrono::{Datelike, NaiveDate, Weekday};
use contracts::{
    ConfidenceIntervals, DailyForecast, DateSpan, EngineError, EventProfile, ForecastBasis,
    ForecastFactors, ForecastResult, HistoricalEventSample, Interval, WeatherSnapshot,
    SCHEMA_VERSION_V1,
};

use crate::validate_event;

/// Similarity threshold for a historical sample to count toward the base
/// estimate.
const SIMILARITY_CUTOFF: f64 = 0.6;

/// Margin base when fewer than two historical attendances are available.
const DEFAULT_STD_DEV: f64 = 500.0;

/// Point estimate with confidence bands and a per-day breakdown.
///
/// `as_of` anchors every "recently created" rule; the engine never reads
/// the clock.
pub fn forecast(
    event: &EventProfile,
    historical: &[HistoricalEventSample],
    weather: Option<&WeatherSnapshot>,
    competing: &[DateSpan],
    as_of: NaiveDate,
) -> Result<ForecastResult, EngineError> {
    validate_event(event)?;

    let mut defaults_applied = Vec::new();

    let qualifying: Vec<(f64, f64)> = historical
        .iter()
        .map(|sample| (similarity_score(event, sample), f64::from(sample.attendance)))
        .filter(|(score, _)| *score > SIMILARITY_CUTOFF)
        .collect();

    let (basis, base_attendance) = if qualifying.is_empty() {
        if historical.is_empty() {
            defaults_applied.push("no_historical_data".to_string());
        } else {
            defaults_applied.push("no_similar_historical_events".to_string());
        }
        let base = f64::from(event.capacity) * utilization_rate(event);
        (ForecastBasis::CapacityHeuristic, base)
    } else {
        let weight_sum: f64 = qualifying.iter().map(|(score, _)| score).sum();
        let weighted: f64 = qualifying
            .iter()
            .map(|(score, attendance)| score * attendance)
            .sum();
        (ForecastBasis::SimilarHistory, weighted / weight_sum)
    };

    if weather.is_none() {
        defaults_applied.push("no_weather_data".to_string());
    }
    let weather_multiplier = weather.map_or(1.0, weather_factor);
    let marketing_multiplier = marketing_factor(event);
    let competition_multiplier = competition_factor(event, competing);
    let seasonal_multiplier = seasonal_factor(event.start_month());

    let predicted = base_attendance
        * weather_multiplier
        * marketing_multiplier
        * competition_multiplier
        * seasonal_multiplier;
    let predicted_attendance = predicted.round().max(0.0) as u32;

    let confidence_score = confidence(event, historical.len(), as_of);
    let confidence_intervals = intervals(predicted, confidence_score, historical);
    let daily_forecast = daily_breakdown(event, predicted_attendance);

    Ok(ForecastResult {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        event_id: event.event_id.clone(),
        predicted_attendance,
        confidence_score,
        factors: ForecastFactors {
            basis,
            base_attendance,
            qualifying_samples: qualifying.len(),
            weather_multiplier,
            marketing_multiplier,
            competition_multiplier,
            seasonal_multiplier,
        },
        confidence_intervals,
        daily_forecast,
        defaults_applied,
    })
}

/// Weighted closeness of a historical event to the planned one, range [0,1].
///
/// Components: capacity ratio (0.3), duration ratio (0.2), category match
/// (0.3), seasonal proximity (0.2). Unknown capacity or duration contributes
/// a neutral 0.5 ratio.
pub fn similarity_score(event: &EventProfile, sample: &HistoricalEventSample) -> f64 {
    let capacity_ratio = match sample.capacity {
        Some(capacity) if capacity > 0 && event.capacity > 0 => {
            f64::from(event.capacity.min(capacity)) / f64::from(event.capacity.max(capacity))
        }
        _ => 0.5,
    };

    let event_duration = event.duration_days().max(1) as f64;
    let duration_ratio = match sample.duration_days {
        Some(duration) if duration > 0 => {
            let sample_duration = f64::from(duration);
            event_duration.min(sample_duration) / event_duration.max(sample_duration)
        }
        _ => 0.5,
    };

    let category_match = match (&event.category, &sample.category) {
        (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => 1.0,
        _ => 0.3,
    };

    let month_gap = {
        let gap = (event.start_month() as i64 - sample.date.month() as i64).abs();
        gap.min(12 - gap) as f64
    };
    let seasonal_proximity = 1.0 - month_gap / 6.0;

    capacity_ratio * 0.3 + duration_ratio * 0.2 + category_match * 0.3 + seasonal_proximity * 0.2
}

/// Fraction of capacity expected to attend when no similar history exists.
pub fn utilization_rate(event: &EventProfile) -> f64 {
    let mut rate: f64 = 0.70;
    match event.ticket_price {
        Some(price) if price == 0.0 => rate += 0.15,
        Some(price) if price > 5000.0 => rate -= 0.20,
        _ => {}
    }
    let duration = event.duration_days();
    if duration > 3 {
        rate -= 0.10;
    } else if duration == 1 {
        rate += 0.05;
    }
    rate.max(0.30)
}

/// Composed weather multipliers; every absent field is neutral.
fn weather_factor(weather: &WeatherSnapshot) -> f64 {
    let mut factor = 1.0;
    if let Some(temperature) = weather.temperature {
        if !(5.0..=35.0).contains(&temperature) {
            factor *= 0.8;
        } else if (15.0..=25.0).contains(&temperature) {
            factor *= 1.1;
        }
    }
    if let Some(precipitation) = weather.precipitation_probability {
        if precipitation > 70.0 {
            factor *= 0.6;
        } else if precipitation > 30.0 {
            factor *= 0.85;
        }
    }
    if let Some(wind) = weather.wind_speed {
        if wind > 20.0 {
            factor *= 0.9;
        }
    }
    factor
}

fn marketing_factor(event: &EventProfile) -> f64 {
    let mut factor = 1.0;
    match event.social_followers {
        Some(followers) if followers > 10_000 => factor += 0.2,
        Some(followers) if followers > 1_000 => factor += 0.1,
        _ => {}
    }
    match event.marketing_budget {
        Some(budget) if budget > 100_000.0 => factor += 0.15,
        Some(budget) if budget > 50_000.0 => factor += 0.10,
        Some(budget) if budget > 10_000.0 => factor += 0.05,
        _ => {}
    }
    factor
}

/// Each event overlapping a ±7-day window of this event's span costs 0.05,
/// floored at 0.7.
fn competition_factor(event: &EventProfile, competing: &[DateSpan]) -> f64 {
    let window_start = event.start_date - chrono::Duration::days(7);
    let window_end = event.end_date + chrono::Duration::days(7);
    let overlapping = competing
        .iter()
        .filter(|span| span.start <= window_end && span.end >= window_start)
        .count();
    (1.0 - 0.05 * overlapping as f64).max(0.7)
}

/// Fixed month table; May is the single peak.
pub fn seasonal_factor(month: u32) -> f64 {
    match month {
        1 => 0.85,
        2 => 0.90,
        3 => 1.05,
        4 => 1.15,
        5 => 1.20,
        6 => 1.15,
        7 => 1.10,
        8 => 1.05,
        9 => 1.15,
        10 => 1.10,
        11 => 0.95,
        _ => 0.90,
    }
}

fn confidence(event: &EventProfile, sample_count: usize, as_of: NaiveDate) -> f64 {
    let mut score = 0.5;
    score += (sample_count as f64 * 0.1).min(0.3);
    if event.capacity > 0 {
        score += 0.1;
    }
    if event.marketing_budget.is_some() {
        score += 0.05;
    }
    if (as_of - event.created_at).num_days() < 30 {
        score -= 0.1;
    }
    score.clamp(0.0, 0.95)
}

fn intervals(
    predicted: f64,
    confidence: f64,
    historical: &[HistoricalEventSample],
) -> ConfidenceIntervals {
    let std_dev = if historical.len() < 2 {
        DEFAULT_STD_DEV
    } else {
        population_std_dev(historical)
    };
    let margin = std_dev * (1.0 - confidence);
    let band = |z: f64| Interval {
        low: (predicted - margin * z).max(0.0),
        high: predicted + margin * z,
    };
    ConfidenceIntervals {
        p95: band(1.96),
        p80: band(1.28),
        p50: band(0.67),
    }
}

fn population_std_dev(historical: &[HistoricalEventSample]) -> f64 {
    let n = historical.len() as f64;
    let mean = historical
        .iter()
        .map(|sample| f64::from(sample.attendance))
        .sum::<f64>()
        / n;
    let variance = historical
        .iter()
        .map(|sample| (f64::from(sample.attendance) - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt()
}

/// Per-day shares; first matching rule wins (weekend, opening, closing,
/// day-1 peak of a >2-day run). Rounded shares are not re-balanced.
fn daily_breakdown(event: &EventProfile, total: u32) -> Vec<DailyForecast> {
    let duration = event.duration_days().max(1) as u32;
    let last = duration - 1;
    (0..duration)
        .map(|day| {
            let date = event.start_date + chrono::Duration::days(i64::from(day));
            let multiplier = if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                1.3
            } else if day == 0 {
                0.8
            } else if day == last {
                0.9
            } else if day == 1 && duration > 2 {
                1.2
            } else {
                1.0
            };
            DailyForecast {
                date,
                day_index: day,
                expected_attendance: (f64::from(total) * multiplier / f64::from(duration)).round()
                    as u32,
                multiplier,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_event() -> EventProfile {
        EventProfile {
            event_id: "evt_forecast".to_string(),
            capacity: 2000,
            // A Tuesday–Tuesday anchor keeps weekend multipliers out of the
            // single-day checks.
            start_date: date(2026, 5, 5),
            end_date: date(2026, 5, 5),
            category: Some("music".to_string()),
            ticket_price: Some(0.0),
            marketing_budget: None,
            social_followers: None,
            expected_attendance: None,
            created_at: date(2026, 1, 5),
            outdoor: true,
            public_event: true,
        }
    }

    #[test]
    fn free_single_day_event_utilization() {
        assert!((utilization_rate(&base_event()) - 0.90).abs() < 1e-9);
    }

    #[test]
    fn expensive_long_event_utilization_floors() {
        let mut event = base_event();
        event.ticket_price = Some(9000.0);
        event.end_date = date(2026, 5, 12);
        // 0.70 - 0.20 - 0.10 = 0.40, above the floor.
        assert!((utilization_rate(&event) - 0.40).abs() < 1e-9);
    }

    #[test]
    fn scenario_free_may_event_without_history() {
        let result = forecast(&base_event(), &[], None, &[], date(2026, 4, 1)).unwrap();
        // base 2000 * 0.90 = 1800, seasonal May 1.20 → 2160.
        assert_eq!(result.predicted_attendance, 2160);
        assert_eq!(result.factors.basis, ForecastBasis::CapacityHeuristic);
        assert!(result
            .defaults_applied
            .contains(&"no_historical_data".to_string()));
    }

    #[test]
    fn heavy_rain_and_cold_compose() {
        let weather = WeatherSnapshot {
            temperature: Some(2.0),
            precipitation_probability: Some(80.0),
            wind_speed: Some(25.0),
        };
        assert!((weather_factor(&weather) - 0.8 * 0.6 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn mild_weather_boosts() {
        let weather = WeatherSnapshot {
            temperature: Some(20.0),
            precipitation_probability: Some(10.0),
            wind_speed: None,
        };
        assert!((weather_factor(&weather) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn competition_floor_holds() {
        let event = base_event();
        let rival = DateSpan {
            start: event.start_date,
            end: event.end_date,
        };
        let crowded = vec![rival; 10];
        assert!((competition_factor(&event, &crowded) - 0.7).abs() < 1e-9);
        assert!((competition_factor(&event, &crowded[..2]) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn identical_sample_scores_near_one() {
        let event = base_event();
        let sample = HistoricalEventSample {
            attendance: 1500,
            date: event.start_date,
            capacity: Some(event.capacity),
            duration_days: Some(1),
            category: event.category.clone(),
        };
        let score = similarity_score(&event, &sample);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dissimilar_sample_is_excluded() {
        let event = base_event();
        let sample = HistoricalEventSample {
            attendance: 50,
            date: date(2025, 11, 1),
            capacity: Some(50),
            duration_days: Some(14),
            category: Some("conference".to_string()),
        };
        assert!(similarity_score(&event, &sample) <= SIMILARITY_CUTOFF);
    }

    #[test]
    fn similar_history_drives_base_estimate() {
        let event = base_event();
        let samples = vec![
            HistoricalEventSample {
                attendance: 1600,
                date: event.start_date,
                capacity: Some(2000),
                duration_days: Some(1),
                category: Some("music".to_string()),
            },
            HistoricalEventSample {
                attendance: 1400,
                date: date(2025, 6, 1),
                capacity: Some(1800),
                duration_days: Some(1),
                category: Some("music".to_string()),
            },
        ];
        let result = forecast(&event, &samples, None, &[], date(2026, 4, 1)).unwrap();
        assert_eq!(result.factors.basis, ForecastBasis::SimilarHistory);
        assert_eq!(result.factors.qualifying_samples, 2);
        assert!(result.factors.base_attendance > 1400.0);
        assert!(result.factors.base_attendance < 1600.0);
    }

    #[test]
    fn confidence_is_bounded_and_penalizes_new_events() {
        let mut event = base_event();
        event.marketing_budget = Some(60_000.0);
        event.created_at = date(2026, 4, 20);
        let result = forecast(&event, &[], None, &[], date(2026, 5, 1)).unwrap();
        // 0.5 + 0 + 0.1 + 0.05 - 0.1
        assert!((result.confidence_score - 0.55).abs() < 1e-9);
        assert!(result.confidence_score <= 0.95);
    }

    #[test]
    fn daily_breakdown_precedence() {
        let mut event = base_event();
        // Tue 5th .. Fri 8th: opening, peak, plain, closing.
        event.end_date = date(2026, 5, 8);
        let result = forecast(&event, &[], None, &[], date(2026, 4, 1)).unwrap();
        let multipliers: Vec<f64> = result
            .daily_forecast
            .iter()
            .map(|day| day.multiplier)
            .collect();
        assert_eq!(multipliers, vec![0.8, 1.2, 1.0, 0.9]);
    }

    #[test]
    fn invalid_dates_are_rejected() {
        let mut event = base_event();
        event.end_date = date(2026, 5, 1);
        let error = forecast(&event, &[], None, &[], date(2026, 4, 1)).unwrap_err();
        assert_eq!(error.code, contracts::ErrorCode::MissingInput);
    }
}
