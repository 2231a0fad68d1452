//! Vendor layout optimization: grid placement, access infrastructure,
//! geometric validation, and efficiency/crowd-flow/accessibility scoring.
//!
//! Placement is a deterministic raster scan; validation reports every
//! violated constraint so the caller can surface all issues at once.

use contracts::{
    AlternativeLayout, EmergencyExit, EngineError, ExitLocation, Facility, FacilityKind,
    LayoutConstraints, LayoutPlan, LayoutPriority, LayoutResult, Orientation, Pathway, PathwayKind,
    Point, Vendor, VendorCategory, VendorPlacement, VenueSpace, SCHEMA_VERSION_V1,
};

use crate::geometry::{distance, polyline_length};

/// Assumed-optimal average vendor spacing used to normalize the efficiency
/// distance term, metres.
const OPTIMAL_AVG_SPACING: f64 = 20.0;

/// Fraction of each grid cell given to the vendor footprint; the rest is
/// circulation space.
const FOOTPRINT_RATIO: f64 = 0.8;

/// Keyword-based vendor categorization; unmatched business types default to
/// retail.
pub fn categorize(business_type: &str) -> VendorCategory {
    let lowered = business_type.to_ascii_lowercase();
    let matches_any = |keywords: &[&str]| keywords.iter().any(|keyword| lowered.contains(keyword));

    if matches_any(&["food", "restaurant", "catering", "beverage"]) {
        VendorCategory::Food
    } else if matches_any(&["retail", "shop", "merchandise", "craft"]) {
        VendorCategory::Retail
    } else if matches_any(&["service", "consultation", "repair"]) {
        VendorCategory::Service
    } else if matches_any(&["entertainment", "music", "performance"]) {
        VendorCategory::Entertainment
    } else {
        VendorCategory::Retail
    }
}

/// Place vendors on a grid, attach pathways/exits/facilities, validate, and
/// score. Fails with the full violation list when the plan breaks a hard
/// constraint.
pub fn optimize(
    venue: &VenueSpace,
    vendors: &[Vendor],
    constraints: Option<LayoutConstraints>,
) -> Result<LayoutResult, EngineError> {
    if vendors.is_empty() {
        return Err(EngineError::missing_input(
            "vendor list is empty; nothing to place",
        ));
    }
    if venue.capacity == 0 {
        return Err(EngineError::missing_input("venue capacity must be positive"));
    }

    let constraints = constraints.unwrap_or_else(|| LayoutConstraints::for_venue(venue));
    let plan = build_plan(venue, vendors, &constraints);
    validate_plan(&plan, &constraints)?;
    Ok(score_plan(plan, &constraints))
}

/// Re-run the layout under alternative priorities. `crowd_flow` widens every
/// pathway by 20%; `vendor_revenue` re-scores the baseline placement
/// unchanged (no reordering algorithm exists in the source system).
pub fn alternatives(
    venue: &VenueSpace,
    vendors: &[Vendor],
    constraints: Option<LayoutConstraints>,
    priorities: &[LayoutPriority],
) -> Result<Vec<AlternativeLayout>, EngineError> {
    if vendors.is_empty() {
        return Err(EngineError::missing_input(
            "vendor list is empty; nothing to place",
        ));
    }
    if venue.capacity == 0 {
        return Err(EngineError::missing_input("venue capacity must be positive"));
    }
    let constraints = constraints.unwrap_or_else(|| LayoutConstraints::for_venue(venue));

    priorities
        .iter()
        .map(|priority| {
            let mut plan = build_plan(venue, vendors, &constraints);
            if *priority == LayoutPriority::CrowdFlow {
                for pathway in &mut plan.pathways {
                    pathway.width *= 1.2;
                }
            }
            validate_plan(&plan, &constraints)?;
            Ok(AlternativeLayout {
                priority: *priority,
                result: score_plan(plan, &constraints),
            })
        })
        .collect()
}

fn build_plan(venue: &VenueSpace, vendors: &[Vendor], constraints: &LayoutConstraints) -> LayoutPlan {
    let vendor_count = vendors.len() as f64;
    let grid_size = (venue.usable_area() / vendor_count).sqrt();
    // Approximate row boundary from the source system.
    let row_limit = 1000_f64.sqrt() * grid_size;

    let mut placements = Vec::with_capacity(vendors.len());
    let mut x = 0.0;
    let mut y = 0.0;
    for category in VendorCategory::PLACEMENT_ORDER {
        for vendor in vendors {
            if categorize(&vendor.business_type) != category {
                continue;
            }
            let default_side = grid_size * FOOTPRINT_RATIO;
            let width = vendor.width.unwrap_or(default_side).min(default_side);
            let height = vendor.height.unwrap_or(default_side).min(default_side);
            placements.push(VendorPlacement {
                vendor_id: vendor.vendor_id.clone(),
                category,
                x,
                y,
                width,
                height,
                orientation: if height > width {
                    Orientation::Vertical
                } else {
                    Orientation::Horizontal
                },
            });
            x += grid_size;
            if x > row_limit {
                x = 0.0;
                y += grid_size;
            }
        }
    }

    let max_x = placements.iter().map(|p| p.x).fold(0.0, f64::max);
    let max_y = placements.iter().map(|p| p.y).fold(0.0, f64::max);
    let east = max_x + grid_size;
    let north = max_y + grid_size;

    let pathways = vec![
        Pathway {
            kind: PathwayKind::Main,
            width: constraints.emergency_access_width,
            coordinates: vec![Point::new(0.0, north), Point::new(east, north)],
        },
        Pathway {
            kind: PathwayKind::Secondary,
            width: 3.0,
            coordinates: vec![Point::new(east, 0.0), Point::new(east, north)],
        },
    ];

    let emergency_exits = vec![
        EmergencyExit {
            location: ExitLocation::North,
            width: constraints.emergency_access_width,
        },
        EmergencyExit {
            location: ExitLocation::South,
            width: constraints.emergency_access_width,
        },
    ];

    let facility_locations = vec![
        Facility {
            kind: FacilityKind::Restroom,
            position: Point::new(east, 0.0),
        },
        Facility {
            kind: FacilityKind::Restroom,
            position: Point::new(east, max_y),
        },
        Facility {
            kind: FacilityKind::InfoBooth,
            position: Point::new(1.0, 1.0),
        },
        Facility {
            kind: FacilityKind::FirstAid,
            position: Point::new(max_x / 2.0, north),
        },
        Facility {
            kind: FacilityKind::Security,
            position: Point::new(0.0, north),
        },
    ];

    LayoutPlan {
        placements,
        pathways,
        emergency_exits,
        facility_locations,
    }
}

/// Hard constraints: pairwise spacing, exit count, pathway widths. Naive
/// O(n²) spacing check kept for output compatibility.
fn validate_plan(plan: &LayoutPlan, constraints: &LayoutConstraints) -> Result<(), EngineError> {
    let mut violations = Vec::new();

    for (index, a) in plan.placements.iter().enumerate() {
        for b in plan.placements.iter().skip(index + 1) {
            let spacing = distance(Point::new(a.x, a.y), Point::new(b.x, b.y));
            if spacing < constraints.min_distance_between_vendors {
                violations.push(format!(
                    "vendors {} and {} are {spacing:.2}m apart (minimum {:.2}m)",
                    a.vendor_id, b.vendor_id, constraints.min_distance_between_vendors
                ));
            }
        }
    }

    if plan.emergency_exits.len() < 2 {
        violations.push(format!(
            "{} emergency exit(s); at least 2 required",
            plan.emergency_exits.len()
        ));
    }

    for pathway in &plan.pathways {
        if pathway.width < 2.0 {
            violations.push(format!(
                "{:?} pathway width {:.2}m is below the 2.0m minimum",
                pathway.kind, pathway.width
            ));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(EngineError::validation(violations))
    }
}

fn score_plan(plan: LayoutPlan, constraints: &LayoutConstraints) -> LayoutResult {
    let efficiency_score = efficiency(&plan, constraints);
    let accessibility_score = accessibility(&plan);
    let crowd_flow_score = crowd_flow(&plan, accessibility_score);
    let recommendations = recommendations(efficiency_score, crowd_flow_score, accessibility_score);

    LayoutResult {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        layout: plan,
        efficiency_score,
        crowd_flow_score,
        accessibility_score,
        recommendations,
    }
}

fn average_pairwise_spacing(plan: &LayoutPlan) -> Option<f64> {
    let mut total = 0.0;
    let mut pairs = 0_u32;
    for (index, a) in plan.placements.iter().enumerate() {
        for b in plan.placements.iter().skip(index + 1) {
            total += distance(Point::new(a.x, a.y), Point::new(b.x, b.y));
            pairs += 1;
        }
    }
    (pairs > 0).then(|| total / f64::from(pairs))
}

fn efficiency(plan: &LayoutPlan, _constraints: &LayoutConstraints) -> f64 {
    let mut score: f64 = 0.7;

    // Single-vendor plans have no pairs; treat spacing as optimal.
    let normalized_spacing = average_pairwise_spacing(plan)
        .map(|avg| (avg / OPTIMAL_AVG_SPACING).min(1.0))
        .unwrap_or(1.0);
    if normalized_spacing > 0.8 {
        score += 0.15;
    }

    let pathway_ratio = plan.pathways.len() as f64 / plan.placements.len() as f64;
    let widths_ok = plan.pathways.iter().all(|pathway| pathway.width >= 3.0);
    if pathway_ratio >= 0.1 && widths_ok {
        score += 0.10;
    }

    let facility_kinds = [
        FacilityKind::Restroom,
        FacilityKind::InfoBooth,
        FacilityKind::FirstAid,
        FacilityKind::Security,
    ];
    let all_facilities = facility_kinds.iter().all(|kind| {
        plan.facility_locations
            .iter()
            .any(|facility| facility.kind == *kind)
    });
    if all_facilities {
        score += 0.05;
    }

    score.min(1.0)
}

fn crowd_flow(plan: &LayoutPlan, accessibility_score: f64) -> f64 {
    let total_length: f64 = plan
        .pathways
        .iter()
        .map(|pathway| polyline_length(&pathway.coordinates))
        .sum();
    let coverage = (total_length / (plan.placements.len() as f64 * 10.0)).min(1.0);

    let min_width = plan
        .pathways
        .iter()
        .map(|pathway| pathway.width)
        .fold(f64::INFINITY, f64::min);
    let bottleneck = if min_width >= 4.0 {
        1.0
    } else if min_width >= 3.0 {
        0.8
    } else if min_width >= 2.0 {
        0.6
    } else {
        0.4
    };

    (coverage + bottleneck + accessibility_score) / 3.0
}

fn accessibility(plan: &LayoutPlan) -> f64 {
    let exit_component = if plan.emergency_exits.len() >= 2 {
        0.4
    } else {
        0.2
    };

    let wide_fraction = if plan.pathways.is_empty() {
        0.0
    } else {
        plan.pathways
            .iter()
            .filter(|pathway| pathway.width >= 3.0)
            .count() as f64
            / plan.pathways.len() as f64
    };

    let restroom_component = if plan
        .facility_locations
        .iter()
        .any(|facility| facility.kind == FacilityKind::Restroom)
    {
        0.2
    } else {
        0.0
    };

    exit_component + 0.4 * wide_fraction + restroom_component
}

fn recommendations(efficiency: f64, crowd_flow: f64, accessibility: f64) -> Vec<String> {
    let mut recommendations = Vec::new();
    if efficiency < 0.8 {
        recommendations.push("tighten grid spacing to reduce dead circulation space".to_string());
    }
    if crowd_flow < 0.7 {
        recommendations.push("extend or widen pathways to relieve bottlenecks".to_string());
    }
    if accessibility < 0.8 {
        recommendations.push("add restrooms or widen secondary pathways".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("layout meets spacing and access targets".to_string());
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Rect;

    use crate::geometry::rectangles_overlap;

    fn vendor(id: &str, business_type: &str) -> Vendor {
        Vendor {
            vendor_id: id.to_string(),
            business_type: business_type.to_string(),
            width: None,
            height: None,
        }
    }

    fn mixed_vendors() -> Vec<Vendor> {
        vec![
            vendor("v01", "Street Food Stall"),
            vendor("v02", "Craft Beverage Bar"),
            vendor("v03", "Catering Collective"),
            vendor("v04", "Food Truck"),
            vendor("v05", "Restaurant Popup"),
            vendor("v06", "Merchandise Stand"),
            vendor("v07", "Record Shop"),
            vendor("v08", "Vintage Retail"),
            vendor("v09", "Phone Repair"),
            vendor("v10", "Consultation Booth"),
        ]
    }

    #[test]
    fn keyword_categorization() {
        assert_eq!(categorize("Gourmet Food Cart"), VendorCategory::Food);
        assert_eq!(categorize("MERCHANDISE tent"), VendorCategory::Retail);
        assert_eq!(categorize("bike repair"), VendorCategory::Service);
        assert_eq!(categorize("Live Music Stage"), VendorCategory::Entertainment);
        assert_eq!(categorize("mystery tent"), VendorCategory::Retail);
    }

    #[test]
    fn food_vendors_are_placed_first() {
        let venue = VenueSpace {
            capacity: 1000,
            outdoor: false,
        };
        let result = optimize(&venue, &mixed_vendors(), None).unwrap();
        let categories: Vec<VendorCategory> = result
            .layout
            .placements
            .iter()
            .map(|placement| placement.category)
            .collect();
        let first_non_food = categories
            .iter()
            .position(|category| *category != VendorCategory::Food)
            .unwrap();
        assert_eq!(first_non_food, 5);
        assert!(categories[..5]
            .iter()
            .all(|category| *category == VendorCategory::Food));
    }

    #[test]
    fn scenario_ten_vendors_in_capacity_1000_venue() {
        let venue = VenueSpace {
            capacity: 1000,
            outdoor: false,
        };
        let result = optimize(&venue, &mixed_vendors(), None).unwrap();
        let placements = &result.layout.placements;
        assert_eq!(placements.len(), 10);

        // grid_size = sqrt(1500 / 10) ≈ 12.25, footprint ≈ 9.8 square.
        let expected_side = (1500.0_f64 / 10.0).sqrt() * 0.8;
        assert!((placements[0].width - expected_side).abs() < 1e-9);

        for (index, a) in placements.iter().enumerate() {
            for b in placements.iter().skip(index + 1) {
                let spacing = distance(Point::new(a.x, a.y), Point::new(b.x, b.y));
                assert!(spacing >= 3.0);
                let rect_a = Rect {
                    x: a.x,
                    y: a.y,
                    width: a.width,
                    height: a.height,
                };
                let rect_b = Rect {
                    x: b.x,
                    y: b.y,
                    width: b.width,
                    height: b.height,
                };
                assert!(!rectangles_overlap(&rect_a, &rect_b));
            }
        }
    }

    #[test]
    fn infrastructure_is_always_emitted() {
        let venue = VenueSpace {
            capacity: 600,
            outdoor: true,
        };
        let result = optimize(&venue, &mixed_vendors()[..3], None).unwrap();
        assert_eq!(result.layout.emergency_exits.len(), 2);
        assert!(result
            .layout
            .emergency_exits
            .iter()
            .all(|exit| exit.width == 5.0));
        assert_eq!(result.layout.pathways.len(), 2);
        assert!(result
            .layout
            .facility_locations
            .iter()
            .filter(|facility| facility.kind == FacilityKind::Restroom)
            .count()
            >= 2);
    }

    #[test]
    fn scores_stay_in_unit_range() {
        let venue = VenueSpace {
            capacity: 1000,
            outdoor: false,
        };
        let result = optimize(&venue, &mixed_vendors(), None).unwrap();
        for score in [
            result.efficiency_score,
            result.crowd_flow_score,
            result.accessibility_score,
        ] {
            assert!((0.0..=1.0).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn tight_constraints_report_every_violation() {
        let venue = VenueSpace {
            capacity: 100,
            outdoor: false,
        };
        let constraints = LayoutConstraints {
            min_distance_between_vendors: 50.0,
            ..LayoutConstraints::default()
        };
        let error = optimize(&venue, &mixed_vendors(), Some(constraints)).unwrap_err();
        assert_eq!(error.code, contracts::ErrorCode::ValidationFailed);
        // 10 vendors on a tight grid: many pairs violate, and all must be listed.
        assert!(error.violations.len() > 1);
    }

    #[test]
    fn empty_vendor_list_is_rejected() {
        let venue = VenueSpace {
            capacity: 1000,
            outdoor: false,
        };
        let error = optimize(&venue, &[], None).unwrap_err();
        assert_eq!(error.code, contracts::ErrorCode::MissingInput);
    }

    #[test]
    fn zero_capacity_venue_is_rejected_for_alternatives() {
        let venue = VenueSpace {
            capacity: 0,
            outdoor: false,
        };
        let error = alternatives(
            &venue,
            &mixed_vendors(),
            None,
            &[LayoutPriority::CrowdFlow],
        )
        .unwrap_err();
        assert_eq!(error.code, contracts::ErrorCode::MissingInput);
    }

    #[test]
    fn crowd_flow_alternative_widens_pathways() {
        let venue = VenueSpace {
            capacity: 1000,
            outdoor: false,
        };
        let baseline = optimize(&venue, &mixed_vendors(), None).unwrap();
        let results = alternatives(
            &venue,
            &mixed_vendors(),
            None,
            &[LayoutPriority::CrowdFlow, LayoutPriority::VendorRevenue],
        )
        .unwrap();

        let crowd = &results[0];
        assert_eq!(crowd.priority, LayoutPriority::CrowdFlow);
        for (widened, base) in crowd
            .result
            .layout
            .pathways
            .iter()
            .zip(baseline.layout.pathways.iter())
        {
            assert!((widened.width - base.width * 1.2).abs() < 1e-9);
        }

        // vendor_revenue is an acknowledged no-op: identical to baseline.
        assert_eq!(results[1].result, baseline);
    }
}
