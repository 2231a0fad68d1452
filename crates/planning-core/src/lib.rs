//! Pure decision-support engines for event planning: attendance forecasting,
//! vendor layout optimization, budget allocation, risk assessment, and the
//! orchestrator that composes them.
//!
//! Every public operation is a pure function of its inputs. There are no
//! caches, no singletons, and no clock reads; "now"-relative rules take an
//! explicit `as_of` date, so identical inputs always produce identical
//! outputs and concurrent callers need no locks.

use contracts::{EngineError, EventProfile};

pub mod budget;
pub mod forecast;
pub mod geometry;
pub mod layout;
pub mod recommend;
pub mod risk;

pub use recommend::{plan_event, PlanningRequest};

/// Shared required-input checks applied by every sub-engine.
pub(crate) fn validate_event(event: &EventProfile) -> Result<(), EngineError> {
    if event.event_id.is_empty() {
        return Err(EngineError::missing_input("event_id is empty"));
    }
    if event.capacity == 0 {
        return Err(EngineError::missing_input("event capacity must be positive"));
    }
    if event.end_date < event.start_date {
        return Err(EngineError::missing_input(format!(
            "end_date {} precedes start_date {}",
            event.end_date, event.start_date
        )));
    }
    Ok(())
}
