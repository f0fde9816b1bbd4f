use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// ModelReport
/// Ephemeral, in-memory counters for model preparation and lookups.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ModelReport {
    pub totals: ModelTotals,
    pub owners: BTreeMap<String, OwnerCounters>,
}

///
/// ModelTotals
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ModelTotals {
    // Owner preparation
    pub owners_prepared: u64,
    pub composites_finalized: u64,

    // Value-type factory
    pub shapes_created: u64,
    pub shapes_reused: u64,

    // Constraints
    pub unique_groups_registered: u64,
    pub unique_groups_skipped: u64,

    // Lookups
    pub lookups_prepared: u64,
    pub lookups_rejected: u64,
    pub arity_mismatches: u64,
}

///
/// OwnerCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct OwnerCounters {
    pub attributes: u64,
    pub composites_finalized: u64,
    pub unique_groups: u64,
    pub lookups_prepared: u64,
    pub lookups_rejected: u64,
    pub arity_mismatches: u64,
}

thread_local! {
    static MODEL_REPORT: RefCell<ModelReport> = RefCell::new(ModelReport::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&ModelReport) -> R) -> R {
    MODEL_REPORT.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut ModelReport) -> R) -> R {
    MODEL_REPORT.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset() {
    with_state_mut(|m| *m = ModelReport::default());
}

#[must_use]
pub(crate) fn report() -> ModelReport {
    with_state(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_owner_counters() {
        with_state_mut(|m| {
            m.totals.shapes_created = 3;
            m.owners.entry("t::Owner".into()).or_default().attributes = 2;
        });

        reset();

        let report = report();
        assert_eq!(report.totals.shapes_created, 0);
        assert!(report.owners.is_empty());
    }

    #[test]
    fn report_serializes_to_json() {
        reset();
        with_state_mut(|m| m.totals.lookups_prepared = 1);

        let json = serde_json::to_value(report()).expect("serialize");

        assert_eq!(json["totals"]["lookups_prepared"], 1);
    }
}
