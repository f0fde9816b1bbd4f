//! Model event sink boundary.
//!
//! Model code MUST NOT touch obs::metrics directly.
//! All instrumentation flows through ModelEvent and ModelSink.
use crate::obs::metrics::{self, OwnerCounters};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn ModelSink>> = RefCell::new(None);
}

///
/// ModelEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModelEvent {
    OwnerPrepared { owner: &'static str, attributes: u64 },
    CompositeFinalized { owner: &'static str },
    ShapeCreated { owner: &'static str },
    ShapeReused { owner: &'static str },
    UniqueGroupRegistered { owner: &'static str },
    UniqueGroupSkipped { owner: &'static str },
    LookupPrepared { owner: &'static str },
    LookupRejected { owner: &'static str },
    ArityMismatch { owner: &'static str },
}

impl ModelEvent {
    #[must_use]
    pub const fn owner(&self) -> &'static str {
        match self {
            Self::OwnerPrepared { owner, .. }
            | Self::CompositeFinalized { owner }
            | Self::ShapeCreated { owner }
            | Self::ShapeReused { owner }
            | Self::UniqueGroupRegistered { owner }
            | Self::UniqueGroupSkipped { owner }
            | Self::LookupPrepared { owner }
            | Self::LookupRejected { owner }
            | Self::ArityMismatch { owner } => owner,
        }
    }
}

///
/// ModelSink
///

pub trait ModelSink {
    fn record(&self, event: ModelEvent);
}

/// GlobalModelSink
/// Default sink that writes into the thread-local counters.

pub(crate) struct GlobalModelSink;

impl ModelSink for GlobalModelSink {
    fn record(&self, event: ModelEvent) {
        metrics::with_state_mut(|m| {
            let bump = |counter: &mut u64| *counter = counter.saturating_add(1);
            let entry: &mut OwnerCounters = m.owners.entry(event.owner().to_string()).or_default();

            match event {
                ModelEvent::OwnerPrepared { attributes, .. } => {
                    bump(&mut m.totals.owners_prepared);
                    entry.attributes = entry.attributes.saturating_add(attributes);
                }
                ModelEvent::CompositeFinalized { .. } => {
                    bump(&mut m.totals.composites_finalized);
                    bump(&mut entry.composites_finalized);
                }
                ModelEvent::ShapeCreated { .. } => bump(&mut m.totals.shapes_created),
                ModelEvent::ShapeReused { .. } => bump(&mut m.totals.shapes_reused),
                ModelEvent::UniqueGroupRegistered { .. } => {
                    bump(&mut m.totals.unique_groups_registered);
                    bump(&mut entry.unique_groups);
                }
                ModelEvent::UniqueGroupSkipped { .. } => {
                    bump(&mut m.totals.unique_groups_skipped);
                }
                ModelEvent::LookupPrepared { .. } => {
                    bump(&mut m.totals.lookups_prepared);
                    bump(&mut entry.lookups_prepared);
                }
                ModelEvent::LookupRejected { .. } => {
                    bump(&mut m.totals.lookups_rejected);
                    bump(&mut entry.lookups_rejected);
                }
                ModelEvent::ArityMismatch { .. } => {
                    bump(&mut m.totals.arity_mismatches);
                    bump(&mut entry.arity_mismatches);
                }
            }
        });
    }
}

pub(crate) const GLOBAL_MODEL_SINK: GlobalModelSink = GlobalModelSink;

pub(crate) fn record(event: ModelEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // Preconditions:
        // - `ptr` was produced from a valid `&dyn ModelSink` in `with_model_sink`.
        // - `with_model_sink` restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        //
        // Aliasing:
        // - Only a shared reference is materialized, matching the shared borrow
        //   used to install the override.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_MODEL_SINK.record(event);
    }
}

/// Snapshot the current counters.
#[must_use]
pub fn model_report() -> metrics::ModelReport {
    metrics::report()
}

/// Reset all counters.
pub fn model_reset_all() {
    metrics::reset();
}

/// Run a closure with a temporary sink override.
pub fn with_model_sink<T>(sink: &dyn ModelSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn ModelSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // Preconditions:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn ModelSink, *const dyn ModelSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}
