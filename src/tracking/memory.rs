//! In-memory sink using `DashMap` tallies.
//!
//! Keeps per-variant counters plus the raw event log. Useful for tests,
//! demos, and hosts that flush tallies on their own schedule.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;

use super::{EventKind, ExperimentEvent, ExposureSink};
use crate::Result;

/// Counters for one `(experiment, variant)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantTally {
    /// Number of exposure events.
    pub exposures: u64,
    /// Conversion counts keyed by conversion type.
    pub conversions: HashMap<String, u64>,
}

impl VariantTally {
    /// Total conversions across all conversion types.
    #[must_use]
    pub fn total_conversions(&self) -> u64 {
        self.conversions.values().sum()
    }
}

/// Thread-safe recording sink.
///
/// # Example
///
/// ```rust
/// use variant_bucketing::tracking::{ExperimentEvent, ExposureSink, MemoryExposureSink};
///
/// let sink = MemoryExposureSink::new();
/// sink.report_exposure(&ExperimentEvent::exposure("heroCTA", "control", None))?;
/// assert_eq!(sink.tally("heroCTA", "control").exposures, 1);
/// # Ok::<(), variant_bucketing::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryExposureSink {
    tallies: DashMap<(String, String), VariantTally>,
    events: Mutex<Vec<ExperimentEvent>>,
}

impl MemoryExposureSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the tally for a pair. Unseen pairs return an empty tally.
    #[must_use]
    pub fn tally(&self, experiment_id: &str, variant_id: &str) -> VariantTally {
        self.tallies
            .get(&(experiment_id.to_string(), variant_id.to_string()))
            .map(|t| t.value().clone())
            .unwrap_or_default()
    }

    /// Get all tallies for one experiment keyed by variant id.
    #[must_use]
    pub fn tallies_for_experiment(&self, experiment_id: &str) -> HashMap<String, VariantTally> {
        self.tallies
            .iter()
            .filter(|entry| entry.key().0 == experiment_id)
            .map(|entry| (entry.key().1.clone(), entry.value().clone()))
            .collect()
    }

    /// Snapshot of every recorded event in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<ExperimentEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if no events have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all tallies and events.
    pub fn clear(&self) {
        self.tallies.clear();
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    // The log and the tallies are updated together; a poisoned log lock is
    // recovered so the two never disagree.
    fn record(&self, event: &ExperimentEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());

        let key = (
            event.experiment_id().to_string(),
            event.variant_id().to_string(),
        );
        let mut tally = self.tallies.entry(key).or_default();
        match event.kind() {
            EventKind::Exposure => tally.exposures += 1,
            EventKind::Conversion => {
                let kind = event.conversion_type().unwrap_or_default().to_string();
                *tally.conversions.entry(kind).or_insert(0) += 1;
            }
        }
    }
}

impl ExposureSink for MemoryExposureSink {
    fn report_exposure(&self, event: &ExperimentEvent) -> Result<()> {
        self.record(event);
        Ok(())
    }

    fn report_conversion(&self, event: &ExperimentEvent) -> Result<()> {
        self.record(event);
        Ok(())
    }
}
