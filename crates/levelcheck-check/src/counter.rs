//! Per-device, per-category finding counts (distilled spec §4.6, §7): a
//! count is always incremented, but emission beyond `circuit_error_limit`
//! is silently suppressed. [`ErrorCounters`] also accumulates the
//! per-subcircuit summary printed at the end of every category (the
//! `PrintAndResetCircuitErrors` equivalent named in SPEC_FULL §4.6).

use indexmap::IndexMap;
use levelcheck_core::{CircuitId, DeviceId, RunOptions};

use crate::finding::Category;

#[derive(Debug, Default)]
pub struct ErrorCounters {
    per_device: IndexMap<(Category, DeviceId), u32>,
    per_subcircuit: IndexMap<(Category, CircuitId), u32>,
}

impl ErrorCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `category` on `device` (owned by
    /// `subcircuit`), returning whether it should still be emitted (the
    /// count is incremented either way).
    pub fn record(
        &mut self,
        options: &RunOptions,
        category: Category,
        device: DeviceId,
        subcircuit: CircuitId,
    ) -> bool {
        let count = self.per_device.entry((category, device)).or_insert(0);
        *count += 1;
        let should_emit = !options.device_limit_reached(*count - 1);
        *self.per_subcircuit.entry((category, subcircuit)).or_insert(0) += 1;
        should_emit
    }

    /// Total occurrences recorded for `category`, across every device,
    /// including those suppressed past the per-device limit (distilled
    /// spec §8 "checker monotonicity": this total never decreases as the
    /// limit is raised by a later run, since the cap only affects
    /// emission).
    pub fn total(&self, category: Category) -> u32 {
        self.per_device
            .iter()
            .filter(|((c, _), _)| *c == category)
            .map(|(_, count)| *count)
            .sum()
    }

    /// Per-subcircuit occurrence counts for `category`, in first-seen
    /// order, for the end-of-category summary line.
    pub fn subcircuit_summary(&self, category: Category) -> Vec<(CircuitId, u32)> {
        self.per_subcircuit
            .iter()
            .filter(|((c, _), _)| *c == category)
            .map(|((_, circuit), count)| (*circuit, *count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_always_emits_but_still_counts() {
        let mut counters = ErrorCounters::new();
        let opts = RunOptions { circuit_error_limit: 0, ..RunOptions::default() };
        let device = DeviceId::new(0);
        let circuit = CircuitId::new(0);
        for _ in 0..5 {
            assert!(counters.record(&opts, Category::ForwardDiode, device, circuit));
        }
        assert_eq!(counters.total(Category::ForwardDiode), 5);
    }

    #[test]
    fn limit_suppresses_emission_but_keeps_counting() {
        let mut counters = ErrorCounters::new();
        let opts = RunOptions { circuit_error_limit: 2, ..RunOptions::default() };
        let device = DeviceId::new(1);
        let circuit = CircuitId::new(0);
        assert!(counters.record(&opts, Category::PossibleLeak, device, circuit));
        assert!(counters.record(&opts, Category::PossibleLeak, device, circuit));
        assert!(!counters.record(&opts, Category::PossibleLeak, device, circuit));
        assert!(!counters.record(&opts, Category::PossibleLeak, device, circuit));
        assert_eq!(counters.total(Category::PossibleLeak), 4);
    }

    #[test]
    fn raising_the_limit_never_decreases_total_count() {
        let mut low = ErrorCounters::new();
        let mut high = ErrorCounters::new();
        let tight = RunOptions { circuit_error_limit: 1, ..RunOptions::default() };
        let loose = RunOptions { circuit_error_limit: 10, ..RunOptions::default() };
        let device = DeviceId::new(2);
        let circuit = CircuitId::new(0);
        for _ in 0..4 {
            low.record(&tight, Category::OvervoltageVgs, device, circuit);
            high.record(&loose, Category::OvervoltageVgs, device, circuit);
        }
        assert_eq!(low.total(Category::OvervoltageVgs), high.total(Category::OvervoltageVgs));
    }
}
