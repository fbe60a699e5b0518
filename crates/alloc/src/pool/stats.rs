//! Pool statistics

use core::cell::Cell;
use core::fmt;

/// Snapshot of a pool's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Successful `allocate` calls
    pub allocations: usize,
    /// Elements handed out across all successful calls
    pub allocated_elements: usize,
    /// Rejected `allocate` calls
    pub failed_allocations: usize,
    /// `deallocate` calls (all no-ops)
    pub deallocate_calls: usize,
}

impl PoolStats {
    /// Share of `allocate` calls that were rejected
    pub fn failure_rate(&self) -> f64 {
        let total = self.allocations + self.failed_allocations;
        if total == 0 {
            0.0
        } else {
            self.failed_allocations as f64 / total as f64
        }
    }

    /// Average elements per successful allocation
    pub fn average_request(&self) -> f64 {
        if self.allocations == 0 {
            0.0
        } else {
            self.allocated_elements as f64 / self.allocations as f64
        }
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} allocations ({} elements), {} failed, {} deallocate calls",
            self.allocations, self.allocated_elements, self.failed_allocations, self.deallocate_calls
        )
    }
}

/// Types that expose allocation statistics
pub trait StatisticsProvider {
    /// Current statistics
    fn statistics(&self) -> PoolStats;

    /// Zero every counter; allocation state is untouched
    fn reset_statistics(&self);

    /// Whether counters are being maintained
    fn statistics_enabled(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
struct Counters {
    allocations: Cell<usize>,
    allocated_elements: Cell<usize>,
    failed_allocations: Cell<usize>,
    deallocate_calls: Cell<usize>,
}

fn bump(counter: &Cell<usize>, by: usize) {
    counter.set(counter.get().saturating_add(by));
}

/// Counters that cost nothing when tracking is off
#[derive(Debug)]
pub(crate) struct OptionalStats {
    counters: Option<Counters>,
}

impl OptionalStats {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            counters: enabled.then(Counters::default),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.counters.is_some()
    }

    pub(crate) fn record_allocation(&self, count: usize) {
        if let Some(ref counters) = self.counters {
            bump(&counters.allocations, 1);
            bump(&counters.allocated_elements, count);
        }
    }

    pub(crate) fn record_failure(&self) {
        if let Some(ref counters) = self.counters {
            bump(&counters.failed_allocations, 1);
        }
    }

    pub(crate) fn record_deallocate(&self) {
        if let Some(ref counters) = self.counters {
            bump(&counters.deallocate_calls, 1);
        }
    }

    pub(crate) fn snapshot(&self) -> PoolStats {
        self.counters
            .as_ref()
            .map(|c| PoolStats {
                allocations: c.allocations.get(),
                allocated_elements: c.allocated_elements.get(),
                failed_allocations: c.failed_allocations.get(),
                deallocate_calls: c.deallocate_calls.get(),
            })
            .unwrap_or_default()
    }

    pub(crate) fn reset(&self) {
        if let Some(ref counters) = self.counters {
            counters.allocations.set(0);
            counters.allocated_elements.set(0);
            counters.failed_allocations.set(0);
            counters.deallocate_calls.set(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_stats_stay_zero() {
        let stats = OptionalStats::new(false);
        stats.record_allocation(4);
        stats.record_failure();

        assert!(!stats.is_enabled());
        assert_eq!(stats.snapshot(), PoolStats::default());
    }

    #[test]
    fn records_and_resets() {
        let stats = OptionalStats::new(true);
        stats.record_allocation(2);
        stats.record_allocation(3);
        stats.record_failure();
        stats.record_deallocate();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.allocations, 2);
        assert_eq!(snapshot.allocated_elements, 5);
        assert_eq!(snapshot.failed_allocations, 1);
        assert_eq!(snapshot.deallocate_calls, 1);
        assert!((snapshot.failure_rate() - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(snapshot.average_request(), 2.5);

        stats.reset();
        assert_eq!(stats.snapshot(), PoolStats::default());
    }

    #[test]
    fn display_summarises() {
        let stats = PoolStats {
            allocations: 2,
            allocated_elements: 5,
            failed_allocations: 1,
            deallocate_calls: 0,
        };
        assert_eq!(
            stats.to_string(),
            "2 allocations (5 elements), 1 failed, 0 deallocate calls"
        );
    }
}
