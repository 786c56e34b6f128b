//! Process-wide counters of validation work.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PerformanceCounters {
    processed_blocks: AtomicU64,
    processed_transactions: AtomicU64,
    processed_inputs: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PerformanceSnapshot {
    pub processed_blocks: u64,
    pub processed_transactions: u64,
    pub processed_inputs: u64,
}

impl PerformanceCounters {
    pub fn add_processed_blocks(&self, count: u64) {
        self.processed_blocks.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_processed_transactions(&self, count: u64) {
        self.processed_transactions
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_processed_inputs(&self, count: u64) {
        self.processed_inputs.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            processed_blocks: self.processed_blocks.load(Ordering::Relaxed),
            processed_transactions: self.processed_transactions.load(Ordering::Relaxed),
            processed_inputs: self.processed_inputs.load(Ordering::Relaxed),
        }
    }
}
