//! Per-transaction rule aggregation.

use std::sync::Arc;

use cruxd_consensus::params::ConsensusParams;

use crate::context::RuleContext;
use crate::counters::PerformanceCounters;
use crate::engine::ConsensusRule;
use crate::error::BlockValidationError;

/// The designated block rule that expands into per-transaction processing:
/// it walks the block's transactions in order, positions the context's
/// current-transaction pointer, and runs the ordered sub-pipeline for each.
pub struct TransactionRulesRunner {
    counters: Arc<PerformanceCounters>,
    rules: Vec<Box<dyn ConsensusRule>>,
}

impl TransactionRulesRunner {
    pub fn new(counters: Arc<PerformanceCounters>, rules: Vec<Box<dyn ConsensusRule>>) -> Self {
        Self { counters, rules }
    }
}

impl ConsensusRule for TransactionRulesRunner {
    fn name(&self) -> &'static str {
        "transaction runner"
    }

    fn initialize(&mut self, params: &ConsensusParams) {
        for rule in self.rules.iter_mut() {
            rule.initialize(params);
        }
    }

    fn run(&self, context: &mut RuleContext) -> Result<(), BlockValidationError> {
        self.counters.add_processed_blocks(1);
        if context.skip_validation {
            cruxd_log::log_trace!(
                "BIP68, sigop cost, and reward validation skipped for block at height {}",
                context.position.height
            );
        }

        for index in 0..context.block.transactions.len() {
            self.counters.add_processed_transactions(1);
            context.set_current_transaction(index);
            for rule in &self.rules {
                rule.run(context)?;
            }
        }
        context.clear_current_transaction();

        Ok(())
    }
}
