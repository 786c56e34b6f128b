//! Script verification scheduling.

use std::sync::Arc;

use cruxd_script::verifier::{PrecomputedTransactionData, ScriptVerifier};

use crate::context::RuleContext;
use crate::counters::PerformanceCounters;
use crate::engine::{ConsensusKind, ConsensusRule};
use crate::error::BlockValidationError;
use crate::queue::{ScriptCheck, ScriptVerifyPool};

/// Schedules one verification job per input against the pool. Results are
/// collected here in submission order but awaited only by the reward rule.
pub struct EvaluateScriptsRule {
    kind: ConsensusKind,
    verifier: Arc<dyn ScriptVerifier>,
    pool: Arc<ScriptVerifyPool>,
    counters: Arc<PerformanceCounters>,
}

impl EvaluateScriptsRule {
    pub fn new(
        kind: ConsensusKind,
        verifier: Arc<dyn ScriptVerifier>,
        pool: Arc<ScriptVerifyPool>,
        counters: Arc<PerformanceCounters>,
    ) -> Self {
        Self {
            kind,
            verifier,
            pool,
            counters,
        }
    }
}

impl ConsensusRule for EvaluateScriptsRule {
    fn name(&self) -> &'static str {
        "evaluate scripts"
    }

    fn run(&self, context: &mut RuleContext) -> Result<(), BlockValidationError> {
        if context.skip_validation {
            return Ok(());
        }
        let block = Arc::clone(&context.block);
        let tx_index = context.current_transaction_index()?;
        let tx = &block.transactions[tx_index];
        if self.kind.is_exempt(tx) {
            return Ok(());
        }

        // Signing data is shared by every input of the transaction.
        let txdata = Arc::new(PrecomputedTransactionData::new(tx));
        for (input_index, input) in tx.vin.iter().enumerate() {
            self.counters.add_processed_inputs(1);
            let spent_output = context.set.get_output_for(input)?.clone();
            let check = ScriptCheck {
                block: Arc::clone(&block),
                tx_index,
                input_index,
                spent_output,
                txdata: Arc::clone(&txdata),
                flags: context.flags.script_flags,
            };
            let handle = self.pool.submit(Arc::clone(&self.verifier), check);
            context.pending_checks.push(handle);
        }

        Ok(())
    }
}
