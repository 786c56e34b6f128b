//! Coin view update.

use std::sync::Arc;

use crate::context::RuleContext;
use crate::engine::ConsensusRule;
use crate::error::BlockValidationError;

/// Spends the current transaction's inputs and adds its outputs to the coin
/// view. This is the one per-transaction rule that also runs for
/// checkpoint-trusted blocks: skipping verification must never skip state.
pub struct UpdateCoinViewRule;

impl ConsensusRule for UpdateCoinViewRule {
    fn name(&self) -> &'static str {
        "update coin view"
    }

    fn run(&self, context: &mut RuleContext) -> Result<(), BlockValidationError> {
        let block = Arc::clone(&context.block);
        let tx = &block.transactions[context.current_transaction_index()?];

        // The coinstake's input value must be captured before its inputs are
        // spent; the reward rule compares it against the coinstake payout.
        if tx.is_coinstake() {
            context.total_coinstake_value_in = context.set.get_value_in(tx)?;
        }

        context
            .set
            .update(tx, context.position.height, context.position.median_time_past)?;

        Ok(())
    }
}
