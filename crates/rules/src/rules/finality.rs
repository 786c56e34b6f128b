//! BIP68 transaction finality.

use std::sync::Arc;

use crate::context::RuleContext;
use crate::engine::{ConsensusKind, ConsensusRule};
use crate::error::{BlockValidationError, ConsensusError};
use crate::locktime::{calculate_sequence_lock, evaluate_sequence_lock};

pub struct TransactionFinalityRule {
    kind: ConsensusKind,
}

impl TransactionFinalityRule {
    pub fn new(kind: ConsensusKind) -> Self {
        Self { kind }
    }
}

impl ConsensusRule for TransactionFinalityRule {
    fn name(&self) -> &'static str {
        "transaction finality"
    }

    fn run(&self, context: &mut RuleContext) -> Result<(), BlockValidationError> {
        if context.skip_validation {
            return Ok(());
        }
        let block = Arc::clone(&context.block);
        let tx = &block.transactions[context.current_transaction_index()?];
        if self.kind.is_exempt(tx) {
            return Ok(());
        }

        if !context.set.have_inputs(tx) {
            return Err(ConsensusError::BadTransactionMissingInput.into());
        }

        // Sequence-lock checks need the creation height and time of every
        // spent coin, which is why they run here and not in context-free
        // transaction checks.
        let mut prev_heights = Vec::with_capacity(tx.vin.len());
        let mut prev_times = Vec::with_capacity(tx.vin.len());
        for input in &tx.vin {
            let coins = context
                .set
                .access_coins(&input.prevout.hash)
                .ok_or(ConsensusError::BadTransactionMissingInput)?;
            prev_heights.push(coins.height);
            prev_times.push(coins.time);
        }

        let lock =
            calculate_sequence_lock(tx, &prev_heights, &prev_times, context.flags.lock_time_flags);
        if !evaluate_sequence_lock(&lock, &context.position) {
            return Err(ConsensusError::BadTransactionNonFinal.into());
        }

        Ok(())
    }
}
