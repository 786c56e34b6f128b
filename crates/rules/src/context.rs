//! Shared state for one block validation attempt.

use std::sync::Arc;

use cruxd_consensus::{Amount, Hash256};
use cruxd_primitives::block::Block;
use cruxd_primitives::transaction::Transaction;

use crate::coinview::UnspentOutputSet;
use crate::deployments::DeploymentFlags;
use crate::error::BlockValidationError;
use crate::queue::VerifyHandle;

/// Where the candidate block attaches to the chain.
#[derive(Clone, Copy, Debug)]
pub struct ChainPosition {
    /// Height the candidate block will occupy.
    pub height: i32,
    /// Median time past of the previous block.
    pub median_time_past: i64,
    /// Contract state root committed by the previous block's header; all
    /// zero on networks without contract execution.
    pub prev_state_root: Hash256,
}

/// Per-attempt context threaded through every rule.
///
/// Created fresh per candidate block, mutated by the rules in order, and
/// discarded when the attempt ends. One strongly-typed field per
/// intermediate value; rules never stash ad-hoc state elsewhere.
pub struct RuleContext {
    pub block: Arc<Block>,
    pub position: ChainPosition,
    pub flags: DeploymentFlags,
    /// The coin view this attempt exclusively owns and mutates.
    pub set: UnspentOutputSet,
    /// Heavy verification is bypassed for checkpoint-trusted blocks; the
    /// coin view update still runs.
    pub skip_validation: bool,
    /// Fees accumulated across the block's transactions.
    pub total_fees: Amount,
    /// Weighted signature-operation cost accumulated across the block.
    pub sigops_cost: i64,
    /// Script checks scheduled so far, in submission order.
    pub pending_checks: Vec<VerifyHandle>,
    /// Value spent by the coinstake, recorded during the coin view update.
    pub total_coinstake_value_in: Amount,
    current_transaction: Option<usize>,
}

impl RuleContext {
    pub fn new(
        block: Arc<Block>,
        position: ChainPosition,
        flags: DeploymentFlags,
        set: UnspentOutputSet,
    ) -> Self {
        Self {
            block,
            position,
            flags,
            set,
            skip_validation: false,
            total_fees: 0,
            sigops_cost: 0,
            pending_checks: Vec::new(),
            total_coinstake_value_in: 0,
            current_transaction: None,
        }
    }

    /// Set by the transaction runner before each sub-rule invocation.
    pub fn set_current_transaction(&mut self, index: usize) {
        self.current_transaction = Some(index);
    }

    pub fn clear_current_transaction(&mut self) {
        self.current_transaction = None;
    }

    /// Index of the transaction the sub-pipeline is positioned on.
    ///
    /// Reading it outside the per-transaction phase is a pipeline wiring
    /// defect, not a consensus failure.
    pub fn current_transaction_index(&self) -> Result<usize, BlockValidationError> {
        let index = self
            .current_transaction
            .ok_or(BlockValidationError::Defect(
                "transaction rule ran outside the per-transaction phase",
            ))?;
        if index >= self.block.transactions.len() {
            return Err(BlockValidationError::Defect(
                "current transaction index out of range",
            ));
        }
        Ok(index)
    }

    /// The transaction the sub-pipeline is positioned on.
    pub fn current_transaction(&self) -> Result<&Transaction, BlockValidationError> {
        let index = self.current_transaction_index()?;
        Ok(&self.block.transactions[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cruxd_primitives::block::{Block, BlockHeader, CURRENT_VERSION};
    use cruxd_primitives::outpoint::OutPoint;
    use cruxd_primitives::transaction::{TxIn, TxOut, SEQUENCE_FINAL};

    fn context() -> RuleContext {
        let coinbase = Transaction {
            version: 1,
            vin: vec![TxIn {
                prevout: OutPoint::null(),
                script_sig: vec![0x51],
                sequence: SEQUENCE_FINAL,
                witness: Vec::new(),
            }],
            vout: vec![TxOut {
                value: 50,
                script_pubkey: vec![0x51],
            }],
            lock_time: 0,
        };
        let block = Block {
            header: BlockHeader {
                version: CURRENT_VERSION,
                prev_block: [0u8; 32],
                merkle_root: [0u8; 32],
                hash_state_root: [0u8; 32],
                time: 0,
                bits: 0,
                nonce: 0,
            },
            transactions: vec![coinbase],
        };
        RuleContext::new(
            Arc::new(block),
            ChainPosition {
                height: 1,
                median_time_past: 0,
                prev_state_root: [0u8; 32],
            },
            DeploymentFlags::default(),
            UnspentOutputSet::new(),
        )
    }

    #[test]
    fn current_transaction_outside_loop_is_a_defect() {
        let ctx = context();
        assert!(matches!(
            ctx.current_transaction(),
            Err(BlockValidationError::Defect(_))
        ));
    }

    #[test]
    fn current_transaction_follows_the_pointer() {
        let mut ctx = context();
        ctx.set_current_transaction(0);
        assert!(ctx.current_transaction().is_ok());

        ctx.clear_current_transaction();
        assert!(ctx.current_transaction().is_err());
    }

    #[test]
    fn out_of_range_pointer_is_a_defect() {
        let mut ctx = context();
        ctx.set_current_transaction(7);
        assert!(matches!(
            ctx.current_transaction(),
            Err(BlockValidationError::Defect(_))
        ));
    }
}
