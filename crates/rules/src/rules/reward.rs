//! Script-result collection and block reward verification.

use cruxd_consensus::params::ConsensusParams;
use cruxd_consensus::rewards::{proof_of_stake_reward, proof_of_work_reward};
use cruxd_consensus::Amount;
use cruxd_primitives::block::Block;

use crate::context::RuleContext;
use crate::engine::{ConsensusKind, ConsensusRule};
use crate::error::{BlockValidationError, ConsensusError};

/// The finalization rule: joins every pending script check, then verifies
/// the block reward against the fees accumulated by the pipeline.
pub struct CheckRewardRule {
    kind: ConsensusKind,
    params: Option<ConsensusParams>,
}

impl CheckRewardRule {
    pub fn new(kind: ConsensusKind) -> Self {
        Self { kind, params: None }
    }
}

fn check_coinbase_reward(
    block: &Block,
    fees: Amount,
    height: i32,
    params: &ConsensusParams,
) -> Result<(), BlockValidationError> {
    let coinbase = block
        .transactions
        .first()
        .ok_or(BlockValidationError::Defect("block has no coinbase"))?;
    let block_reward = fees + proof_of_work_reward(height, params);
    if coinbase.total_out() > block_reward {
        cruxd_log::log_debug!(
            "coinbase pays {} but reward at height {} is {}",
            coinbase.total_out(),
            height,
            block_reward
        );
        return Err(ConsensusError::BadCoinbaseAmount.into());
    }
    Ok(())
}

impl ConsensusRule for CheckRewardRule {
    fn name(&self) -> &'static str {
        "check reward"
    }

    fn initialize(&mut self, params: &ConsensusParams) {
        self.params = Some(params.clone());
    }

    fn run(&self, context: &mut RuleContext) -> Result<(), BlockValidationError> {
        let handles = std::mem::take(&mut context.pending_checks);
        if context.skip_validation {
            cruxd_log::log_trace!(
                "reward and script validation skipped for block at height {}",
                context.position.height
            );
            return Ok(());
        }
        let params = self
            .params
            .as_ref()
            .ok_or(BlockValidationError::Defect("reward rule not initialized"))?;

        // Join every scheduled check before reporting. Completion order is
        // unconstrained; any single failure rejects the block.
        let mut all_passed = true;
        for handle in &handles {
            if !handle.wait() {
                all_passed = false;
            }
        }
        if !all_passed {
            return Err(ConsensusError::BadTransactionScriptError.into());
        }

        let height = context.position.height;
        match self.kind {
            ConsensusKind::ProofOfWork => {
                check_coinbase_reward(&context.block, context.total_fees, height, params)?;
            }
            ConsensusKind::ProofOfStake => {
                if context.block.is_proof_of_stake() {
                    let coinstake = &context.block.transactions[1];
                    let stake_reward =
                        coinstake.total_out() - context.total_coinstake_value_in;
                    let expected = context.total_fees + proof_of_stake_reward(height, params);
                    if stake_reward > expected {
                        cruxd_log::log_debug!(
                            "coinstake reward {} exceeds calculated reward {}",
                            stake_reward,
                            expected
                        );
                        return Err(ConsensusError::BadCoinstakeAmount.into());
                    }
                } else {
                    check_coinbase_reward(&context.block, context.total_fees, height, params)?;
                }
            }
        }

        Ok(())
    }
}
