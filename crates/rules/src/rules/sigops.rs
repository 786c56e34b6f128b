//! Signature-operation cost limits.

use std::sync::Arc;

use cruxd_consensus::params::{ConsensusOptions, ConsensusParams};
use cruxd_primitives::transaction::Transaction;
use cruxd_script::sigops::sigops_count;
use cruxd_script::standard::{p2sh_sigops, witness_sigops};

use crate::coinview::UnspentOutputSet;
use crate::context::RuleContext;
use crate::deployments::DeploymentFlags;
use crate::engine::ConsensusRule;
use crate::error::{BlockValidationError, ConsensusError};

/// Weighted sigop cost of one transaction: legacy sigops always (scaled),
/// P2SH sigops when the deployment is active (scaled, non-coinbase), and
/// witness sigops per input when witness is active. The coinbase contributes
/// only its legacy cost.
///
/// Pure function of the transaction, the coin view, and the flags.
pub fn transaction_sigop_cost(
    tx: &Transaction,
    view: &UnspentOutputSet,
    flags: &DeploymentFlags,
    options: &ConsensusOptions,
) -> Result<i64, ConsensusError> {
    let legacy: u32 = tx
        .vin
        .iter()
        .map(|input| sigops_count(&input.script_sig, false))
        .chain(
            tx.vout
                .iter()
                .map(|output| sigops_count(&output.script_pubkey, false)),
        )
        .sum();
    let mut cost = legacy as i64 * options.witness_scale_factor;

    if tx.is_coinbase() {
        return Ok(cost);
    }

    if flags.p2sh_active() {
        let mut p2sh: i64 = 0;
        for input in &tx.vin {
            let prevout = view.get_output_for(input)?;
            p2sh += p2sh_sigops(&prevout.script_pubkey, &input.script_sig) as i64;
        }
        cost += p2sh * options.witness_scale_factor;
    }

    if flags.witness_active() {
        for input in &tx.vin {
            let prevout = view.get_output_for(input)?;
            cost += witness_sigops(&prevout.script_pubkey, &input.witness) as i64;
        }
    }

    Ok(cost)
}

pub struct SigOpCostRule {
    options: Option<ConsensusOptions>,
}

impl SigOpCostRule {
    pub fn new() -> Self {
        Self { options: None }
    }
}

impl Default for SigOpCostRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsensusRule for SigOpCostRule {
    fn name(&self) -> &'static str {
        "sigop cost"
    }

    fn initialize(&mut self, params: &ConsensusParams) {
        self.options = Some(params.options.clone());
    }

    fn run(&self, context: &mut RuleContext) -> Result<(), BlockValidationError> {
        if context.skip_validation {
            return Ok(());
        }
        let options = self
            .options
            .as_ref()
            .ok_or(BlockValidationError::Defect("sigop rule not initialized"))?;
        let block = Arc::clone(&context.block);
        let tx = &block.transactions[context.current_transaction_index()?];

        let cost = transaction_sigop_cost(tx, &context.set, &context.flags, options)?;
        context.sigops_cost += cost;
        if context.sigops_cost > options.max_block_sigops_cost {
            return Err(ConsensusError::BadBlockSigOps.into());
        }

        Ok(())
    }
}
