//! Input resolution, maturity, and fee accounting.

use std::sync::Arc;

use cruxd_consensus::money::money_range;
use cruxd_consensus::params::{ConsensusOptions, ConsensusParams};

use crate::coinview::UnspentOutputs;
use crate::context::RuleContext;
use crate::engine::{ConsensusKind, ConsensusRule};
use crate::error::{BlockValidationError, ConsensusError};

/// Enforces the confirmation window before coinbase and coinstake outputs
/// may be spent. The boundary spend (age exactly equal to the maturity)
/// passes.
fn check_maturity(
    coins: &UnspentOutputs,
    spend_height: i32,
    options: &ConsensusOptions,
) -> Result<(), ConsensusError> {
    if coins.is_coinbase && spend_height - coins.height < options.coinbase_maturity {
        cruxd_log::log_debug!(
            "coinbase from height {} spent at {}, maturity {}",
            coins.height,
            spend_height,
            options.coinbase_maturity
        );
        return Err(ConsensusError::BadTransactionPrematureCoinbaseSpending);
    }
    if coins.is_coinstake && spend_height - coins.height < options.coinstake_maturity {
        cruxd_log::log_debug!(
            "coinstake from height {} spent at {}, maturity {}",
            coins.height,
            spend_height,
            options.coinstake_maturity
        );
        return Err(ConsensusError::BadTransactionPrematureCoinstakeSpending);
    }
    Ok(())
}

pub struct CheckInputsRule {
    kind: ConsensusKind,
    options: Option<ConsensusOptions>,
}

impl CheckInputsRule {
    pub fn new(kind: ConsensusKind) -> Self {
        Self {
            kind,
            options: None,
        }
    }
}

impl ConsensusRule for CheckInputsRule {
    fn name(&self) -> &'static str {
        "check inputs"
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
            .ok_or(BlockValidationError::Defect("inputs rule not initialized"))?;
        let block = Arc::clone(&context.block);
        let tx = &block.transactions[context.current_transaction_index()?];
        if tx.is_coinbase() {
            return Ok(());
        }

        if !context.set.have_inputs(tx) {
            return Err(ConsensusError::BadTransactionMissingInput.into());
        }

        let spend_height = context.position.height;
        let mut value_in: i64 = 0;
        for input in &tx.vin {
            let coins = context
                .set
                .access_coins(&input.prevout.hash)
                .ok_or(ConsensusError::BadTransactionMissingInput)?;
            check_maturity(coins, spend_height, options)?;

            let value = coins
                .try_get_output(input.prevout.index)
                .ok_or(ConsensusError::BadTransactionMissingInput)?
                .value;
            if !money_range(value, options.max_money) {
                return Err(ConsensusError::BadTransactionInputValueOutOfRange.into());
            }
            value_in = value_in
                .checked_add(value)
                .ok_or(ConsensusError::BadTransactionInputValueOutOfRange)?;
            if !money_range(value_in, options.max_money) {
                return Err(ConsensusError::BadTransactionInputValueOutOfRange.into());
            }
        }

        // A coinstake pays out more than it spends; the surplus is the stake
        // reward and is validated by the reward rule, not as a fee.
        if self.kind == ConsensusKind::ProofOfStake && tx.is_coinstake() {
            return Ok(());
        }

        if value_in < tx.total_out() {
            return Err(ConsensusError::BadTransactionInBelowOut.into());
        }

        let tx_fee = value_in - tx.total_out();
        if tx_fee < 0 {
            return Err(ConsensusError::BadTransactionNegativeFee.into());
        }
        context.total_fees = context
            .total_fees
            .checked_add(tx_fee)
            .ok_or(ConsensusError::BadTransactionFeeOutOfRange)?;
        if !money_range(context.total_fees, options.max_money) {
            return Err(ConsensusError::BadTransactionFeeOutOfRange.into());
        }

        Ok(())
    }
}
