//! Contract-aware coinview rule.
//!
//! Replaces the plain transaction runner on contract-enabled networks: the
//! same ordered sub-pipeline runs per transaction, but transactions carrying
//! contract-exec outputs additionally invoke the execution capability, and
//! its side effects (refunds, condensing transaction, state root) must
//! reconcile exactly with the block.

use std::sync::Arc;

use cruxd_consensus::params::ConsensusParams;
use cruxd_consensus::Hash256;
use cruxd_primitives::transaction::{Transaction, TxOut};
use cruxd_rules::context::RuleContext;
use cruxd_rules::counters::PerformanceCounters;
use cruxd_rules::engine::{ConsensusKind, ConsensusRule};
use cruxd_rules::error::{BlockValidationError, ConsensusError};
use cruxd_rules::queue::ScriptVerifyPool;
use cruxd_rules::rules::finality::TransactionFinalityRule;
use cruxd_rules::rules::inputs::CheckInputsRule;
use cruxd_rules::rules::merkle_root::BlockMerkleRootRule;
use cruxd_rules::rules::reward::CheckRewardRule;
use cruxd_rules::rules::scripts::EvaluateScriptsRule;
use cruxd_rules::rules::sigops::SigOpCostRule;
use cruxd_script::flags::ScriptFlags;
use cruxd_script::standard::{is_contract_exec, is_contract_internal_transfer, is_contract_spend};
use cruxd_script::verifier::{ScriptVerifier, TransactionChecker};

use crate::executor::{ContractExecutionResult, ContractExecutor, ContractTransactionContext};

/// Short-circuits contract scripts before delegating to the wrapped
/// verifier: an output owned by a contract is spendable only through the
/// contract-spend opcode, never by an ordinary signature.
pub struct ContractAwareVerifier {
    inner: Arc<dyn ScriptVerifier>,
}

impl ContractAwareVerifier {
    pub fn new(inner: Arc<dyn ScriptVerifier>) -> Self {
        Self { inner }
    }
}

impl ScriptVerifier for ContractAwareVerifier {
    fn verify_script(
        &self,
        script_sig: &[u8],
        script_pubkey: &[u8],
        checker: &TransactionChecker<'_>,
        flags: ScriptFlags,
    ) -> bool {
        if is_contract_exec(script_pubkey) || is_contract_internal_transfer(script_pubkey) {
            return is_contract_spend(script_sig);
        }
        self.inner
            .verify_script(script_sig, script_pubkey, checker, flags)
    }
}

pub struct ContractCoinViewRule {
    executor: Arc<dyn ContractExecutor>,
    counters: Arc<PerformanceCounters>,
    rules: Vec<Box<dyn ConsensusRule>>,
}

impl ContractCoinViewRule {
    pub fn new(
        executor: Arc<dyn ContractExecutor>,
        verifier: Arc<dyn ScriptVerifier>,
        pool: Arc<ScriptVerifyPool>,
        counters: Arc<PerformanceCounters>,
    ) -> Self {
        let verifier: Arc<dyn ScriptVerifier> = Arc::new(ContractAwareVerifier::new(verifier));
        let rules: Vec<Box<dyn ConsensusRule>> = vec![
            Box::new(TransactionFinalityRule::new(ConsensusKind::ProofOfWork)),
            Box::new(SigOpCostRule::new()),
            Box::new(CheckInputsRule::new(ConsensusKind::ProofOfWork)),
            Box::new(EvaluateScriptsRule::new(
                ConsensusKind::ProofOfWork,
                verifier,
                pool,
                Arc::clone(&counters),
            )),
        ];
        Self {
            executor,
            counters,
            rules,
        }
    }

    fn execute_contract(
        &self,
        context: &RuleContext,
        tx: &Transaction,
        state_root: &Hash256,
    ) -> Result<ContractExecutionResult, BlockValidationError> {
        let first_input = tx.vin.first().ok_or(BlockValidationError::Defect(
            "contract transaction has no inputs",
        ))?;
        let sender_script_pubkey = context.set.get_output_for(first_input)?.script_pubkey.clone();
        let coinbase = context
            .block
            .transactions
            .first()
            .ok_or(BlockValidationError::Defect("block has no coinbase"))?;
        let coinbase_script_pubkey = coinbase
            .vout
            .first()
            .map(|output| output.script_pubkey.clone())
            .unwrap_or_default();
        let transaction_fee = context.set.get_value_in(tx)? - tx.total_out();

        let execution_context = ContractTransactionContext {
            block_height: context.position.height as u64,
            coinbase_script_pubkey,
            sender_script_pubkey,
            transaction_fee,
            transaction: tx.clone(),
        };
        Ok(self.executor.execute(state_root, &execution_context))
    }
}

fn validate_submitted_transaction(tx: &Transaction) -> Result<(), ConsensusError> {
    if tx
        .vin
        .iter()
        .any(|input| is_contract_spend(&input.script_sig))
    {
        return Err(ConsensusError::UserOpSpend);
    }
    if tx
        .vout
        .iter()
        .any(|output| is_contract_internal_transfer(&output.script_pubkey))
    {
        return Err(ConsensusError::UserInternalCall);
    }
    Ok(())
}

/// Gas refunds occupy consecutive coinbase outputs starting after the
/// miner payout; each must match the computed refund exactly.
fn validate_refunds(
    refunds: &[TxOut],
    coinbase: &Transaction,
    cursor: &mut usize,
) -> Result<(), ConsensusError> {
    for refund in refunds {
        let matched = coinbase
            .vout
            .get(*cursor)
            .ok_or(ConsensusError::UnequalRefundAmounts)?;
        if refund.value != matched.value || refund.script_pubkey != matched.script_pubkey {
            return Err(ConsensusError::UnequalRefundAmounts);
        }
        *cursor += 1;
    }
    Ok(())
}

impl ConsensusRule for ContractCoinViewRule {
    fn name(&self) -> &'static str {
        "contract coinview"
    }

    fn initialize(&mut self, params: &ConsensusParams) {
        for rule in self.rules.iter_mut() {
            rule.initialize(params);
        }
    }

    fn run(&self, context: &mut RuleContext) -> Result<(), BlockValidationError> {
        self.counters.add_processed_blocks(1);
        let block = Arc::clone(&context.block);
        let mut state_root = context.position.prev_state_root;
        let mut generated: Option<Transaction> = None;
        let mut refund_cursor: usize = 1;

        for (index, tx) in block.transactions.iter().enumerate() {
            self.counters.add_processed_transactions(1);
            context.set_current_transaction(index);
            for rule in &self.rules {
                rule.run(context)?;
            }

            if !context.skip_validation {
                if let Some(expected) = generated.take() {
                    if expected.txid() != tx.txid() {
                        return Err(ConsensusError::UnequalCondensingTx.into());
                    }
                } else {
                    validate_submitted_transaction(tx)?;
                    let executes_contract = tx
                        .vout
                        .iter()
                        .any(|output| is_contract_exec(&output.script_pubkey));
                    if executes_contract {
                        cruxd_log::log_trace!(
                            "executing contract transaction {} in block at height {}",
                            index,
                            context.position.height
                        );
                        let coinbase = &block.transactions[0];
                        let result = self.execute_contract(context, tx, &state_root)?;
                        validate_refunds(&result.refunds, coinbase, &mut refund_cursor)?;
                        if let Some(condensing) = result.generated_transaction {
                            generated = Some(condensing);
                        }
                        state_root = result.state_root;
                    }
                }
            }

            if tx.is_coinstake() {
                context.total_coinstake_value_in = context.set.get_value_in(tx)?;
            }
            context.set.update(
                tx,
                context.position.height,
                context.position.median_time_past,
            )?;
        }
        context.clear_current_transaction();

        if !context.skip_validation {
            // A promised condensing transaction that never appeared is as
            // fatal as one that appeared wrong.
            if generated.is_some() {
                return Err(ConsensusError::UnequalCondensingTx.into());
            }
            if state_root != block.header.hash_state_root {
                return Err(ConsensusError::UnequalStateRoots.into());
            }
        }

        Ok(())
    }
}

/// The canonical pipeline for contract-enabled networks.
pub fn contract_rule_set(
    executor: Arc<dyn ContractExecutor>,
    verifier: Arc<dyn ScriptVerifier>,
    pool: Arc<ScriptVerifyPool>,
    counters: Arc<PerformanceCounters>,
) -> Vec<Box<dyn ConsensusRule>> {
    vec![
        Box::new(BlockMerkleRootRule),
        Box::new(ContractCoinViewRule::new(executor, verifier, pool, counters)),
        Box::new(CheckRewardRule::new(ConsensusKind::ProofOfWork)),
    ]
}
