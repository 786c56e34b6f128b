//! Rule pipeline engine.

use std::sync::Arc;

use cruxd_consensus::params::ConsensusParams;
use cruxd_primitives::transaction::Transaction;
use cruxd_script::verifier::ScriptVerifier;

use crate::context::RuleContext;
use crate::counters::PerformanceCounters;
use crate::error::BlockValidationError;
use crate::queue::ScriptVerifyPool;
use crate::rules::finality::TransactionFinalityRule;
use crate::rules::inputs::CheckInputsRule;
use crate::rules::merkle_root::BlockMerkleRootRule;
use crate::rules::reward::CheckRewardRule;
use crate::rules::runner::TransactionRulesRunner;
use crate::rules::scripts::EvaluateScriptsRule;
use crate::rules::sigops::SigOpCostRule;
use crate::rules::update::UpdateCoinViewRule;

/// The atomic, composable unit of validation logic.
///
/// A rule binds to the network once via `initialize` and is then invoked
/// with a mutable borrow of the per-attempt context. Rules never retain the
/// context and never retry; retry policy belongs to the caller.
pub trait ConsensusRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn initialize(&mut self, _params: &ConsensusParams) {}

    fn run(&self, context: &mut RuleContext) -> Result<(), BlockValidationError>;
}

/// Which consensus the pipeline enforces. Behavioral differences between the
/// two are dispatched explicitly on this tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConsensusKind {
    ProofOfWork,
    ProofOfStake,
}

impl ConsensusKind {
    /// Transactions exempt from finality, fee, and script validation:
    /// the coinbase always, and under proof-of-stake also the coinstake
    /// (its stake proof is checked by the staking collaborator and its
    /// value balance by the reward rule).
    pub fn is_exempt(self, tx: &Transaction) -> bool {
        tx.is_coinbase() || (self == ConsensusKind::ProofOfStake && tx.is_coinstake())
    }
}

/// Runs an ordered sequence of consensus rules over one block attempt.
pub struct ConsensusRuleEngine {
    params: Arc<ConsensusParams>,
    rules: Vec<Box<dyn ConsensusRule>>,
}

impl ConsensusRuleEngine {
    pub fn new(params: Arc<ConsensusParams>, mut rules: Vec<Box<dyn ConsensusRule>>) -> Self {
        for rule in rules.iter_mut() {
            rule.initialize(&params);
        }
        Self { params, rules }
    }

    pub fn params(&self) -> &ConsensusParams {
        &self.params
    }

    /// Blocks at or below the last checkpoint are trusted: heavy checks are
    /// bypassed while the coin view is still updated.
    pub fn should_skip_validation(&self, height: i32) -> bool {
        height <= self.params.last_checkpoint_height()
    }

    /// Threads `context` through every rule in order, propagating the first
    /// failure. No partial block is ever half-accepted.
    pub fn validate(&self, context: &mut RuleContext) -> Result<(), BlockValidationError> {
        for rule in &self.rules {
            if let Err(error) = rule.run(context) {
                cruxd_log::log_debug!(
                    "rule {} rejected block at height {}: {}",
                    rule.name(),
                    context.position.height,
                    error
                );
                return Err(error);
            }
        }
        Ok(())
    }
}

fn transaction_rules(
    kind: ConsensusKind,
    verifier: Arc<dyn ScriptVerifier>,
    pool: Arc<ScriptVerifyPool>,
    counters: Arc<PerformanceCounters>,
) -> Vec<Box<dyn ConsensusRule>> {
    vec![
        Box::new(TransactionFinalityRule::new(kind)),
        Box::new(SigOpCostRule::new()),
        Box::new(CheckInputsRule::new(kind)),
        Box::new(EvaluateScriptsRule::new(kind, verifier, pool, counters)),
        Box::new(UpdateCoinViewRule),
    ]
}

/// The canonical proof-of-work pipeline.
pub fn pow_rule_set(
    verifier: Arc<dyn ScriptVerifier>,
    pool: Arc<ScriptVerifyPool>,
    counters: Arc<PerformanceCounters>,
) -> Vec<Box<dyn ConsensusRule>> {
    vec![
        Box::new(BlockMerkleRootRule),
        Box::new(TransactionRulesRunner::new(
            Arc::clone(&counters),
            transaction_rules(ConsensusKind::ProofOfWork, verifier, pool, counters),
        )),
        Box::new(CheckRewardRule::new(ConsensusKind::ProofOfWork)),
    ]
}

/// The canonical proof-of-stake pipeline.
pub fn pos_rule_set(
    verifier: Arc<dyn ScriptVerifier>,
    pool: Arc<ScriptVerifyPool>,
    counters: Arc<PerformanceCounters>,
) -> Vec<Box<dyn ConsensusRule>> {
    vec![
        Box::new(BlockMerkleRootRule),
        Box::new(TransactionRulesRunner::new(
            Arc::clone(&counters),
            transaction_rules(ConsensusKind::ProofOfStake, verifier, pool, counters),
        )),
        Box::new(CheckRewardRule::new(ConsensusKind::ProofOfStake)),
    ]
}
