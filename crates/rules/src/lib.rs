//! Block/transaction consensus validation engine.
//!
//! A pipeline of composable rules decides whether a candidate block is valid
//! under proof-of-work or proof-of-stake, consuming an in-memory view of the
//! unspent-output set and an external script-verification capability.

pub mod coinview;
pub mod context;
pub mod counters;
pub mod deployments;
pub mod engine;
pub mod error;
pub mod locktime;
pub mod merkle;
pub mod queue;
pub mod rules;

pub use coinview::{UnspentOutputSet, UnspentOutputs};
pub use context::{ChainPosition, RuleContext};
pub use counters::{PerformanceCounters, PerformanceSnapshot};
pub use deployments::DeploymentFlags;
pub use engine::{pos_rule_set, pow_rule_set, ConsensusKind, ConsensusRule, ConsensusRuleEngine};
pub use error::{BlockValidationError, ConsensusError};
pub use queue::{ScriptCheck, ScriptVerifyPool, VerifyHandle};
