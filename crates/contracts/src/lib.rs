//! Contract execution integrated into consensus validation.

pub mod executor;
pub mod rule;

pub use executor::{ContractExecutionResult, ContractExecutor, ContractTransactionContext};
pub use rule::{contract_rule_set, ContractAwareVerifier, ContractCoinViewRule};
