//! Contract-execution capability boundary.

use cruxd_consensus::{Amount, Hash256};
use cruxd_primitives::transaction::{Transaction, TxOut};

/// Everything the executor needs to run one contract transaction.
#[derive(Clone, Debug)]
pub struct ContractTransactionContext {
    pub block_height: u64,
    /// Script of the coinbase's first output; gas refunds pay back to it.
    pub coinbase_script_pubkey: Vec<u8>,
    /// Script of the output spent by the transaction's first input.
    pub sender_script_pubkey: Vec<u8>,
    pub transaction_fee: Amount,
    pub transaction: Transaction,
}

/// Side effects of executing one contract transaction.
#[derive(Clone, Debug)]
pub struct ContractExecutionResult {
    /// Gas refunds that must appear verbatim in the coinbase.
    pub refunds: Vec<TxOut>,
    /// Condensing transaction that must appear later in the block, if any.
    pub generated_transaction: Option<Transaction>,
    /// State trie root after execution.
    pub state_root: Hash256,
}

/// External contract execution engine. Invoked sequentially, one
/// transaction at a time, threading the running state root.
pub trait ContractExecutor: Send + Sync {
    fn execute(
        &self,
        state_root: &Hash256,
        context: &ContractTransactionContext,
    ) -> ContractExecutionResult;
}
