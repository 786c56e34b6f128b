//! Background script-verification pool.
//!
//! Checks are pure functions of data captured at scheduling time; the coin
//! view is never shared with the workers. Jobs start as soon as they are
//! submitted and each returns a handle, so the caller controls when (and in
//! what order) results are collected.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver};
use cruxd_primitives::block::Block;
use cruxd_primitives::transaction::TxOut;
use cruxd_script::flags::ScriptFlags;
use cruxd_script::verifier::{PrecomputedTransactionData, ScriptVerifier, TransactionChecker};

/// One input's verification job, self-contained for the worker thread.
pub struct ScriptCheck {
    pub block: Arc<Block>,
    pub tx_index: usize,
    pub input_index: usize,
    pub spent_output: TxOut,
    pub txdata: Arc<PrecomputedTransactionData>,
    pub flags: ScriptFlags,
}

impl ScriptCheck {
    pub fn execute(&self, verifier: &dyn ScriptVerifier) -> bool {
        let tx = &self.block.transactions[self.tx_index];
        let input = &tx.vin[self.input_index];
        let checker = TransactionChecker {
            transaction: tx,
            input_index: self.input_index,
            amount: self.spent_output.value,
            txdata: &self.txdata,
        };
        verifier.verify_script(
            &input.script_sig,
            &self.spent_output.script_pubkey,
            &checker,
            self.flags,
        )
    }
}

/// Completion handle for one submitted check.
pub struct VerifyHandle {
    result: Receiver<bool>,
}

impl VerifyHandle {
    /// Blocks until the check finishes. A worker that died without
    /// reporting counts as a failed check.
    pub fn wait(&self) -> bool {
        self.result.recv().unwrap_or(false)
    }
}

/// Dedicated worker pool for script verification.
pub struct ScriptVerifyPool {
    pool: rayon::ThreadPool,
}

impl ScriptVerifyPool {
    /// Builds a pool with `threads` workers; zero selects rayon's default.
    pub fn new(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        Ok(Self { pool })
    }

    /// Starts `check` immediately and returns its completion handle.
    pub fn submit(
        &self,
        verifier: Arc<dyn ScriptVerifier>,
        check: ScriptCheck,
    ) -> VerifyHandle {
        let (sender, receiver) = bounded(1);
        self.pool.spawn(move || {
            let passed = check.execute(verifier.as_ref());
            let _ = sender.send(passed);
        });
        VerifyHandle { result: receiver }
    }
}
