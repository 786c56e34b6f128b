//! Script-verification capability boundary.
//!
//! Script interpretation lives outside the consensus engine; the rules only
//! schedule checks against this trait and collect pass/fail results.

use cruxd_consensus::{Amount, Hash256};
use cruxd_primitives::encoding::Encoder;
use cruxd_primitives::hash::sha256d;
use cruxd_primitives::transaction::Transaction;

use crate::flags::ScriptFlags;

/// Signing data shared by every input of one transaction, computed once.
#[derive(Clone, Debug, PartialEq)]
pub struct PrecomputedTransactionData {
    pub hash_prevouts: Hash256,
    pub hash_sequences: Hash256,
    pub hash_outputs: Hash256,
}

impl PrecomputedTransactionData {
    pub fn new(tx: &Transaction) -> Self {
        let mut prevouts = Encoder::new();
        let mut sequences = Encoder::new();
        for input in &tx.vin {
            prevouts.write_hash_le(&input.prevout.hash);
            prevouts.write_u32_le(input.prevout.index);
            sequences.write_u32_le(input.sequence);
        }
        let mut outputs = Encoder::new();
        for output in &tx.vout {
            outputs.write_i64_le(output.value);
            outputs.write_var_bytes(&output.script_pubkey);
        }
        Self {
            hash_prevouts: sha256d(&prevouts.into_inner()),
            hash_sequences: sha256d(&sequences.into_inner()),
            hash_outputs: sha256d(&outputs.into_inner()),
        }
    }
}

/// Everything a verifier needs to check one input's signature.
pub struct TransactionChecker<'a> {
    pub transaction: &'a Transaction,
    pub input_index: usize,
    pub amount: Amount,
    pub txdata: &'a PrecomputedTransactionData,
}

impl<'a> TransactionChecker<'a> {
    /// The witness stack of the input under evaluation.
    pub fn witness(&self) -> &'a [Vec<u8>] {
        &self.transaction.vin[self.input_index].witness
    }
}

/// External script interpreter. Implementations must be safe to call
/// concurrently across independent inputs.
pub trait ScriptVerifier: Send + Sync {
    fn verify_script(
        &self,
        script_sig: &[u8],
        script_pubkey: &[u8],
        checker: &TransactionChecker<'_>,
        flags: ScriptFlags,
    ) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use cruxd_primitives::outpoint::OutPoint;
    use cruxd_primitives::transaction::{TxIn, TxOut, SEQUENCE_FINAL};

    fn sample_tx() -> Transaction {
        Transaction {
            version: 2,
            vin: vec![TxIn {
                prevout: OutPoint {
                    hash: [0x51; 32],
                    index: 3,
                },
                script_sig: Vec::new(),
                sequence: SEQUENCE_FINAL,
                witness: vec![vec![0x01]],
            }],
            vout: vec![TxOut {
                value: 1_000,
                script_pubkey: vec![0x51],
            }],
            lock_time: 0,
        }
    }

    #[test]
    fn precomputed_data_is_deterministic() {
        let tx = sample_tx();
        assert_eq!(
            PrecomputedTransactionData::new(&tx),
            PrecomputedTransactionData::new(&tx)
        );
    }

    #[test]
    fn precomputed_data_tracks_inputs() {
        let tx = sample_tx();
        let mut other = tx.clone();
        other.vin[0].sequence = 0;
        let a = PrecomputedTransactionData::new(&tx);
        let b = PrecomputedTransactionData::new(&other);
        assert_eq!(a.hash_prevouts, b.hash_prevouts);
        assert_ne!(a.hash_sequences, b.hash_sequences);
        assert_eq!(a.hash_outputs, b.hash_outputs);
    }

    #[test]
    fn checker_exposes_input_witness() {
        let tx = sample_tx();
        let txdata = PrecomputedTransactionData::new(&tx);
        let checker = TransactionChecker {
            transaction: &tx,
            input_index: 0,
            amount: 1_000,
            txdata: &txdata,
        };
        assert_eq!(checker.witness(), &[vec![0x01]]);
    }
}
