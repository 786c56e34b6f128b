//! In-memory view of unspent transaction outputs for one validation attempt.

use std::collections::HashMap;

use cruxd_consensus::{Amount, Hash256};
use cruxd_primitives::transaction::{Transaction, TxIn, TxOut};

use crate::error::ConsensusError;

/// The still-unspent outputs of one transaction.
#[derive(Clone, Debug)]
pub struct UnspentOutputs {
    pub transaction_id: Hash256,
    /// Height of the block that created these outputs.
    pub height: i32,
    /// Median time of the creating block, used for time-based relative locks.
    pub time: i64,
    pub is_coinbase: bool,
    pub is_coinstake: bool,
    outputs: Vec<Option<TxOut>>,
}

impl UnspentOutputs {
    pub fn new(tx: &Transaction, height: i32, time: i64) -> Self {
        Self {
            transaction_id: tx.txid(),
            height,
            time,
            is_coinbase: tx.is_coinbase(),
            is_coinstake: tx.is_coinstake(),
            outputs: tx.vout.iter().cloned().map(Some).collect(),
        }
    }

    /// The output at `index`, if it exists and is still unspent.
    pub fn try_get_output(&self, index: u32) -> Option<&TxOut> {
        self.outputs
            .get(index as usize)
            .and_then(|output| output.as_ref())
    }

    pub fn is_fully_spent(&self) -> bool {
        self.outputs.iter().all(|output| output.is_none())
    }

    fn spend(&mut self, index: u32) -> Option<TxOut> {
        self.outputs.get_mut(index as usize).and_then(Option::take)
    }
}

/// Mapping from transaction id to its unspent outputs.
///
/// Owned and mutated by a single validation attempt; never shared with the
/// background script-verification workers.
#[derive(Clone, Debug, Default)]
pub struct UnspentOutputSet {
    coins: HashMap<Hash256, UnspentOutputs>,
}

impl UnspentOutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Seeds the view with coins loaded from the persisted store.
    pub fn add(&mut self, coins: UnspentOutputs) {
        self.coins.insert(coins.transaction_id, coins);
    }

    /// True iff every input of `tx` resolves to a present, unspent output.
    pub fn have_inputs(&self, tx: &Transaction) -> bool {
        tx.vin.iter().all(|input| {
            self.coins
                .get(&input.prevout.hash)
                .and_then(|coins| coins.try_get_output(input.prevout.index))
                .is_some()
        })
    }

    pub fn access_coins(&self, txid: &Hash256) -> Option<&UnspentOutputs> {
        self.coins.get(txid)
    }

    /// Resolves one input to the output it spends.
    pub fn get_output_for(&self, input: &TxIn) -> Result<&TxOut, ConsensusError> {
        self.coins
            .get(&input.prevout.hash)
            .and_then(|coins| coins.try_get_output(input.prevout.index))
            .ok_or(ConsensusError::BadTransactionMissingInput)
    }

    /// Total value spent by the inputs of `tx`.
    pub fn get_value_in(&self, tx: &Transaction) -> Result<Amount, ConsensusError> {
        let mut value_in: Amount = 0;
        for input in &tx.vin {
            let output = self.get_output_for(input)?;
            value_in = value_in
                .checked_add(output.value)
                .ok_or(ConsensusError::BadTransactionInputValueOutOfRange)?;
        }
        Ok(value_in)
    }

    /// Spends the inputs of `tx` and inserts its outputs as a new entry.
    ///
    /// Coinbase transactions spend nothing. A fully-spent entry is removed;
    /// a spent output is never reported unspent again.
    pub fn update(
        &mut self,
        tx: &Transaction,
        height: i32,
        time: i64,
    ) -> Result<(), ConsensusError> {
        if !tx.is_coinbase() {
            for input in &tx.vin {
                let coins = self
                    .coins
                    .get_mut(&input.prevout.hash)
                    .ok_or(ConsensusError::BadTransactionMissingInput)?;
                if coins.spend(input.prevout.index).is_none() {
                    return Err(ConsensusError::BadTransactionMissingInput);
                }
                if coins.is_fully_spent() {
                    self.coins.remove(&input.prevout.hash);
                }
            }
        }
        self.add(UnspentOutputs::new(tx, height, time));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cruxd_primitives::outpoint::OutPoint;
    use cruxd_primitives::transaction::SEQUENCE_FINAL;

    fn tx_with_outputs(values: &[Amount]) -> Transaction {
        Transaction {
            version: 1,
            vin: vec![TxIn {
                prevout: OutPoint::null(),
                script_sig: vec![0x51],
                sequence: SEQUENCE_FINAL,
                witness: Vec::new(),
            }],
            vout: values
                .iter()
                .map(|value| TxOut {
                    value: *value,
                    script_pubkey: vec![0x51],
                })
                .collect(),
            lock_time: 0,
        }
    }

    fn spend_of(prev: &Transaction, indexes: &[u32], out_values: &[Amount]) -> Transaction {
        Transaction {
            version: 1,
            vin: indexes
                .iter()
                .map(|index| TxIn {
                    prevout: OutPoint {
                        hash: prev.txid(),
                        index: *index,
                    },
                    script_sig: Vec::new(),
                    sequence: SEQUENCE_FINAL,
                    witness: Vec::new(),
                })
                .collect(),
            vout: out_values
                .iter()
                .map(|value| TxOut {
                    value: *value,
                    script_pubkey: vec![0x51],
                })
                .collect(),
            lock_time: 0,
        }
    }

    #[test]
    fn have_inputs_requires_every_input() {
        let funding = tx_with_outputs(&[100, 200]);
        let mut view = UnspentOutputSet::new();
        view.add(UnspentOutputs::new(&funding, 1, 0));

        let spend = spend_of(&funding, &[0, 1], &[250]);
        assert!(view.have_inputs(&spend));

        let missing = spend_of(&funding, &[0, 5], &[250]);
        assert!(!view.have_inputs(&missing));
    }

    #[test]
    fn get_value_in_sums_resolved_outputs() {
        let funding = tx_with_outputs(&[100, 200, 300]);
        let mut view = UnspentOutputSet::new();
        view.add(UnspentOutputs::new(&funding, 1, 0));

        let spend = spend_of(&funding, &[0, 2], &[350]);
        assert_eq!(view.get_value_in(&spend), Ok(400));
    }

    #[test]
    fn missing_input_is_always_missing_input() {
        let funding = tx_with_outputs(&[100]);
        let view = UnspentOutputSet::new();
        let spend = spend_of(&funding, &[0], &[90]);
        assert_eq!(
            view.get_value_in(&spend),
            Err(ConsensusError::BadTransactionMissingInput)
        );
    }

    #[test]
    fn update_spends_and_inserts() {
        let funding = tx_with_outputs(&[100, 200]);
        let mut view = UnspentOutputSet::new();
        view.add(UnspentOutputs::new(&funding, 1, 0));

        let spend = spend_of(&funding, &[0], &[90]);
        view.update(&spend, 2, 0).expect("update");

        // The spent output is gone, the sibling survives.
        let coins = view.access_coins(&funding.txid()).expect("entry");
        assert!(coins.try_get_output(0).is_none());
        assert!(coins.try_get_output(1).is_some());

        // The spender's own outputs are now available.
        let new_coins = view.access_coins(&spend.txid()).expect("new entry");
        assert_eq!(new_coins.try_get_output(0).map(|o| o.value), Some(90));
        assert_eq!(new_coins.height, 2);
    }

    #[test]
    fn update_rejects_double_spend() {
        let funding = tx_with_outputs(&[100, 200]);
        let mut view = UnspentOutputSet::new();
        view.add(UnspentOutputs::new(&funding, 1, 0));

        let first = spend_of(&funding, &[0], &[90]);
        view.update(&first, 2, 0).expect("first spend");

        let second = spend_of(&funding, &[0], &[80]);
        assert_eq!(
            view.update(&second, 3, 0),
            Err(ConsensusError::BadTransactionMissingInput)
        );
    }

    #[test]
    fn fully_spent_entry_is_removed() {
        let funding = tx_with_outputs(&[100]);
        let mut view = UnspentOutputSet::new();
        view.add(UnspentOutputs::new(&funding, 1, 0));

        let spend = spend_of(&funding, &[0], &[90]);
        view.update(&spend, 2, 0).expect("update");
        assert!(view.access_coins(&funding.txid()).is_none());
    }

    #[test]
    fn coinbase_update_only_inserts() {
        let coinbase = tx_with_outputs(&[5_000]);
        assert!(coinbase.is_coinbase());
        let mut view = UnspentOutputSet::new();
        view.update(&coinbase, 10, 0).expect("update");
        let coins = view.access_coins(&coinbase.txid()).expect("entry");
        assert!(coins.is_coinbase);
        assert_eq!(coins.height, 10);
    }
}
