//! BIP68 relative lock-time evaluation.
//!
//! Lock checks need the UTXO set (the height and time each input's coin was
//! created at), which is why they run inside block connection rather than in
//! context-free transaction checks.

use cruxd_consensus::constants::LOCKTIME_VERIFY_SEQUENCE;
use cruxd_primitives::transaction::{Transaction, MIN_SEQUENCE_LOCK_TX_VERSION};

use crate::context::ChainPosition;

/// Relative lock-time is disabled for the input when this bit is set.
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;
/// The lock is time-based (units of 512 seconds) when this bit is set,
/// height-based otherwise.
pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;
pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;
pub const SEQUENCE_LOCKTIME_GRANULARITY: u32 = 9;

/// The earliest block a transaction's inputs allow it to be mined in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SequenceLock {
    pub min_height: i32,
    pub min_time: i64,
}

impl SequenceLock {
    /// A lock no input constrains.
    pub fn unconstrained() -> Self {
        Self {
            min_height: -1,
            min_time: -1,
        }
    }
}

/// Computes the combined sequence lock of `tx` given, per input, the height
/// and median time of the block that created the spent coin.
pub fn calculate_sequence_lock(
    tx: &Transaction,
    prev_heights: &[i32],
    prev_times: &[i64],
    lock_time_flags: u32,
) -> SequenceLock {
    let mut lock = SequenceLock::unconstrained();

    let enforce = tx.version >= MIN_SEQUENCE_LOCK_TX_VERSION
        && (lock_time_flags & LOCKTIME_VERIFY_SEQUENCE) != 0;
    if !enforce {
        return lock;
    }

    for (index, input) in tx.vin.iter().enumerate() {
        if input.sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG != 0 {
            continue;
        }
        let masked = (input.sequence & SEQUENCE_LOCKTIME_MASK) as i64;
        if input.sequence & SEQUENCE_LOCKTIME_TYPE_FLAG != 0 {
            let coin_time = prev_times.get(index).copied().unwrap_or(0);
            lock.min_time = lock
                .min_time
                .max(coin_time + (masked << SEQUENCE_LOCKTIME_GRANULARITY) - 1);
        } else {
            let coin_height = prev_heights.get(index).copied().unwrap_or(0);
            lock.min_height = lock.min_height.max(coin_height + masked as i32 - 1);
        }
    }

    lock
}

/// True when the lock is satisfied for a block at `position`.
pub fn evaluate_sequence_lock(lock: &SequenceLock, position: &ChainPosition) -> bool {
    lock.min_height < position.height && lock.min_time < position.median_time_past
}

#[cfg(test)]
mod tests {
    use super::*;
    use cruxd_consensus::constants::STANDARD_LOCKTIME_VERIFY_FLAGS;
    use cruxd_primitives::outpoint::OutPoint;
    use cruxd_primitives::transaction::{TxIn, TxOut};

    fn tx_with_sequence(sequence: u32) -> Transaction {
        Transaction {
            version: 2,
            vin: vec![TxIn {
                prevout: OutPoint {
                    hash: [0x01; 32],
                    index: 0,
                },
                script_sig: Vec::new(),
                sequence,
                witness: Vec::new(),
            }],
            vout: vec![TxOut {
                value: 1,
                script_pubkey: vec![0x51],
            }],
            lock_time: 0,
        }
    }

    fn position(height: i32, median_time_past: i64) -> ChainPosition {
        ChainPosition {
            height,
            median_time_past,
            prev_state_root: [0u8; 32],
        }
    }

    #[test]
    fn height_lock_boundary() {
        // Coin created at height 10, relative lock of 5 blocks: spendable
        // starting at height 15.
        let tx = tx_with_sequence(5);
        let lock = calculate_sequence_lock(&tx, &[10], &[0], STANDARD_LOCKTIME_VERIFY_FLAGS);
        assert_eq!(lock.min_height, 14);
        assert!(!evaluate_sequence_lock(&lock, &position(14, 0)));
        assert!(evaluate_sequence_lock(&lock, &position(15, 0)));
    }

    #[test]
    fn time_lock_uses_coin_time() {
        let tx = tx_with_sequence(SEQUENCE_LOCKTIME_TYPE_FLAG | 2);
        let coin_time = 1_000_000;
        let lock =
            calculate_sequence_lock(&tx, &[10], &[coin_time], STANDARD_LOCKTIME_VERIFY_FLAGS);
        assert_eq!(lock.min_time, coin_time + 2 * 512 - 1);
        assert!(!evaluate_sequence_lock(&lock, &position(100, lock.min_time)));
        assert!(evaluate_sequence_lock(
            &lock,
            &position(100, lock.min_time + 1)
        ));
    }

    #[test]
    fn disable_flag_ignores_input() {
        let tx = tx_with_sequence(SEQUENCE_LOCKTIME_DISABLE_FLAG | 500);
        let lock = calculate_sequence_lock(&tx, &[10], &[0], STANDARD_LOCKTIME_VERIFY_FLAGS);
        assert_eq!(lock, SequenceLock::unconstrained());
    }

    #[test]
    fn version_one_transactions_have_no_locks() {
        let mut tx = tx_with_sequence(5);
        tx.version = 1;
        let lock = calculate_sequence_lock(&tx, &[10], &[0], STANDARD_LOCKTIME_VERIFY_FLAGS);
        assert_eq!(lock, SequenceLock::unconstrained());
    }

    #[test]
    fn locks_disabled_without_deployment_flag() {
        let tx = tx_with_sequence(5);
        let lock = calculate_sequence_lock(&tx, &[10], &[0], 0);
        assert_eq!(lock, SequenceLock::unconstrained());
    }

    #[test]
    fn strictest_input_wins() {
        let mut tx = tx_with_sequence(5);
        tx.vin.push(TxIn {
            prevout: OutPoint {
                hash: [0x02; 32],
                index: 0,
            },
            script_sig: Vec::new(),
            sequence: 20,
            witness: Vec::new(),
        });
        let lock = calculate_sequence_lock(&tx, &[10, 4], &[0, 0], STANDARD_LOCKTIME_VERIFY_FLAGS);
        assert_eq!(lock.min_height, 23);
    }
}
