//! Merkle tree computation over block transactions.

use cruxd_consensus::Hash256;
use cruxd_primitives::block::Block;
use cruxd_primitives::hash::sha256d;

/// Standard pairwise reduction; an odd level duplicates its last node.
///
/// `mutated` reports a level that hashed two identical nodes together — the
/// known block-malleability indicator. The implicit duplication of an odd
/// level's last node does not count by itself.
pub fn compute_merkle_root(leaves: &[Hash256]) -> (Hash256, bool) {
    if leaves.is_empty() {
        return ([0u8; 32], false);
    }
    let mut layer = leaves.to_vec();
    let mut mutated = false;
    while layer.len() > 1 {
        let size = layer.len();
        for pair in layer.chunks_exact(2) {
            if pair[0] == pair[1] {
                mutated = true;
            }
        }
        let mut next = Vec::with_capacity(size.div_ceil(2));
        let mut i = 0usize;
        while i < size {
            let i2 = if i + 1 < size { i + 1 } else { i };
            let mut data = Vec::with_capacity(64);
            data.extend_from_slice(&layer[i]);
            data.extend_from_slice(&layer[i2]);
            next.push(sha256d(&data));
            i += 2;
        }
        layer = next;
    }
    (layer[0], mutated)
}

/// Merkle root over the block's transaction ids.
pub fn block_merkle_root(block: &Block) -> (Hash256, bool) {
    let leaves: Vec<Hash256> = block.transactions.iter().map(|tx| tx.txid()).collect();
    compute_merkle_root(&leaves)
}

/// Merkle root over witness hashes. The coinbase's witness leaf is zero.
pub fn block_witness_merkle_root(block: &Block) -> (Hash256, bool) {
    let mut leaves = Vec::with_capacity(block.transactions.len());
    leaves.push([0u8; 32]);
    for tx in block.transactions.iter().skip(1) {
        leaves.push(tx.wtxid());
    }
    compute_merkle_root(&leaves)
}
