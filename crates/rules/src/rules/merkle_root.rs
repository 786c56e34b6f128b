//! Merkle root verification.

use crate::context::RuleContext;
use crate::engine::ConsensusRule;
use crate::error::{BlockValidationError, ConsensusError};
use crate::merkle::block_merkle_root;

pub struct BlockMerkleRootRule;

impl ConsensusRule for BlockMerkleRootRule {
    fn name(&self) -> &'static str {
        "block merkle root"
    }

    fn run(&self, context: &mut RuleContext) -> Result<(), BlockValidationError> {
        let (root, mutated) = block_merkle_root(&context.block);
        if mutated {
            return Err(ConsensusError::BadTransactionDuplicate.into());
        }
        if root != context.block.header.merkle_root {
            return Err(ConsensusError::BadMerkleRoot.into());
        }
        Ok(())
    }
}
