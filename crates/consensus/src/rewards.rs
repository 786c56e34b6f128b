//! Block reward schedule.

use crate::constants::SUBSIDY_HALVING_SHIFT_LIMIT;
use crate::money::Amount;
use crate::params::ConsensusParams;

/// Proof-of-work subsidy at `height`.
///
/// The reward halves every `subsidy_halving_interval` blocks. Forced to zero
/// once the right shift would be undefined.
pub fn proof_of_work_reward(height: i32, params: &ConsensusParams) -> Amount {
    let halvings = height / params.options.subsidy_halving_interval;
    if halvings >= SUBSIDY_HALVING_SHIFT_LIMIT {
        return 0;
    }
    params.options.proof_of_work_reward >> halvings
}

/// Proof-of-stake reward at `height`, honoring the one-time premine.
pub fn proof_of_stake_reward(height: i32, params: &ConsensusParams) -> Amount {
    if is_premine(height, params) {
        return params.options.premine_reward;
    }
    params.options.proof_of_stake_reward
}

/// True when the block at `height` carries the premine reward.
pub fn is_premine(height: i32, params: &ConsensusParams) -> bool {
    params.options.premine_height > 0
        && params.options.premine_reward > 0
        && height == params.options.premine_height
}
