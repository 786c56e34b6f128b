//! Consensus constants, parameters, and the reward schedule.

pub mod constants;
pub mod money;
pub mod params;
pub mod rewards;
pub mod upgrades;

pub use money::{money_range, Amount, CENT, COIN};
pub use params::{
    consensus_params, Checkpoint, ConsensusOptions, ConsensusParams, Network,
};
pub use rewards::{is_premine, proof_of_stake_reward, proof_of_work_reward};
pub use upgrades::Hash256;
