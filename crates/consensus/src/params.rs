//! Consensus parameter definitions.

use crate::money::{Amount, COIN};
use crate::upgrades::{Hash256, NetworkUpgrade, MAX_NETWORK_UPGRADES};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

/// Per-network constants consumed by the validation rules.
#[derive(Clone, Debug)]
pub struct ConsensusOptions {
    /// No amount larger than this (in satoshi) is valid.
    pub max_money: Amount,
    /// Coinbase outputs can only be spent after this number of new blocks.
    pub coinbase_maturity: i32,
    /// Coinstake outputs use their own, usually shorter, maturity window.
    pub coinstake_maturity: i32,
    /// The maximum weighted signature-operation cost allowed in a block.
    pub max_block_sigops_cost: i64,
    /// Scale applied to legacy and P2SH sigops when computing weighted cost.
    pub witness_scale_factor: i64,
    pub subsidy_halving_interval: i32,
    pub proof_of_work_reward: Amount,
    pub proof_of_stake_reward: Amount,
    /// One-time reward override; disabled when height or reward is zero.
    pub premine_height: i32,
    pub premine_reward: Amount,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Checkpoint {
    pub height: i32,
    pub hash: Hash256,
}

#[derive(Clone, Debug)]
pub struct ConsensusParams {
    pub network: Network,
    pub options: ConsensusOptions,
    pub upgrades: [NetworkUpgrade; MAX_NETWORK_UPGRADES],
    pub checkpoints: Vec<Checkpoint>,
}

impl ConsensusParams {
    /// Height of the highest checkpoint, or -1 when none are configured.
    pub fn last_checkpoint_height(&self) -> i32 {
        self.checkpoints
            .iter()
            .map(|checkpoint| checkpoint.height)
            .max()
            .unwrap_or(-1)
    }
}

#[derive(Debug)]
pub enum HexError {
    InvalidLength,
    InvalidHex,
}

pub fn hash256_from_hex(input: &str) -> Result<Hash256, HexError> {
    let hex = input.trim();
    if hex.len() != 64 {
        return Err(HexError::InvalidLength);
    }
    let mut bytes = [0u8; 32];
    for (i, byte_out) in bytes.iter_mut().enumerate() {
        let start = i * 2;
        let byte =
            u8::from_str_radix(&hex[start..start + 2], 16).map_err(|_| HexError::InvalidHex)?;
        *byte_out = byte;
    }
    bytes.reverse();
    Ok(bytes)
}

fn checkpoint(height: i32, hash_hex: &str) -> Checkpoint {
    let hash = match hash256_from_hex(hash_hex) {
        Ok(hash) => hash,
        Err(_) => [0u8; 32],
    };
    Checkpoint { height, hash }
}

pub fn consensus_params(network: Network) -> ConsensusParams {
    match network {
        Network::Mainnet => ConsensusParams {
            network,
            options: ConsensusOptions {
                max_money: 100_000_000 * COIN,
                coinbase_maturity: 100,
                coinstake_maturity: 50,
                max_block_sigops_cost: 80_000,
                witness_scale_factor: 4,
                subsidy_halving_interval: 210_000,
                proof_of_work_reward: 50 * COIN,
                proof_of_stake_reward: COIN,
                premine_height: 2,
                premine_reward: 20_000_000 * COIN,
            },
            upgrades: [
                NetworkUpgrade {
                    activation_height: NetworkUpgrade::ALWAYS_ACTIVE,
                },
                NetworkUpgrade {
                    activation_height: NetworkUpgrade::ALWAYS_ACTIVE,
                },
                NetworkUpgrade {
                    activation_height: 400_000,
                },
                NetworkUpgrade {
                    activation_height: 480_000,
                },
                NetworkUpgrade {
                    activation_height: NetworkUpgrade::NO_ACTIVATION_HEIGHT,
                },
            ],
            checkpoints: vec![
                checkpoint(
                    0,
                    "000000e3d2a4d7a2d8b0c0f2d4b27b3bfa9a92dbb6aa1f9a3b09e2f6f1c90c1d",
                ),
                checkpoint(
                    50_000,
                    "0000003b1d8c62304e6b6b5f3bd4f1e9c4a93a6428b9f15ef9a0cc0bd1a71f04",
                ),
                checkpoint(
                    150_000,
                    "00000018aa4f6ae3a6c2e0b04c86e8b47b167c0dd30f63f6ae97a8e53e4753c2",
                ),
            ],
        },
        Network::Testnet => ConsensusParams {
            network,
            options: ConsensusOptions {
                max_money: 100_000_000 * COIN,
                coinbase_maturity: 100,
                coinstake_maturity: 10,
                max_block_sigops_cost: 80_000,
                witness_scale_factor: 4,
                subsidy_halving_interval: 210_000,
                proof_of_work_reward: 50 * COIN,
                proof_of_stake_reward: COIN,
                premine_height: 2,
                premine_reward: 20_000_000 * COIN,
            },
            upgrades: [
                NetworkUpgrade {
                    activation_height: NetworkUpgrade::ALWAYS_ACTIVE,
                },
                NetworkUpgrade {
                    activation_height: NetworkUpgrade::ALWAYS_ACTIVE,
                },
                NetworkUpgrade {
                    activation_height: 2_000,
                },
                NetworkUpgrade {
                    activation_height: 4_000,
                },
                NetworkUpgrade {
                    activation_height: 10_000,
                },
            ],
            checkpoints: vec![checkpoint(
                0,
                "00000b9ee8b1c4a1c2f5b5e0c17d1f9c0d1a6ad2ca2bb00e5a0a7ce429e9c11a",
            )],
        },
        Network::Regtest => ConsensusParams {
            network,
            options: ConsensusOptions {
                max_money: 100_000_000 * COIN,
                coinbase_maturity: 10,
                coinstake_maturity: 5,
                max_block_sigops_cost: 80_000,
                witness_scale_factor: 4,
                subsidy_halving_interval: 150,
                proof_of_work_reward: 50 * COIN,
                proof_of_stake_reward: COIN,
                premine_height: 2,
                premine_reward: 20_000_000 * COIN,
            },
            upgrades: [NetworkUpgrade {
                activation_height: NetworkUpgrade::ALWAYS_ACTIVE,
            }; MAX_NETWORK_UPGRADES],
            checkpoints: Vec::new(),
        },
    }
}
