//! Soft-fork deployment schedule.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum UpgradeIndex {
    Base = 0,
    P2sh = 1,
    Csv = 2,
    Segwit = 3,
    Contracts = 4,
}

pub const MAX_NETWORK_UPGRADES: usize = 5;

pub const ALL_UPGRADES: [UpgradeIndex; MAX_NETWORK_UPGRADES] = [
    UpgradeIndex::Base,
    UpgradeIndex::P2sh,
    UpgradeIndex::Csv,
    UpgradeIndex::Segwit,
    UpgradeIndex::Contracts,
];

impl UpgradeIndex {
    pub const fn as_usize(self) -> usize {
        self as usize
    }
}

pub type Hash256 = [u8; 32];

#[derive(Clone, Copy, Debug)]
pub struct NetworkUpgrade {
    pub activation_height: i32,
}

impl NetworkUpgrade {
    pub const ALWAYS_ACTIVE: i32 = 0;
    pub const NO_ACTIVATION_HEIGHT: i32 = -1;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpgradeState {
    Disabled,
    Pending,
    Active,
}

pub fn network_upgrade_state(
    height: i32,
    upgrades: &[NetworkUpgrade; MAX_NETWORK_UPGRADES],
    idx: UpgradeIndex,
) -> UpgradeState {
    let activation_height = upgrades[idx.as_usize()].activation_height;
    if activation_height == NetworkUpgrade::NO_ACTIVATION_HEIGHT {
        UpgradeState::Disabled
    } else if height >= activation_height {
        UpgradeState::Active
    } else {
        UpgradeState::Pending
    }
}

pub fn network_upgrade_active(
    height: i32,
    upgrades: &[NetworkUpgrade; MAX_NETWORK_UPGRADES],
    idx: UpgradeIndex,
) -> bool {
    network_upgrade_state(height, upgrades, idx) == UpgradeState::Active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{consensus_params, Network};

    #[test]
    fn mainnet_activation_edges() {
        let params = consensus_params(Network::Mainnet);

        assert!(!network_upgrade_active(
            399_999,
            &params.upgrades,
            UpgradeIndex::Csv
        ));
        assert!(network_upgrade_active(
            400_000,
            &params.upgrades,
            UpgradeIndex::Csv
        ));

        assert!(!network_upgrade_active(
            479_999,
            &params.upgrades,
            UpgradeIndex::Segwit
        ));
        assert!(network_upgrade_active(
            480_000,
            &params.upgrades,
            UpgradeIndex::Segwit
        ));
    }

    #[test]
    fn disabled_upgrade_never_activates() {
        let params = consensus_params(Network::Mainnet);
        assert!(!network_upgrade_active(
            i32::MAX,
            &params.upgrades,
            UpgradeIndex::Contracts
        ));
        assert_eq!(
            network_upgrade_state(i32::MAX, &params.upgrades, UpgradeIndex::Contracts),
            UpgradeState::Disabled
        );
    }

    #[test]
    fn regtest_everything_active_from_genesis() {
        let params = consensus_params(Network::Regtest);
        for idx in ALL_UPGRADES {
            assert!(network_upgrade_active(0, &params.upgrades, idx));
        }
    }
}
