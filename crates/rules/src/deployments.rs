//! Active soft-fork flags for a given chain position.

use cruxd_consensus::constants::{LOCKTIME_MEDIAN_TIME_PAST, LOCKTIME_VERIFY_SEQUENCE};
use cruxd_consensus::params::ConsensusParams;
use cruxd_consensus::upgrades::{network_upgrade_active, UpgradeIndex};
use cruxd_script::flags::{
    ScriptFlags, SCRIPT_VERIFY_CHECKLOCKTIMEVERIFY, SCRIPT_VERIFY_CHECKSEQUENCEVERIFY,
    SCRIPT_VERIFY_NONE, SCRIPT_VERIFY_P2SH, SCRIPT_VERIFY_WITNESS,
};

/// The soft-fork rules in force while validating one block.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DeploymentFlags {
    pub script_flags: ScriptFlags,
    pub lock_time_flags: u32,
}

impl DeploymentFlags {
    /// Flags for the block at `height` under the network's upgrade schedule.
    pub fn at_height(height: i32, params: &ConsensusParams) -> Self {
        let mut script_flags = SCRIPT_VERIFY_NONE;
        let mut lock_time_flags = 0u32;

        if network_upgrade_active(height, &params.upgrades, UpgradeIndex::P2sh) {
            script_flags |= SCRIPT_VERIFY_P2SH;
        }
        if network_upgrade_active(height, &params.upgrades, UpgradeIndex::Csv) {
            script_flags |= SCRIPT_VERIFY_CHECKLOCKTIMEVERIFY | SCRIPT_VERIFY_CHECKSEQUENCEVERIFY;
            lock_time_flags |= LOCKTIME_VERIFY_SEQUENCE | LOCKTIME_MEDIAN_TIME_PAST;
        }
        if network_upgrade_active(height, &params.upgrades, UpgradeIndex::Segwit) {
            script_flags |= SCRIPT_VERIFY_WITNESS;
        }

        Self {
            script_flags,
            lock_time_flags,
        }
    }

    pub fn p2sh_active(&self) -> bool {
        self.script_flags & SCRIPT_VERIFY_P2SH != 0
    }

    pub fn witness_active(&self) -> bool {
        self.script_flags & SCRIPT_VERIFY_WITNESS != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cruxd_consensus::params::{consensus_params, Network};

    #[test]
    fn flags_follow_the_upgrade_schedule() {
        let params = consensus_params(Network::Mainnet);

        let early = DeploymentFlags::at_height(1, &params);
        assert!(early.p2sh_active());
        assert!(!early.witness_active());
        assert_eq!(early.lock_time_flags, 0);

        let csv = DeploymentFlags::at_height(400_000, &params);
        assert_eq!(
            csv.lock_time_flags,
            LOCKTIME_VERIFY_SEQUENCE | LOCKTIME_MEDIAN_TIME_PAST
        );
        assert!(!csv.witness_active());

        let segwit = DeploymentFlags::at_height(480_000, &params);
        assert!(segwit.witness_active());
    }

    #[test]
    fn regtest_has_everything_from_genesis() {
        let params = consensus_params(Network::Regtest);
        let flags = DeploymentFlags::at_height(0, &params);
        assert!(flags.p2sh_active());
        assert!(flags.witness_active());
        assert_ne!(flags.lock_time_flags, 0);
    }
}
