//! Per-chain configuration of the interchain gas paymaster.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chains::ChainName;

/// Gas overhead charged for a remote when no override is configured.
pub const DEFAULT_GAS_OVERHEAD: u64 = 100_000;

/// Contract names recorded for an IGP deployment.
pub const IGP_CONTRACTS: [&str; 3] = [
    "proxyAdmin",
    "storageGasOracle",
    "interchainGasPaymaster",
];

/// Gas oracle flavour used to price messages to a remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
pub enum GasOracleType {
    #[default]
    StorageGasOracle,
}

/// IGP settings shared by every chain of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgpSettings {
    /// Overhead used for remotes without an entry in `overhead`.
    #[serde(default = "default_overhead")]
    pub default_overhead: u64,
    /// Per-remote destination gas overhead.
    #[serde(default)]
    pub overhead: BTreeMap<ChainName, u64>,
}

fn default_overhead() -> u64 {
    DEFAULT_GAS_OVERHEAD
}

impl Default for IgpSettings {
    fn default() -> Self {
        Self {
            default_overhead: DEFAULT_GAS_OVERHEAD,
            overhead: BTreeMap::new(),
        }
    }
}

impl IgpSettings {
    pub fn overhead_for(&self, remote: &ChainName) -> u64 {
        self.overhead
            .get(remote)
            .copied()
            .unwrap_or(self.default_overhead)
    }
}

/// Configuration consumed by the deployer for one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IgpConfig {
    pub owner: String,
    pub beneficiary: String,
    pub oracle_key: String,
    /// Every chain this instance must be able to quote gas for.
    pub gas_oracle_type: BTreeMap<ChainName, GasOracleType>,
    pub overhead: BTreeMap<ChainName, u64>,
}

impl IgpConfig {
    pub fn remotes(&self) -> impl Iterator<Item = &ChainName> {
        self.gas_oracle_type.keys()
    }
}

/// Build the IGP config of every deployable chain.
///
/// Each entry routes to every other chain of `all_chains`. Chains that are not deployable get
/// no entry of their own.
pub fn build_igp_config_map(
    owner: &str,
    deployable_chains: &[ChainName],
    all_chains: &[ChainName],
    settings: &IgpSettings,
) -> BTreeMap<ChainName, IgpConfig> {
    deployable_chains
        .iter()
        .map(|local| {
            let remotes = all_chains.iter().filter(|remote| *remote != local);

            let config = IgpConfig {
                owner: owner.to_string(),
                beneficiary: owner.to_string(),
                oracle_key: owner.to_string(),
                gas_oracle_type: remotes
                    .clone()
                    .map(|remote| (remote.clone(), GasOracleType::StorageGasOracle))
                    .collect(),
                overhead: remotes
                    .map(|remote| (remote.clone(), settings.overhead_for(remote)))
                    .collect(),
            };

            (local.clone(), config)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(chains: &[&str]) -> Vec<ChainName> {
        chains.iter().map(|c| ChainName::from(*c)).collect()
    }

    #[test]
    fn test_one_entry_per_deployable_chain() {
        let configs = build_igp_config_map(
            "0xABC",
            &names(&["polygon", "ethereum"]),
            &names(&["solana", "polygon", "ethereum"]),
            &IgpSettings::default(),
        );

        assert_eq!(configs.keys().cloned().collect::<Vec<_>>(), names(&["ethereum", "polygon"]));
        assert!(!configs.contains_key("solana"));
    }

    #[test]
    fn test_config_routes_to_every_other_participant() {
        let configs = build_igp_config_map(
            "0xABC",
            &names(&["polygon"]),
            &names(&["solana", "polygon", "ethereum"]),
            &IgpSettings::default(),
        );

        let polygon = &configs["polygon"];
        assert_eq!(polygon.owner, "0xABC");
        assert_eq!(polygon.beneficiary, "0xABC");
        assert_eq!(polygon.oracle_key, "0xABC");
        assert_eq!(
            polygon.remotes().cloned().collect::<Vec<_>>(),
            names(&["ethereum", "solana"])
        );
        assert_eq!(polygon.overhead["solana"], DEFAULT_GAS_OVERHEAD);
    }

    #[test]
    fn test_overhead_overrides() {
        let mut settings = IgpSettings::default();
        settings.overhead.insert("solana".into(), 250_000);

        let configs = build_igp_config_map(
            "0xABC",
            &names(&["ethereum"]),
            &names(&["solana", "polygon", "ethereum"]),
            &settings,
        );

        assert_eq!(configs["ethereum"].overhead["solana"], 250_000);
        assert_eq!(configs["ethereum"].overhead["polygon"], DEFAULT_GAS_OVERHEAD);
    }

    #[test]
    fn test_no_deployable_chains_yields_no_configs() {
        let configs =
            build_igp_config_map("0xABC", &[], &names(&["solana"]), &IgpSettings::default());

        assert!(configs.is_empty());
    }
}
