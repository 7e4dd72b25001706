//! Agent configuration emitted after a deployment.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    addresses::{AddressMap, ContractAddresses},
    chains::{ChainName, ChainRegistry, ProtocolType},
    error::{DeployError, Result},
};

/// The default file name of the agent configuration.
pub const AGENT_CONFIG_FILENAME: &str = "agent_config.json";

/// Per-chain section of the agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentChainConfig {
    pub name: String,
    pub chain_id: u64,
    pub domain_id: u64,
    pub protocol: ProtocolType,
    pub rpc_urls: Vec<Url>,
    /// Every contract recorded for the chain.
    #[serde(flatten)]
    pub addresses: ContractAddresses,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub chains: BTreeMap<ChainName, AgentChainConfig>,
}

impl AgentConfig {
    /// Build the agent configuration of `chains` from the recorded addresses.
    ///
    /// Chains unknown to `registry` are left out.
    pub fn build(
        registry: &impl ChainRegistry,
        chains: &[ChainName],
        addresses: &AddressMap,
    ) -> Self {
        let chains = chains
            .iter()
            .filter_map(|chain| {
                let metadata = registry.chain_metadata(chain)?;
                Some((
                    chain.clone(),
                    AgentChainConfig {
                        name: metadata.name.clone(),
                        chain_id: metadata.chain_id,
                        domain_id: metadata.domain_id(),
                        protocol: metadata.protocol,
                        rpc_urls: metadata.rpc_urls.clone(),
                        addresses: addresses.get(chain).cloned().unwrap_or_default(),
                    },
                ))
            })
            .collect();

        Self { chains }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DeployError::io(path, std::io::Error::other(e)))?;
        std::fs::write(path, json).map_err(|e| DeployError::io(path, e))?;
        tracing::info!(path = %path.display(), chains = self.chains.len(), "Agent config written");
        Ok(())
    }
}
