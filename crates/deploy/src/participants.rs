//! Resolution of the chains taking part in a deployment.

use std::collections::HashSet;

use crate::{
    chains::{ChainName, ChainRegistry, ProtocolType},
    error::{DeployError, Result},
};

/// The protocol family the IGP deployer knows how to deploy to.
pub const DEPLOYABLE_PROTOCOL: ProtocolType = ProtocolType::Ethereum;

/// The local chain and the remotes it must be able to exchange messages with.
///
/// The local chain never appears among the remotes and the remotes are distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentParticipants {
    local: ChainName,
    remotes: Vec<ChainName>,
}

impl DeploymentParticipants {
    pub fn new(local: ChainName, remotes: Vec<ChainName>) -> Result<Self> {
        if remotes.contains(&local) {
            return Err(DeployError::configuration(
                "remotes",
                format!("local chain `{local}` must not be listed as a remote"),
            ));
        }

        let mut seen = HashSet::with_capacity(remotes.len());
        if let Some(duplicate) = remotes.iter().find(|chain| !seen.insert(*chain)) {
            return Err(DeployError::configuration(
                "remotes",
                format!("remote chain `{duplicate}` is listed more than once"),
            ));
        }

        Ok(Self { local, remotes })
    }

    pub fn local(&self) -> &ChainName {
        &self.local
    }

    pub fn remotes(&self) -> &[ChainName] {
        &self.remotes
    }

    /// Every participant: the remotes in input order, then the local chain.
    pub fn all_chains(&self) -> Vec<ChainName> {
        self.remotes
            .iter()
            .chain(std::iter::once(&self.local))
            .cloned()
            .collect()
    }

    /// The participants contracts can actually be deployed to, in [`Self::all_chains`] order.
    pub fn deployable_chains(&self, registry: &impl ChainRegistry) -> Vec<ChainName> {
        self.all_chains()
            .into_iter()
            .filter(|chain| {
                let deployable = is_deployable_chain(registry, chain);
                if !deployable {
                    tracing::debug!(chain = %chain, "Skipping chain with unsupported protocol");
                }
                deployable
            })
            .collect()
    }

    /// Ensure every participant is known to `registry`.
    pub fn ensure_registered(&self, registry: &impl ChainRegistry) -> Result<()> {
        match self.all_chains().into_iter().find(|c| !registry.contains(c)) {
            Some(unknown) => Err(DeployError::configuration(
                if unknown == self.local { "local" } else { "remotes" },
                format!("unknown chain `{unknown}`"),
            )),
            None => Ok(()),
        }
    }
}

/// Whether the deployer supports the protocol family of `chain`.
///
/// Unknown chains are never deployable.
pub fn is_deployable_chain(registry: &impl ChainRegistry, chain: &ChainName) -> bool {
    registry
        .chain_metadata(chain)
        .is_some_and(|metadata| metadata.protocol == DEPLOYABLE_PROTOCOL)
}
