//! Underlying per-chain contract deployer.

use std::{collections::BTreeMap, future::Future};

use crate::{addresses::AddressMap, chains::ChainName, igp::IgpConfig};

/// Failure of a deployer on one chain, carrying what was deployed before it.
#[derive(Debug)]
pub struct DeploymentFailure {
    /// The chain whose deployment failed.
    pub chain: ChainName,
    /// Contracts deployed on other chains before the failure.
    pub deployed: AddressMap,
    pub source: anyhow::Error,
}

impl std::fmt::Display for DeploymentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deployment to {} failed: {:#}", self.chain, self.source)
    }
}

/// Deploys the IGP contracts of a set of chains.
///
/// Implementations skip chains whose contracts are already present in the cached
/// addresses and only return newly deployed contracts.
pub trait IgpDeployer {
    /// Seed the deployer with addresses recorded by previous runs.
    fn cache_addresses_map(&mut self, addresses: &AddressMap);

    /// Deploy to every chain of `configs`.
    fn deploy(
        &mut self,
        configs: &BTreeMap<ChainName, IgpConfig>,
    ) -> impl Future<Output = Result<AddressMap, DeploymentFailure>> + Send;
}
