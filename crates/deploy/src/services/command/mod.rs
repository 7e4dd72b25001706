//! IGP deployer delegating each chain to an external command.

mod cmd;

use std::{collections::BTreeMap, process::Stdio, time::Duration};

use anyhow::Context;
use tokio::{io::AsyncWriteExt, process::ChildStdin};

pub use cmd::DeployCmdBuilder;

use crate::{
    addresses::{AddressMap, ContractAddresses},
    chains::{ChainName, ChainRegistry, MultiProvider},
    igp::{IGP_CONTRACTS, IgpConfig},
    traits::{DeploymentFailure, IgpDeployer},
};

/// Default time a single chain deployment may take.
pub const DEFAULT_DEPLOY_TIMEOUT: Duration = Duration::from_secs(600);

/// Runs an external program once per chain to deploy the IGP contracts.
///
/// The program receives the chain's [`IgpConfig`] as JSON on stdin and the chain
/// description in `HYP_*` environment variables. It must exit successfully after
/// printing a JSON object of contract name to address on stdout, holding at least
/// every name of [`IGP_CONTRACTS`]. A chain is skipped once all of them are recorded.
#[derive(Debug, Clone)]
pub struct CommandDeployer {
    cmd: DeployCmdBuilder,
    registry: MultiProvider,
    cache: AddressMap,
    timeout: Duration,
}

impl CommandDeployer {
    pub fn new(cmd: DeployCmdBuilder, registry: MultiProvider) -> Self {
        Self {
            cmd,
            registry,
            cache: AddressMap::new(),
            timeout: DEFAULT_DEPLOY_TIMEOUT,
        }
    }

    /// Set the maximum duration of a single chain deployment.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether every IGP contract of `chain` is already recorded.
    pub fn is_cached(&self, chain: &ChainName) -> bool {
        self.cache
            .get(chain)
            .is_some_and(|contracts| IGP_CONTRACTS.iter().all(|c| contracts.contains_key(*c)))
    }

    async fn deploy_chain(
        &self,
        chain: &ChainName,
        config: &IgpConfig,
    ) -> anyhow::Result<ContractAddresses> {
        let metadata = self
            .registry
            .chain_metadata(chain)
            .with_context(|| format!("No metadata for chain {chain}"))?;

        let input = serde_json::to_vec(config).context("Failed to serialize IGP config")?;

        let mut child = self
            .cmd
            .clone()
            .chain(metadata)
            .build()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn deploy command `{}`", self.cmd.program()))?;

        let stdin = child.stdin.take().context("Deploy command stdin unavailable")?;
        let run = async move {
            write_config(stdin, &input).await?;
            child
                .wait_with_output()
                .await
                .context("Failed to wait for deploy command")
        };

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .with_context(|| format!("Timeout after {:?} deploying to {chain}", self.timeout))??;

        for line in String::from_utf8_lossy(&output.stderr).lines() {
            tracing::debug!(chain = %chain, "{}", line);
        }

        if !output.status.success() {
            anyhow::bail!("Deploy command exited with {}", output.status);
        }

        let contracts: ContractAddresses = serde_json::from_slice(&output.stdout)
            .context("Deploy command did not print a JSON object of contract addresses")?;

        let missing: Vec<_> = IGP_CONTRACTS
            .iter()
            .filter(|c| !contracts.contains_key(**c))
            .collect();
        if !missing.is_empty() {
            anyhow::bail!("Deploy command output is missing contracts {missing:?}");
        }

        Ok(contracts)
    }
}

/// Hand the config to the deploy command.
///
/// A command may close its stdin without reading it, in which case it is judged by its exit
/// status and output alone.
async fn write_config(mut stdin: ChildStdin, input: &[u8]) -> anyhow::Result<()> {
    match stdin.write_all(input).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
            tracing::debug!("Deploy command closed stdin before reading the IGP config");
            Ok(())
        }
        Err(e) => Err(e).context("Failed to write IGP config to deploy command"),
    }
}

impl IgpDeployer for CommandDeployer {
    fn cache_addresses_map(&mut self, addresses: &AddressMap) {
        self.cache = addresses.clone();
    }

    async fn deploy(
        &mut self,
        configs: &BTreeMap<ChainName, IgpConfig>,
    ) -> Result<AddressMap, DeploymentFailure> {
        let mut deployed = AddressMap::new();

        for (chain, config) in configs {
            if self.is_cached(chain) {
                tracing::info!(chain = %chain, "IGP already deployed, skipping");
                continue;
            }

            tracing::info!(chain = %chain, remotes = config.gas_oracle_type.len(), "Deploying IGP");

            match self.deploy_chain(chain, config).await {
                Ok(contracts) => {
                    tracing::info!(chain = %chain, contracts = contracts.len(), "IGP deployed");
                    self.cache.insert(chain.clone(), contracts.clone());
                    deployed.insert(chain.clone(), contracts);
                }
                Err(source) => {
                    tracing::error!(chain = %chain, err = ?source, "IGP deployment failed");
                    return Err(DeploymentFailure {
                        chain: chain.clone(),
                        deployed,
                        source,
                    });
                }
            }
        }

        Ok(deployed)
    }
}
