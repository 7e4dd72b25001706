use std::path::{Path, PathBuf};

use crate::{
    addresses::{AddressMap, AddressStore, merge},
    agent::{AGENT_CONFIG_FILENAME, AgentConfig},
    balance::{BalanceSource, RpcBalanceSource, assert_balances},
    chains::{ChainName, ChainRegistry},
    error::{DeployError, Result},
    igp::{IgpSettings, build_igp_config_map},
    participants::DeploymentParticipants,
    traits::{DeploymentFailure, IgpDeployer, OwnerSigner},
};

/// The default artifacts directory, relative to the working directory.
pub const DEFAULT_ARTIFACTS_DIR: &str = "./artifacts";

/// Progress of a deployment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum DeploymentStage {
    #[default]
    Initialized,
    AddressesLoaded,
    Deployed,
    AddressesMerged,
    Persisted,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReport {
    /// Contracts deployed by this run.
    pub deployed: AddressMap,
    /// Every recorded address after the run.
    pub addresses: AddressMap,
    /// Chains the run deployed to or found already deployed.
    pub deployable_chains: Vec<ChainName>,
}

/// Deploys the interchain gas paymaster to a local chain and its remotes.
///
/// Runs are resumable: addresses of earlier runs are read from the artifacts
/// directory and handed to the underlying deployer, which skips chains that are
/// already deployed. Whatever a run deploys is merged into the artifact, even when
/// a later chain fails.
///
/// With a [`BalanceSource`] set through [`Self::balance_check`], the owner must hold
/// funds on every deployable chain before anything is deployed.
pub struct PermissionlessIgpDeployer<R, S, D, B = RpcBalanceSource> {
    registry: R,
    signer: S,
    deployer: D,
    balances: Option<B>,
    local: ChainName,
    remotes: Vec<ChainName>,
    store: AddressStore,
    artifacts_dir: PathBuf,
    igp: IgpSettings,
    write_agent_config: bool,
    stage: DeploymentStage,
}

impl<R, S, D> PermissionlessIgpDeployer<R, S, D> {
    pub fn new(
        registry: R,
        signer: S,
        deployer: D,
        local: ChainName,
        remotes: Vec<ChainName>,
        artifacts_dir: impl Into<PathBuf>,
    ) -> Self {
        let artifacts_dir = artifacts_dir.into();

        Self {
            registry,
            signer,
            deployer,
            balances: None,
            local,
            remotes,
            store: AddressStore::in_dir(&artifacts_dir),
            artifacts_dir,
            igp: IgpSettings::default(),
            write_agent_config: false,
            stage: DeploymentStage::Initialized,
        }
    }
}

impl<R, S, D, B> PermissionlessIgpDeployer<R, S, D, B> {
    /// Require the owner to hold funds on every deployable chain, read from `balances`.
    pub fn balance_check<C: BalanceSource>(self, balances: C) -> PermissionlessIgpDeployer<R, S, D, C> {
        PermissionlessIgpDeployer {
            registry: self.registry,
            signer: self.signer,
            deployer: self.deployer,
            balances: Some(balances),
            local: self.local,
            remotes: self.remotes,
            store: self.store,
            artifacts_dir: self.artifacts_dir,
            igp: self.igp,
            write_agent_config: self.write_agent_config,
            stage: self.stage,
        }
    }

    pub fn igp_settings(mut self, igp: IgpSettings) -> Self {
        self.igp = igp;
        self
    }

    /// Write `agent_config.json` next to the addresses after a successful run.
    pub fn write_agent_config(mut self, write_agent_config: bool) -> Self {
        self.write_agent_config = write_agent_config;
        self
    }

    pub fn stage(&self) -> DeploymentStage {
        self.stage
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn deployer(&self) -> &D {
        &self.deployer
    }

    pub fn participants(&self) -> Result<DeploymentParticipants> {
        DeploymentParticipants::new(self.local.clone(), self.remotes.clone())
    }

    pub fn all_chains(&self) -> Result<Vec<ChainName>> {
        Ok(self.participants()?.all_chains())
    }
}

impl<R, S, D, B> PermissionlessIgpDeployer<R, S, D, B>
where
    R: ChainRegistry,
    S: OwnerSigner,
    D: IgpDeployer,
    B: BalanceSource,
{
    pub fn deployable_chains(&self) -> Result<Vec<ChainName>> {
        Ok(self.participants()?.deployable_chains(&self.registry))
    }

    pub async fn deploy(&mut self) -> Result<DeploymentReport> {
        self.stage = DeploymentStage::Initialized;

        // Nothing is locked, written or deployed before the run is known to be valid.
        let participants = self.participants()?;
        participants.ensure_registered(&self.registry)?;

        let owner = self.signer.address().map_err(DeployError::Signer)?;
        let deployable_chains = participants.deployable_chains(&self.registry);
        let all_chains = participants.all_chains();

        let configs = build_igp_config_map(&owner, &deployable_chains, &all_chains, &self.igp);
        if configs.is_empty() {
            tracing::warn!("No deployable chains among participants, nothing to deploy");
            let addresses = self.store.load()?;
            self.advance(DeploymentStage::AddressesLoaded);
            return Ok(DeploymentReport {
                deployed: AddressMap::new(),
                addresses,
                deployable_chains,
            });
        }

        if let Some(balances) = &self.balances {
            assert_balances(balances, &self.registry, &deployable_chains, &owner).await?;
        }

        let _lock = self.store.lock()?;

        let existing = self.store.load()?;
        self.advance(DeploymentStage::AddressesLoaded);

        tracing::info!(
            local = %participants.local(),
            remotes = participants.remotes().len(),
            deployable = deployable_chains.len(),
            owner = %owner,
            "Deploying IGP"
        );

        self.deployer.cache_addresses_map(&existing);
        let (deployed, failure) = match self.deployer.deploy(&configs).await {
            Ok(deployed) => (deployed, None),
            Err(DeploymentFailure {
                chain,
                deployed,
                source,
            }) => (deployed, Some(DeployError::Deployment { chain, source })),
        };
        self.advance(DeploymentStage::Deployed);

        let addresses = merge(&existing, &deployed);
        self.advance(DeploymentStage::AddressesMerged);

        if failure.is_none() || !deployed.is_empty() {
            tracing::info!(path = %self.store.path().display(), "Writing contract addresses");
            self.store.save(&addresses)?;
            self.advance(DeploymentStage::Persisted);
        }

        if let Some(failure) = failure {
            tracing::error!(
                err = %failure,
                recorded = deployed.len(),
                "IGP deployment failed, re-run to resume"
            );
            return Err(failure);
        }

        if self.write_agent_config {
            AgentConfig::build(&self.registry, &all_chains, &addresses)
                .save_to_file(&self.artifacts_dir.join(AGENT_CONFIG_FILENAME))?;
        }

        tracing::info!(deployed = deployed.len(), "IGP deployment complete");

        Ok(DeploymentReport {
            deployed,
            addresses,
            deployable_chains,
        })
    }

    fn advance(&mut self, stage: DeploymentStage) {
        tracing::debug!(from = %self.stage, to = %stage, "Deployment stage");
        self.stage = stage;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempdir::TempDir;

    use super::*;
    use crate::{
        chains::{ChainMetadata, MultiProvider, ProtocolType},
        igp::IgpConfig,
        traits::StaticOwner,
    };

    /// Records the configs it receives and returns canned results.
    #[derive(Default)]
    struct RecordingDeployer {
        cached: AddressMap,
        received: Vec<ChainName>,
        fail_on: Option<ChainName>,
    }

    impl IgpDeployer for RecordingDeployer {
        fn cache_addresses_map(&mut self, addresses: &AddressMap) {
            self.cached = addresses.clone();
        }

        async fn deploy(
            &mut self,
            configs: &BTreeMap<ChainName, IgpConfig>,
        ) -> std::result::Result<AddressMap, DeploymentFailure> {
            let mut deployed = AddressMap::new();
            for chain in configs.keys() {
                self.received.push(chain.clone());
                if self.cached.contains_key(chain) {
                    continue;
                }
                if self.fail_on.as_ref() == Some(chain) {
                    return Err(DeploymentFailure {
                        chain: chain.clone(),
                        deployed,
                        source: anyhow::anyhow!("out of gas"),
                    });
                }
                deployed
                    .entry(chain.clone())
                    .or_default()
                    .insert("IGP".to_string(), format!("0x{chain}"));
            }
            Ok(deployed)
        }
    }

    /// Balances by chain name. Chains without an entry are unreachable.
    struct FixedBalances(BTreeMap<&'static str, u128>);

    impl BalanceSource for FixedBalances {
        async fn balance(&self, chain: &ChainMetadata, _address: &str) -> anyhow::Result<u128> {
            self.0
                .get(chain.name.as_str())
                .copied()
                .ok_or_else(|| anyhow::anyhow!("{} unreachable", chain.name))
        }
    }

    fn registry() -> MultiProvider {
        [
            ("ethereum", ProtocolType::Ethereum),
            ("polygon", ProtocolType::Ethereum),
            ("solana", ProtocolType::Sealevel),
        ]
        .into_iter()
        .fold(MultiProvider::default(), |registry, (name, protocol)| {
            registry.with_chain(ChainMetadata {
                name: name.to_string(),
                chain_id: 1,
                domain_id: None,
                protocol,
                rpc_urls: vec![],
            })
        })
    }

    fn orchestrator(
        dir: &Path,
        local: &str,
        remotes: &[&str],
        deployer: RecordingDeployer,
    ) -> PermissionlessIgpDeployer<MultiProvider, StaticOwner, RecordingDeployer> {
        PermissionlessIgpDeployer::new(
            registry(),
            StaticOwner("0xABC".to_string()),
            deployer,
            local.into(),
            remotes.iter().map(|c| ChainName::from(*c)).collect(),
            dir,
        )
    }

    #[tokio::test]
    async fn test_non_deployable_chains_are_not_sent_to_deployer() {
        let temp_dir = TempDir::new("hyp-test").expect("Failed to create temp dir");
        let mut run = orchestrator(
            temp_dir.path(),
            "ethereum",
            &["solana", "polygon"],
            RecordingDeployer::default(),
        );

        let report = run.deploy().await.expect("Deployment should succeed");

        assert_eq!(
            run.deployer().received,
            vec![ChainName::from("ethereum"), ChainName::from("polygon")]
        );
        assert_eq!(
            report.deployable_chains,
            vec![ChainName::from("polygon"), ChainName::from("ethereum")]
        );
        assert_eq!(run.stage(), DeploymentStage::Persisted);
    }

    #[tokio::test]
    async fn test_local_in_remotes_fails_before_side_effects() {
        let temp_dir = TempDir::new("hyp-test").expect("Failed to create temp dir");
        let mut run = orchestrator(
            temp_dir.path(),
            "ethereum",
            &["ethereum", "polygon"],
            RecordingDeployer::default(),
        );

        let err = run.deploy().await.unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(run.stage(), DeploymentStage::Initialized);
        assert!(run.deployer().received.is_empty());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_chain_fails_before_side_effects() {
        let temp_dir = TempDir::new("hyp-test").expect("Failed to create temp dir");
        let mut run = orchestrator(
            temp_dir.path(),
            "ethereum",
            &["moonbeam"],
            RecordingDeployer::default(),
        );

        assert!(run.deploy().await.unwrap_err().is_configuration());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_no_deployable_chains_is_a_noop() {
        let temp_dir = TempDir::new("hyp-test").expect("Failed to create temp dir");
        let artifacts = temp_dir.path().join("artifacts");
        let mut run = orchestrator(&artifacts, "solana", &[], RecordingDeployer::default())
            .write_agent_config(true);

        let report = run.deploy().await.expect("Empty deployment should succeed");

        assert!(report.deployed.is_empty());
        assert!(run.deployer().received.is_empty());
        assert!(!artifacts.exists());
    }

    #[tokio::test]
    async fn test_unfunded_owner_fails_before_side_effects() {
        let temp_dir = TempDir::new("hyp-test").expect("Failed to create temp dir");
        let mut run = orchestrator(
            temp_dir.path(),
            "ethereum",
            &["solana", "polygon"],
            RecordingDeployer::default(),
        )
        .balance_check(FixedBalances(BTreeMap::from([("ethereum", 10), ("polygon", 0)])));

        let err = run.deploy().await.unwrap_err();

        assert!(matches!(err, DeployError::Configuration { ref field, .. } if field == "key"));
        assert!(run.deployer().received.is_empty());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_balances_are_checked_on_deployable_chains_only() {
        let temp_dir = TempDir::new("hyp-test").expect("Failed to create temp dir");
        let mut run = orchestrator(
            temp_dir.path(),
            "ethereum",
            &["solana", "polygon"],
            RecordingDeployer::default(),
        )
        .balance_check(FixedBalances(BTreeMap::from([("ethereum", 10), ("polygon", 1)])));

        run.deploy().await.expect("Funded deployment should succeed");

        assert_eq!(run.stage(), DeploymentStage::Persisted);
    }

    #[tokio::test]
    async fn test_partial_failure_persists_earlier_chains() {
        let temp_dir = TempDir::new("hyp-test").expect("Failed to create temp dir");
        let deployer = RecordingDeployer {
            fail_on: Some("polygon".into()),
            ..Default::default()
        };
        let mut run = orchestrator(temp_dir.path(), "ethereum", &["polygon"], deployer);

        let err = run.deploy().await.unwrap_err();
        assert!(matches!(err, DeployError::Deployment { ref chain, .. } if chain.as_str() == "polygon"));

        let persisted = AddressStore::in_dir(temp_dir.path()).load().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted["ethereum"]["IGP"], "0xethereum");
    }

    #[tokio::test]
    async fn test_agent_config_is_written_on_request() {
        let temp_dir = TempDir::new("hyp-test").expect("Failed to create temp dir");
        let mut run = orchestrator(
            temp_dir.path(),
            "ethereum",
            &["solana"],
            RecordingDeployer::default(),
        )
        .write_agent_config(true);

        run.deploy().await.expect("Deployment should succeed");

        let agent_config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(temp_dir.path().join(AGENT_CONFIG_FILENAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(agent_config["chains"]["ethereum"]["IGP"], "0xethereum");
        assert_eq!(agent_config["chains"]["solana"]["protocol"], "sealevel");
    }
}
