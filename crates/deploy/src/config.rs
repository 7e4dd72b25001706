//! Chain registry configuration file.

use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::{
    chains::{ChainMetadata, ChainName, MultiProvider},
    igp::IgpSettings,
};

/// The default name of the chain registry file.
pub const CHAINS_FILENAME: &str = "chains.toml";

/// Prefix of environment variables overriding the registry file.
///
/// Nested keys are separated by `__`, e.g. `HYP_CONFIG_IGP__DEFAULT_OVERHEAD=150000`.
pub const ENV_PREFIX: &str = "HYP_CONFIG_";

/// Contents of the chain registry file.
///
/// ```toml
/// [chains.ethereum]
/// chain_id = 1
/// protocol = "ethereum"
/// rpc_urls = ["https://ethereum-rpc.publicnode.com"]
///
/// [igp.overhead]
/// solana = 250000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub chains: BTreeMap<ChainName, ChainMetadata>,
    #[serde(default)]
    pub igp: IgpSettings,
}

impl DeployConfig {
    /// Load the registry from `path`, layered with environment overrides.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!("Chain registry file not found: {}", path.display());
        }

        let config: Self = Self::figment(path)
            .extract()
            .with_context(|| format!("Failed to load chain registry from {}", path.display()))?;

        tracing::info!(path = %path.display(), chains = config.chains.len(), "Chain registry loaded");
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn multi_provider(&self) -> MultiProvider {
        MultiProvider::new(self.chains.clone())
    }
}
