//! Chain identifiers and the chain metadata registry.

use std::collections::BTreeMap;

use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use url::Url;

/// Name of a chain, unique within a [`ChainRegistry`].
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, Deref,
)]
#[serde(transparent)]
pub struct ChainName(String);

impl From<String> for ChainName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for ChainName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl ChainName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ChainName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Execution protocol family of a chain.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProtocolType {
    #[default]
    Ethereum,
    Sealevel,
    Cosmos,
    Fuel,
}

/// Metadata describing a single chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainMetadata {
    /// Filled from the registry key when omitted.
    #[serde(default)]
    pub name: String,
    pub chain_id: u64,
    /// Messaging domain, only required if it differs from `chain_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<u32>,
    #[serde(default)]
    pub protocol: ProtocolType,
    #[serde(default)]
    pub rpc_urls: Vec<Url>,
}

impl ChainMetadata {
    pub fn domain_id(&self) -> u64 {
        self.domain_id.map(u64::from).unwrap_or(self.chain_id)
    }
}

/// Source of chain metadata used to decide where contracts can be deployed.
pub trait ChainRegistry {
    /// Returns the metadata of `chain`, or `None` if the chain is unknown.
    fn chain_metadata(&self, chain: &ChainName) -> Option<&ChainMetadata>;

    fn contains(&self, chain: &ChainName) -> bool {
        self.chain_metadata(chain).is_some()
    }
}

/// In-memory registry of every chain the tool knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiProvider {
    chains: BTreeMap<ChainName, ChainMetadata>,
}

impl MultiProvider {
    pub fn new(chains: BTreeMap<ChainName, ChainMetadata>) -> Self {
        let chains = chains
            .into_iter()
            .map(|(name, mut metadata)| {
                if metadata.name.is_empty() {
                    metadata.name = name.to_string();
                }
                (name, metadata)
            })
            .collect();

        Self { chains }
    }

    /// Add or replace the metadata of a chain.
    pub fn with_chain(mut self, metadata: ChainMetadata) -> Self {
        self.chains.insert(ChainName::new(&metadata.name), metadata);
        self
    }

    pub fn chain_names(&self) -> impl Iterator<Item = &ChainName> {
        self.chains.keys()
    }
}

impl ChainRegistry for MultiProvider {
    fn chain_metadata(&self, chain: &ChainName) -> Option<&ChainMetadata> {
        self.chains.get(chain)
    }
}
