//! Preflight check that the owner can pay for a deployment.

use std::{future::Future, time::Duration};

use anyhow::Context;
use serde::Deserialize;

use crate::{
    chains::{ChainMetadata, ChainName, ChainRegistry},
    error::{DeployError, Result},
};

/// Timeout of a single balance request.
const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of the native balance of an account.
pub trait BalanceSource {
    /// Balance of `address` on `chain`, in wei.
    fn balance(
        &self,
        chain: &ChainMetadata,
        address: &str,
    ) -> impl Future<Output = anyhow::Result<u128>> + Send;
}

/// Reads balances with `eth_getBalance` through the first RPC url of each chain.
#[derive(Debug, Clone)]
pub struct RpcBalanceSource {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
}

impl RpcBalanceSource {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl BalanceSource for RpcBalanceSource {
    async fn balance(&self, chain: &ChainMetadata, address: &str) -> anyhow::Result<u128> {
        let url = chain
            .rpc_urls
            .first()
            .with_context(|| format!("No RPC url configured for {}", chain.name))?;

        let response: RpcResponse = self
            .client
            .post(url.clone())
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "method": "eth_getBalance",
                "params": [address, "latest"],
                "id": 1
            }))
            .send()
            .await
            .with_context(|| format!("Failed to send eth_getBalance request to {url}"))?
            .json()
            .await
            .context("Failed to parse eth_getBalance response")?;

        if let Some(error) = response.error {
            anyhow::bail!("RPC error: {}", error.message);
        }

        parse_wei(&response.result.context("No result in eth_getBalance response")?)
    }
}

/// Parse a hex quantity. Values beyond `u128` saturate.
fn parse_wei(quantity: &str) -> anyhow::Result<u128> {
    let digits = quantity
        .strip_prefix("0x")
        .with_context(|| format!("Balance `{quantity}` is not a hex quantity"))?
        .trim_start_matches('0');

    if digits.len() > 32 {
        return if digits.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(u128::MAX)
        } else {
            anyhow::bail!("Balance `{quantity}` is not a hex quantity")
        };
    }
    if digits.is_empty() {
        return Ok(0);
    }

    u128::from_str_radix(digits, 16)
        .with_context(|| format!("Balance `{quantity}` is not a hex quantity"))
}

/// Ensure `owner` holds funds on every chain of `chains`.
pub async fn assert_balances(
    source: &impl BalanceSource,
    registry: &impl ChainRegistry,
    chains: &[ChainName],
    owner: &str,
) -> Result<()> {
    for chain in chains {
        let metadata = registry
            .chain_metadata(chain)
            .ok_or_else(|| DeployError::configuration("remotes", format!("unknown chain `{chain}`")))?;

        let balance = source.balance(metadata, owner).await.map_err(|e| {
            DeployError::configuration(
                "balance",
                format!("failed to read the balance of {owner} on {chain}: {e:#}"),
            )
        })?;

        if balance == 0 {
            return Err(DeployError::configuration(
                "key",
                format!("{owner} has no funds on {chain}"),
            ));
        }

        tracing::debug!(chain = %chain, owner = %owner, balance, "Owner balance checked");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::chains::{MultiProvider, ProtocolType};

    struct FixedBalances(BTreeMap<&'static str, u128>);

    impl BalanceSource for FixedBalances {
        async fn balance(&self, chain: &ChainMetadata, _address: &str) -> anyhow::Result<u128> {
            self.0
                .get(chain.name.as_str())
                .copied()
                .with_context(|| format!("{} unreachable", chain.name))
        }
    }

    fn registry() -> MultiProvider {
        ["ethereum", "polygon"]
            .into_iter()
            .fold(MultiProvider::default(), |registry, name| {
                registry.with_chain(ChainMetadata {
                    name: name.to_string(),
                    chain_id: 1,
                    domain_id: None,
                    protocol: ProtocolType::Ethereum,
                    rpc_urls: vec![],
                })
            })
    }

    fn chains() -> Vec<ChainName> {
        vec!["ethereum".into(), "polygon".into()]
    }

    #[test]
    fn test_parse_wei() {
        assert_eq!(parse_wei("0x0").unwrap(), 0);
        assert_eq!(parse_wei("0x").unwrap(), 0);
        assert_eq!(parse_wei("0xde0b6b3a7640000").unwrap(), 1_000_000_000_000_000_000);
        assert_eq!(parse_wei(&format!("0x1{}", "0".repeat(40))).unwrap(), u128::MAX);
        assert!(parse_wei("100").is_err());
        assert!(parse_wei("0xzz").is_err());
    }

    #[tokio::test]
    async fn test_funded_owner_passes() {
        let source = FixedBalances(BTreeMap::from([("ethereum", 1), ("polygon", 5)]));

        assert!(assert_balances(&source, &registry(), &chains(), "0xABC").await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_balance_is_rejected() {
        let source = FixedBalances(BTreeMap::from([("ethereum", 1), ("polygon", 0)]));

        let err = assert_balances(&source, &registry(), &chains(), "0xABC")
            .await
            .unwrap_err();

        assert!(matches!(err, DeployError::Configuration { ref message, .. } if message.contains("polygon")));
    }

    #[tokio::test]
    async fn test_unreadable_balance_is_rejected() {
        let source = FixedBalances(BTreeMap::from([("ethereum", 1)]));

        let err = assert_balances(&source, &registry(), &chains(), "0xABC")
            .await
            .unwrap_err();

        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_rpc_source_requires_rpc_url() {
        let source = RpcBalanceSource::new().unwrap();
        let metadata = registry().chain_metadata(&"ethereum".into()).unwrap().clone();

        let err = source.balance(&metadata, "0xABC").await.unwrap_err();

        assert!(err.to_string().contains("No RPC url"));
    }
}
