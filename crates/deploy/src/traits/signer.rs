//! Owner identity of a deployment.

use std::str::FromStr;

use alloy_signer_local::PrivateKeySigner;
use anyhow::Context;

/// Length in bytes of a private key accepted by [`LocalOwnerSigner`].
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Provides the address that will own the deployed contracts.
pub trait OwnerSigner {
    fn address(&self) -> anyhow::Result<String>;
}

/// Signer backed by a local private key.
#[derive(Debug, Clone)]
pub struct LocalOwnerSigner {
    signer: PrivateKeySigner,
}

impl LocalOwnerSigner {
    /// Parse a hex encoded 32-byte private key, with or without a `0x` prefix.
    pub fn from_hex(key: &str) -> anyhow::Result<Self> {
        let key = key.trim();
        let stripped = key.strip_prefix("0x").unwrap_or(key);
        let bytes = hex::decode(stripped).context("Private key is not valid hex")?;
        if bytes.len() != PRIVATE_KEY_LENGTH {
            anyhow::bail!(
                "Private key must be {} bytes, got {}",
                PRIVATE_KEY_LENGTH,
                bytes.len()
            );
        }

        let signer = PrivateKeySigner::from_str(stripped).context("Invalid private key")?;
        Ok(Self { signer })
    }
}

impl OwnerSigner for LocalOwnerSigner {
    fn address(&self) -> anyhow::Result<String> {
        Ok(self.signer.address().to_checksum(None))
    }
}

/// A fixed owner address, for dry runs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticOwner(pub String);

impl OwnerSigner for StaticOwner {
    fn address(&self) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // First default anvil account.
    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ANVIL_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_local_signer_derives_checksummed_address() {
        let signer = LocalOwnerSigner::from_hex(ANVIL_KEY).expect("Valid key");
        assert_eq!(signer.address().unwrap(), ANVIL_ADDRESS);

        let unprefixed = LocalOwnerSigner::from_hex(&ANVIL_KEY[2..]).expect("Valid key");
        assert_eq!(unprefixed.address().unwrap(), ANVIL_ADDRESS);
    }

    #[test]
    fn test_local_signer_rejects_malformed_keys() {
        assert!(LocalOwnerSigner::from_hex("0x1234").is_err());
        assert!(LocalOwnerSigner::from_hex("not hex at all").is_err());
        assert!(LocalOwnerSigner::from_hex(&format!("{ANVIL_KEY}00")).is_err());
        assert!(LocalOwnerSigner::from_hex(&format!("0x{ANVIL_KEY}")).is_err());
    }
}
