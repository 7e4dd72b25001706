//! Persisted record of what is deployed where.

use std::{
    collections::BTreeMap,
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use fs2::FileExt;

use crate::{
    chains::ChainName,
    error::{DeployError, Result},
};

/// The default file name of the address artifact.
pub const ADDRESSES_FILENAME: &str = "addresses.json";

const LOCK_FILENAME: &str = ".addresses.lock";

/// Contract name to address, for a single chain.
pub type ContractAddresses = BTreeMap<String, String>;

/// Chain name to contract addresses.
pub type AddressMap = BTreeMap<ChainName, ContractAddresses>;

/// Deep-merge `incoming` into `existing`, returning a fresh map.
///
/// Contract entries of the same chain are unioned. When both sides hold an address for the same
/// contract on the same chain, the incoming one wins.
pub fn merge(existing: &AddressMap, incoming: &AddressMap) -> AddressMap {
    let mut merged = existing.clone();

    for (chain, contracts) in incoming {
        let entry = merged.entry(chain.clone()).or_default();
        for (contract, address) in contracts {
            if let Some(previous) = entry.insert(contract.clone(), address.clone()) {
                if &previous != address {
                    tracing::warn!(
                        chain = %chain,
                        contract = %contract,
                        previous = %previous,
                        address = %address,
                        "Overwriting recorded contract address"
                    );
                }
            }
        }
    }

    merged
}

/// File-backed [`AddressMap`] stored as JSON.
#[derive(Debug, Clone)]
pub struct AddressStore {
    path: PathBuf,
}

impl AddressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<artifacts_dir>/addresses.json`.
    pub fn in_dir(artifacts_dir: impl AsRef<Path>) -> Self {
        Self::new(artifacts_dir.as_ref().join(ADDRESSES_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the recorded addresses.
    ///
    /// A missing file yields an empty map. A file that is not a valid address document is an
    /// error.
    pub fn load(&self) -> Result<AddressMap> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No address artifact yet, starting empty");
                return Ok(AddressMap::new());
            }
            Err(e) => return Err(DeployError::io(&self.path, e)),
        };

        let addresses: AddressMap =
            serde_json::from_slice(&content).map_err(|source| DeployError::Parse {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(
            path = %self.path.display(),
            chains = addresses.len(),
            "Loaded address artifact"
        );

        Ok(addresses)
    }

    /// Overwrite the artifact with `addresses`.
    ///
    /// The document is written to a sibling file first and renamed over the target, so a
    /// concurrent reader sees either the previous or the new content.
    pub fn save(&self, addresses: &AddressMap) -> Result<()> {
        let parent = self.artifacts_dir();
        std::fs::create_dir_all(parent).map_err(|e| DeployError::io(parent, e))?;

        let json = serde_json::to_string_pretty(addresses)
            .map_err(|e| DeployError::io(&self.path, std::io::Error::other(e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&tmp_path).map_err(|e| DeployError::io(&tmp_path, e))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .and_then(|_| file.sync_all())
            .map_err(|e| DeployError::io(&tmp_path, e))?;
        drop(file);

        std::fs::rename(&tmp_path, &self.path).map_err(|e| DeployError::io(&self.path, e))?;

        tracing::info!(path = %self.path.display(), chains = addresses.len(), "Contract addresses written");
        Ok(())
    }

    /// Take an advisory exclusive lock on the artifact directory.
    ///
    /// The lock is held until the returned guard is dropped. Fails immediately if another run
    /// holds it.
    pub fn lock(&self) -> Result<AddressStoreLock> {
        let parent = self.artifacts_dir();
        std::fs::create_dir_all(parent).map_err(|e| DeployError::io(parent, e))?;

        let lock_path = parent.join(LOCK_FILENAME);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| DeployError::io(&lock_path, e))?;

        file.try_lock_exclusive().map_err(|_| {
            DeployError::configuration(
                "artifacts",
                format!(
                    "{} is locked by another deployment run",
                    parent.display()
                ),
            )
        })?;

        Ok(AddressStoreLock { file })
    }

    fn artifacts_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

/// Guard releasing the artifact lock on drop.
#[derive(Debug)]
pub struct AddressStoreLock {
    file: File,
}

impl Drop for AddressStoreLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(err = %e, "Failed to release address artifact lock");
        }
    }
}
