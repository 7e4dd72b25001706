//! Command builder for the external IGP deploy hook.

use std::collections::BTreeMap;

use tokio::process::Command;

use crate::chains::ChainMetadata;

/// Builder for one invocation of the deploy hook.
///
/// The chain being deployed is described to the hook through `HYP_*` environment
/// variables; the IGP config itself is written to its stdin.
#[derive(Debug, Clone)]
pub struct DeployCmdBuilder {
    program: String,
    args: Vec<String>,
    envs: BTreeMap<String, String>,
}

impl DeployCmdBuilder {
    /// Create a new builder for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: BTreeMap::new(),
        }
    }

    /// Add arguments passed verbatim to the program.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }

    /// Describe the target chain.
    pub fn chain(self, metadata: &ChainMetadata) -> Self {
        let rpc_url = metadata
            .rpc_urls
            .first()
            .map(|url| url.to_string())
            .unwrap_or_default();

        self.env("HYP_CHAIN", &metadata.name)
            .env("HYP_CHAIN_ID", metadata.chain_id.to_string())
            .env("HYP_DOMAIN_ID", metadata.domain_id().to_string())
            .env("HYP_PROTOCOL", metadata.protocol.to_string())
            .env("HYP_RPC_URL", rpc_url)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn envs(&self) -> &BTreeMap<String, String> {
        &self.envs
    }

    /// Build the process command.
    pub fn build(self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(&self.envs);
        cmd
    }
}
